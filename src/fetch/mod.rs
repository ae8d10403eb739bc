// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! JSON fetch clients.
//!
//! The composer fetches two kinds of documents: the base configuration and
//! manifests. Both go through [`JsonFetcher`], so the engine can run against
//! HTTP servers, local directories, or in-process documents in tests.

pub mod http;
pub mod memory;

pub use http::HttpFetcher;
pub use memory::MemoryFetcher;

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::FetchError;

/// Fetch a JSON document by URL.
///
/// A URL may be relative; implementations resolve it against their own base
/// location.
#[async_trait]
pub trait JsonFetcher: Send + Sync {
    async fn fetch_json(&self, url: &str) -> Result<Value, FetchError>;
}

/// Directory part of a manifest URL, including the trailing slash.
///
/// Child dataset paths inside an ensemble manifest are relative to this.
///
/// ```
/// use arctic_composer::fetch::basepath_of;
///
/// assert_eq!(basepath_of("data/ensemble/index.json"), "data/ensemble/");
/// assert_eq!(basepath_of("index.json"), "");
/// ```
pub fn basepath_of(url: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    match path.rfind('/') {
        Some(idx) => path[..=idx].to_string(),
        None => String::new(),
    }
}
