// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! In-process fetch client.
//!
//! Serves documents registered up front, optionally after a per-URL delay.
//! Delays make completion order controllable, which is how ensemble fan-in is
//! exercised against out-of-order children.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::errors::FetchError;
use crate::fetch::JsonFetcher;
use crate::model::subscription::lock;
use crate::observability::messages::fetch::FetchStarted;
use crate::observability::messages::StructuredLog;

#[derive(Debug, Clone, Default)]
pub struct MemoryFetcher {
    documents: HashMap<String, Value>,
    statuses: HashMap<String, u16>,
    delays: HashMap<String, Duration>,
    requested: Arc<Mutex<Vec<String>>>,
}

impl MemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(mut self, url: impl Into<String>, document: Value) -> Self {
        self.documents.insert(url.into(), document);
        self
    }

    /// Answer `url` with a non-success status instead of a document.
    pub fn with_status(mut self, url: impl Into<String>, status: u16) -> Self {
        self.statuses.insert(url.into(), status);
        self
    }

    pub fn with_delay(mut self, url: impl Into<String>, delay: Duration) -> Self {
        self.delays.insert(url.into(), delay);
        self
    }

    /// URLs requested so far, in request order.
    pub fn requested(&self) -> Vec<String> {
        lock(&self.requested).clone()
    }
}

#[async_trait]
impl JsonFetcher for MemoryFetcher {
    async fn fetch_json(&self, url: &str) -> Result<Value, FetchError> {
        FetchStarted { url }.log();
        lock(&self.requested).push(url.to_string());

        if let Some(delay) = self.delays.get(url) {
            tokio::time::sleep(*delay).await;
        }

        if let Some(status) = self.statuses.get(url) {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: *status,
            });
        }

        self.documents
            .get(url)
            .cloned()
            .ok_or_else(|| FetchError::NotFound {
                url: url.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn serves_registered_documents() {
        let fetcher = MemoryFetcher::new().with_document("a.json", json!({ "type": [] }));

        assert_eq!(fetcher.fetch_json("a.json").await.unwrap(), json!({ "type": [] }));
        assert!(matches!(
            fetcher.fetch_json("b.json").await,
            Err(FetchError::NotFound { .. })
        ));
        assert_eq!(fetcher.requested(), vec!["a.json", "b.json"]);
    }

    #[tokio::test]
    async fn status_overrides_document() {
        let fetcher = MemoryFetcher::new()
            .with_document("a.json", json!({}))
            .with_status("a.json", 404);

        let err = fetcher.fetch_json("a.json").await.unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 404, .. }));
    }

    #[tokio::test]
    async fn delayed_documents_complete_later() {
        let fetcher = MemoryFetcher::new()
            .with_document("slow.json", json!(1))
            .with_document("fast.json", json!(2))
            .with_delay("slow.json", Duration::from_millis(50));

        let (slow, fast) = tokio::join!(
            async {
                let value = fetcher.fetch_json("slow.json").await.unwrap();
                (value, tokio::time::Instant::now())
            },
            async {
                let value = fetcher.fetch_json("fast.json").await.unwrap();
                (value, tokio::time::Instant::now())
            }
        );

        assert_eq!(slow.0, json!(1));
        assert_eq!(fast.0, json!(2));
        assert!(fast.1 < slow.1);
    }
}
