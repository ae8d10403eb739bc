// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Transport errors raised by the fetch clients.

use thiserror::Error;

/// Failure to obtain a JSON document for a URL.
///
/// Configuration fetches degrade to an empty configuration on any of these;
/// manifest fetches surface them to the caller.
#[derive(Error, Debug)]
pub enum FetchError {
    /// The URL could not be resolved against the fetcher's base location.
    #[error("Invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// The request could not be sent or the body could not be read.
    #[error("Request for '{url}' failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with something other than 200.
    #[error("Request for '{url}' returned HTTP status {status}")]
    Status { url: String, status: u16 },

    /// Local file access failed.
    #[error("Could not read '{url}': {source}")]
    Io {
        url: String,
        #[source]
        source: std::io::Error,
    },

    /// The body was not valid JSON.
    #[error("Response from '{url}' is not valid JSON: {source}")]
    Parse {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    /// No document is registered under this URL.
    #[error("No document available at '{url}'")]
    NotFound { url: String },

    /// The URL scheme is neither http(s) nor file.
    #[error("Unsupported URL scheme '{scheme}' for '{url}'")]
    UnsupportedScheme { url: String, scheme: String },
}

impl FetchError {
    /// The URL the failed request was made for.
    pub fn url(&self) -> &str {
        match self {
            FetchError::InvalidUrl { url, .. }
            | FetchError::Transport { url, .. }
            | FetchError::Status { url, .. }
            | FetchError::Io { url, .. }
            | FetchError::Parse { url, .. }
            | FetchError::NotFound { url }
            | FetchError::UnsupportedScheme { url, .. } => url,
        }
    }
}
