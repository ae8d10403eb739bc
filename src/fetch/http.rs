// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Fetch client for `http(s):` and `file:` URLs.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::path::Path;
use url::Url;

use crate::errors::FetchError;
use crate::fetch::JsonFetcher;
use crate::observability::messages::fetch::FetchStarted;
use crate::observability::messages::StructuredLog;

/// Fetches JSON over HTTP, or from disk for `file:` URLs.
///
/// Relative URLs are joined onto the base location given at construction.
/// An HTTP response counts as success only with status 200; local files have
/// no status and succeed whenever they can be read.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    base: Url,
}

impl HttpFetcher {
    pub fn new(base: Url) -> Self {
        Self {
            client: Client::new(),
            base,
        }
    }

    /// Build a fetcher from a base URL or a local directory.
    pub fn from_location(location: &str) -> Result<Self, FetchError> {
        if let Ok(url) = Url::parse(location) {
            if url.scheme().len() > 1 {
                return Ok(Self::new(url));
            }
        }

        let path = std::fs::canonicalize(location).map_err(|source| FetchError::Io {
            url: location.to_string(),
            source,
        })?;
        Ok(Self::new(directory_url(&path, location)?))
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Resolve `url` against the base location.
    pub fn resolve(&self, url: &str) -> Result<Url, FetchError> {
        self.base.join(url).map_err(|source| FetchError::InvalidUrl {
            url: url.to_string(),
            source,
        })
    }

    async fn fetch_http(&self, url: Url) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|source| FetchError::Transport {
            url: url.to_string(),
            source,
        })
    }

    async fn fetch_file(&self, url: Url) -> Result<String, FetchError> {
        let path = url
            .to_file_path()
            .map_err(|_| FetchError::UnsupportedScheme {
                url: url.to_string(),
                scheme: url.scheme().to_string(),
            })?;
        tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| FetchError::Io {
                url: url.to_string(),
                source,
            })
    }
}

#[async_trait]
impl JsonFetcher for HttpFetcher {
    async fn fetch_json(&self, url: &str) -> Result<Value, FetchError> {
        let resolved = self.resolve(url)?;
        FetchStarted {
            url: resolved.as_str(),
        }
        .log();

        let body = match resolved.scheme() {
            "http" | "https" => self.fetch_http(resolved.clone()).await?,
            "file" => self.fetch_file(resolved.clone()).await?,
            other => {
                return Err(FetchError::UnsupportedScheme {
                    url: resolved.to_string(),
                    scheme: other.to_string(),
                })
            }
        };

        serde_json::from_str(&body).map_err(|source| FetchError::Parse {
            url: resolved.to_string(),
            source,
        })
    }
}

fn directory_url(path: &Path, location: &str) -> Result<Url, FetchError> {
    Url::from_directory_path(path).map_err(|_| FetchError::Io {
        url: location.to_string(),
        source: std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "base location is not an absolute directory",
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn fetcher_for(dir: &TempDir) -> HttpFetcher {
        HttpFetcher::from_location(dir.path().to_str().unwrap()).unwrap()
    }

    #[tokio::test]
    async fn reads_relative_file_urls() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("a")).unwrap();
        fs::write(
            dir.path().join("a/index.json"),
            r#"{ "type": ["tonic-query-data-model"] }"#,
        )
        .unwrap();

        let doc = fetcher_for(&dir).fetch_json("a/index.json").await.unwrap();
        assert_eq!(doc, json!({ "type": ["tonic-query-data-model"] }));
    }

    #[tokio::test]
    async fn missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let err = fetcher_for(&dir).fetch_json("nope.json").await.unwrap_err();
        assert!(matches!(err, FetchError::Io { .. }));
        assert!(err.url().ends_with("nope.json"));
    }

    #[tokio::test]
    async fn malformed_body_is_parse_error() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("bad.json"), "{ not json").unwrap();

        let err = fetcher_for(&dir).fetch_json("bad.json").await.unwrap_err();
        assert!(matches!(err, FetchError::Parse { .. }));
    }

    #[tokio::test]
    async fn rejects_unknown_schemes() {
        let fetcher = HttpFetcher::new(Url::parse("http://localhost/").unwrap());
        let err = fetcher
            .fetch_json("ftp://example.org/index.json")
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::UnsupportedScheme { ref scheme, .. } if scheme == "ftp"));
    }

    #[test]
    fn resolves_against_http_base() {
        let fetcher = HttpFetcher::from_location("http://localhost:3000/viewer/").unwrap();
        assert_eq!(
            fetcher.resolve("data/index.json").unwrap().as_str(),
            "http://localhost:3000/viewer/data/index.json"
        );
        assert_eq!(
            fetcher.resolve("/config.json").unwrap().as_str(),
            "http://localhost:3000/config.json"
        );
    }

    #[test]
    fn missing_directory_is_io_error() {
        let err = HttpFetcher::from_location("/definitely/not/here").unwrap_err();
        assert!(matches!(err, FetchError::Io { .. }));
    }
}
