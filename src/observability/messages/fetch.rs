// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for configuration and manifest fetches.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// A JSON document is being requested.
///
/// # Log Level
/// `debug!` - Per-request detail
pub struct FetchStarted<'a> {
    pub url: &'a str,
}

impl Display for FetchStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Fetching JSON document {}", self.url)
    }
}

impl StructuredLog for FetchStarted<'_> {
    fn log(&self) {
        tracing::debug!(url = self.url, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("fetch", span_name = name, url = self.url)
    }
}

/// The base configuration could not be fetched; composition continues
/// with an empty base.
///
/// # Log Level
/// `warn!` - Degraded but recoverable
///
/// # Example
/// ```
/// use arctic_composer::observability::messages::fetch::ConfigFetchFailed;
///
/// let error = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
/// let msg = ConfigFetchFailed {
///     url: "/config.json",
///     error: &error,
/// };
///
/// tracing::warn!("{}", msg);
/// ```
pub struct ConfigFetchFailed<'a> {
    pub url: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for ConfigFetchFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Configuration {} unavailable, using empty base configuration: {}",
            self.url, self.error
        )
    }
}

impl StructuredLog for ConfigFetchFailed<'_> {
    fn log(&self) {
        tracing::warn!(url = self.url, error = %self.error, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("config_fetch", span_name = name, url = self.url)
    }
}

/// A manifest could not be fetched; the composition call fails.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct ManifestFetchFailed<'a> {
    pub url: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for ManifestFetchFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Manifest {} could not be fetched: {}", self.url, self.error)
    }
}

impl StructuredLog for ManifestFetchFailed<'_> {
    fn log(&self) {
        tracing::error!(url = self.url, error = %self.error, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!("manifest_fetch", span_name = name, url = self.url)
    }
}
