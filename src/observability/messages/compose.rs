// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for the composition lifecycle.
//!
//! This module contains message types for logging events related to:
//! * Composition start and manifest classification
//! * Ensemble fan-out and fan-in
//! * Magic lens layering
//! * Unsupported manifests

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Composition of a manifest URL started.
///
/// # Log Level
/// `info!` - Important operational event
pub struct CompositionStarted<'a> {
    pub url: &'a str,
    pub ensemble_child: bool,
}

impl Display for CompositionStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        if self.ensemble_child {
            write!(f, "Composing ensemble child {}", self.url)
        } else {
            write!(f, "Composing viewer for {}", self.url)
        }
    }
}

impl StructuredLog for CompositionStarted<'_> {
    fn log(&self) {
        tracing::info!(
            url = self.url,
            ensemble_child = self.ensemble_child,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "compose",
            span_name = name,
            url = self.url,
            ensemble_child = self.ensemble_child,
        )
    }
}

/// Manifest kind decided.
///
/// # Log Level
/// `debug!` - Dispatch detail
pub struct ManifestClassified<'a> {
    pub url: &'a str,
    pub kind: &'a str,
}

impl Display for ManifestClassified<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Manifest {} composed as {}", self.url, self.kind)
    }
}

impl StructuredLog for ManifestClassified<'_> {
    fn log(&self) {
        tracing::debug!(url = self.url, kind = self.kind, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("classify", span_name = name, url = self.url, kind = self.kind)
    }
}

/// One ensemble child finished composing.
///
/// # Log Level
/// `debug!` - Progress detail
///
/// # Example
/// ```
/// use arctic_composer::observability::messages::compose::EnsembleChildReady;
///
/// let msg = EnsembleChildReady {
///     name: "A",
///     ready: 1,
///     expected: 2,
/// };
///
/// assert_eq!(msg.to_string(), "Ensemble dataset 'A' ready (1/2)");
/// ```
pub struct EnsembleChildReady<'a> {
    pub name: &'a str,
    pub ready: usize,
    pub expected: usize,
}

impl Display for EnsembleChildReady<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Ensemble dataset '{}' ready ({}/{})",
            self.name, self.ready, self.expected
        )
    }
}

impl StructuredLog for EnsembleChildReady<'_> {
    fn log(&self) {
        tracing::debug!(
            dataset = self.name,
            ready = self.ready,
            expected = self.expected,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "ensemble_child",
            span_name = name,
            dataset = self.name,
            ready = self.ready,
            expected = self.expected,
        )
    }
}

/// Every ensemble child is ready and wiring completed.
///
/// # Log Level
/// `info!` - Important operational event
pub struct EnsembleAssembled<'a> {
    pub url: &'a str,
    pub renderer_count: usize,
    pub binding_rules: usize,
    pub operator_rules: usize,
}

impl Display for EnsembleAssembled<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Ensemble {} assembled: {} renderers, {} binding rules, {} operators",
            self.url, self.renderer_count, self.binding_rules, self.operator_rules
        )
    }
}

impl StructuredLog for EnsembleAssembled<'_> {
    fn log(&self) {
        tracing::info!(
            url = self.url,
            renderer_count = self.renderer_count,
            binding_rules = self.binding_rules,
            operator_rules = self.operator_rules,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "ensemble",
            span_name = name,
            url = self.url,
            renderer_count = self.renderer_count,
        )
    }
}

/// The background layer does not allow a magic lens.
///
/// # Log Level
/// `info!` - Configuration adjusted at runtime
pub struct MagicLensDeclined<'a> {
    pub url: &'a str,
}

impl Display for MagicLensDeclined<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Viewer for {} does not support a magic lens, disabling it",
            self.url
        )
    }
}

impl StructuredLog for MagicLensDeclined<'_> {
    fn log(&self) {
        tracing::info!(url = self.url, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("magic_lens", span_name = name, url = self.url)
    }
}

/// Both magic lens layers were built and linked.
///
/// # Log Level
/// `info!` - Important operational event
pub struct MagicLensComposed<'a> {
    pub url: &'a str,
    pub synchronized: &'a [&'a str],
}

impl Display for MagicLensComposed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Magic lens composed for {} (synchronized: {})",
            self.url,
            self.synchronized.join(", ")
        )
    }
}

impl StructuredLog for MagicLensComposed<'_> {
    fn log(&self) {
        tracing::info!(
            url = self.url,
            synchronized = self.synchronized.join(","),
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("magic_lens", span_name = name, url = self.url)
    }
}

/// No viewer type accepted the manifest.
///
/// # Log Level
/// `warn!` - User-visible notice
pub struct ManifestUnsupported<'a> {
    pub url: &'a str,
    pub types: &'a [String],
}

impl Display for ManifestUnsupported<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "The metadata format seems to be unsupported: {} (type: [{}])",
            self.url,
            self.types.join(", ")
        )
    }
}

impl StructuredLog for ManifestUnsupported<'_> {
    fn log(&self) {
        tracing::warn!(url = self.url, types = self.types.join(","), "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("unsupported", span_name = name, url = self.url)
    }
}
