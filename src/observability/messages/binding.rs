// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for dataset binding and pixel operator wiring.

use crate::model::ModelId;
use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// A binding rule was wired.
///
/// # Log Level
/// `debug!` - Wiring detail
pub struct BindingRuleApplied<'a> {
    pub datasets: &'a [String],
    pub models: usize,
    pub renderers: usize,
}

impl Display for BindingRuleApplied<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Bound datasets [{}]: {} query models, {} renderers",
            self.datasets.join(", "),
            self.models,
            self.renderers
        )
    }
}

impl StructuredLog for BindingRuleApplied<'_> {
    fn log(&self) {
        tracing::debug!(
            datasets = self.datasets.join(","),
            models = self.models,
            renderers = self.renderers,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("binding", span_name = name, datasets = self.datasets.join(","))
    }
}

/// An argument value was copied into a bound model.
///
/// # Log Level
/// `trace!` - High-frequency detail
pub struct ArgumentPropagated<'a> {
    pub argument: &'a str,
    pub value: &'a serde_json::Value,
    pub target: ModelId,
}

impl Display for ArgumentPropagated<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Propagated {}={} to {}", self.argument, self.value, self.target)
    }
}

impl StructuredLog for ArgumentPropagated<'_> {
    fn log(&self) {
        tracing::trace!(
            argument = self.argument,
            value = %self.value,
            target = %self.target,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::trace_span!("propagate", span_name = name, argument = self.argument)
    }
}

/// Pending refetches were drained.
///
/// # Log Level
/// `debug!` - Batch detail
pub struct RefetchFlushed {
    pub count: usize,
}

impl Display for RefetchFlushed {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Flushed {} pending refetches", self.count)
    }
}

impl StructuredLog for RefetchFlushed {
    fn log(&self) {
        tracing::debug!(count = self.count, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("refetch", span_name = name, count = self.count)
    }
}

/// A pixel operator was registered in the renderer map.
///
/// # Log Level
/// `debug!` - Wiring detail
pub struct OperatorRegistered<'a> {
    pub name: &'a str,
    pub operation: &'a str,
    pub sources: &'a [String],
}

impl Display for OperatorRegistered<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Registered operator '{}' = {}({})",
            self.name,
            self.operation,
            self.sources.join(", ")
        )
    }
}

impl StructuredLog for OperatorRegistered<'_> {
    fn log(&self) {
        tracing::debug!(
            operator = self.name,
            operation = self.operation,
            sources = self.sources.join(","),
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("operator", span_name = name, operator = self.name)
    }
}

/// Two query models were linked for one-way propagation.
///
/// # Log Level
/// `debug!` - Wiring detail
pub struct ModelsLinked<'a> {
    pub source: ModelId,
    pub target: ModelId,
    pub arguments: &'a [&'a str],
}

impl Display for ModelsLinked<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Linked {} -> {} on [{}]",
            self.source,
            self.target,
            self.arguments.join(", ")
        )
    }
}

impl StructuredLog for ModelsLinked<'_> {
    fn log(&self) {
        tracing::debug!(
            source = %self.source,
            target = %self.target,
            arguments = self.arguments.join(","),
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("link", span_name = name)
    }
}
