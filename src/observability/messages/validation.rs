// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for ensemble validation errors.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Cyclic dependency detected between pixel operators.
///
/// # Log Level
/// `error!` - Failure requiring attention
///
/// # Example
/// ```
/// use arctic_composer::observability::messages::validation::CyclicDependencyDetected;
///
/// let cycle = vec!["diff", "scaled", "diff"];
/// let msg = CyclicDependencyDetected {
///     cycle: &cycle,
/// };
///
/// tracing::error!("{}", msg);
/// ```
pub struct CyclicDependencyDetected<'a> {
    pub cycle: &'a [&'a str],
}

impl Display for CyclicDependencyDetected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Cyclic operator dependency detected: {}", self.cycle.join(" -> "))
    }
}

impl StructuredLog for CyclicDependencyDetected<'_> {
    fn log(&self) {
        tracing::error!(
            cycle = self.cycle.join(" -> "),
            cycle_length = self.cycle.len(),
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::span!(
            tracing::Level::ERROR,
            "validation",
            span_name = name,
            cycle = self.cycle.join(" -> "),
            cycle_length = self.cycle.len(),
        )
    }
}

/// Operator source that names neither a dataset nor an operator.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct UnresolvedSource<'a> {
    pub operator: &'a str,
    pub missing_source: &'a str,
}

impl Display for UnresolvedSource<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Operator '{}' reads from '{}' which does not exist",
            self.operator, self.missing_source
        )
    }
}

impl StructuredLog for UnresolvedSource<'_> {
    fn log(&self) {
        tracing::error!(
            operator = self.operator,
            missing_source = self.missing_source,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::span!(
            tracing::Level::ERROR,
            "validation",
            span_name = name,
            operator = self.operator,
            missing_source = self.missing_source,
        )
    }
}
