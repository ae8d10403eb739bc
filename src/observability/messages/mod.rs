// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.
//!
//! Each message type implements `Display` for the human-readable text and
//! `StructuredLog` to emit it at its intended level with structured fields.

use tracing::Span;

pub mod binding;
pub mod compose;
pub mod fetch;
pub mod validation;

/// A log message that knows its own level and fields.
pub trait StructuredLog {
    /// Emit the message as a tracing event.
    fn log(&self);

    /// Open a span carrying the message's fields.
    fn span(&self, name: &str) -> Span;
}
