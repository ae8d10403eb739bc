// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors that terminate a composition call.

use super::{FetchError, ValidationError};
use thiserror::Error;

/// Fatal outcome of `Composer::compose`.
///
/// Nothing here is retried: every variant ends the composition call it
/// occurred in.
#[derive(Error, Debug)]
pub enum ComposeError {
    /// The manifest (or an ensemble child's manifest) could not be fetched.
    #[error("Data unavailable: {0}")]
    Fetch(#[from] FetchError),

    /// The manifest document does not have the expected shape.
    #[error("Invalid manifest at '{url}': {reason}")]
    InvalidManifest { url: String, reason: String },

    /// No viewer type accepted the manifest.
    #[error("The metadata format seems to be unsupported ({url})")]
    UnsupportedManifest { url: String },

    /// The ensemble section failed validation.
    #[error("Ensemble validation failed:\n{}", join_errors(.0))]
    Validation(Vec<ValidationError>),

    /// An operator rule names a combination function the factory does not know.
    #[error("Operator '{name}' uses unknown operation '{operation}'")]
    UnknownOperation { name: String, operation: String },

    /// A renderer required for wiring is absent or has the wrong role.
    #[error("Renderer '{name}' is not available as an image source")]
    MissingRenderer { name: String },

    /// A child composition task panicked or was aborted.
    #[error("Ensemble child task failed: {0}")]
    ChildTask(String),

    /// The UI host refused to mount the viewer.
    #[error("Could not mount viewer '{ui}': {reason}")]
    Mount { ui: String, reason: String },
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

impl From<Vec<ValidationError>> for ComposeError {
    fn from(errors: Vec<ValidationError>) -> Self {
        ComposeError::Validation(errors)
    }
}
