// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;
use thiserror::Error;

/// Errors that can occur during ensemble manifest validation
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// A circular dependency was detected between pixel operators
    CyclicDependency {
        /// The cycle path showing the circular dependency
        cycle: Vec<String>,
    },
    /// An operator reads from a renderer that is neither a dataset nor an operator
    UnresolvedSource {
        /// The operator that has the unresolved source
        operator: String,
        /// The source name that couldn't be resolved
        missing_source: String,
    },
    /// A dataset or operator name is used more than once
    DuplicateRendererName {
        /// The duplicate name
        name: String,
    },
    /// An operator declares no sources at all
    EmptyOperator {
        /// The operator without inputs
        operator: String,
    },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::CyclicDependency { cycle } => {
                write!(f, "Cyclic operator dependency detected: {}", cycle.join(" -> "))
            }
            ValidationError::UnresolvedSource {
                operator,
                missing_source,
            } => {
                write!(
                    f,
                    "Operator '{}' reads from '{}' which does not exist",
                    operator, missing_source
                )
            }
            ValidationError::DuplicateRendererName { name } => {
                write!(f, "Duplicate renderer name: '{}'", name)
            }
            ValidationError::EmptyOperator { operator } => {
                write!(f, "Operator '{}' has no source datasets", operator)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Errors raised while loading a local configuration override file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not read configuration file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Could not parse configuration file: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Configuration root must be a mapping, found {0}")]
    NotAMapping(&'static str),
}
