// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod compose;
mod config;
mod fetch;

pub use compose::ComposeError;
pub use config::{ConfigError, ValidationError};
pub use fetch::FetchError;
