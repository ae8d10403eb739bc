// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observability module for structured logging and tracing.
//!
//! This module provides centralized message types for diagnostic and
//! operational logging throughout the composer. Message types follow a
//! struct-based pattern with a `Display` implementation so log text lives in
//! one place instead of being scattered through the engine as string literals.
//!
//! # Architecture
//!
//! Messages are organized by subsystem:
//! * `messages::compose` - composition lifecycle (manifest kinds, ensembles, magic lens)
//! * `messages::binding` - argument propagation, refetch batching, operator wiring
//! * `messages::fetch` - configuration and manifest fetches
//! * `messages::validation` - ensemble validation errors
//!
//! # Usage
//!
//! ```rust
//! use arctic_composer::observability::messages::compose::CompositionStarted;
//! use arctic_composer::observability::messages::StructuredLog;
//!
//! let msg = CompositionStarted {
//!     url: "data/index.json",
//!     ensemble_child: false,
//! };
//!
//! msg.log();
//! ```

pub mod messages;
