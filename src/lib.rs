// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod config;        // manifests, effective configuration, validation
pub mod engine;        // composition, binding, operator assembly
pub mod errors;        // error handling
pub mod fetch;         // JSON fetch clients
pub mod model;         // query data model + subscriptions
pub mod observability;
pub mod renderers;     // derived renderers (pixel operators, magic lens)
pub mod traits;        // renderer and selector abstractions
pub mod viewers;       // viewer descriptors, type selection, mounting
