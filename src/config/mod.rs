// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod dependency_graph;
mod loader;
mod manifest;
mod validation;

pub mod consts;

pub use dependency_graph::DependencyGraph;
pub use loader::{effective_config, is_truthy, load_overrides, parse_location_params, ViewerConfig};
pub use manifest::{
    classify, BindingRule, DatasetRef, EnsembleSpec, Manifest, ManifestKind, ManifestMetadata,
    OperatorRule, RendererBinding,
};
pub use validation::validate_ensemble;
