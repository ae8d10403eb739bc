// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod binding;
pub mod composer;
pub mod operators;
pub mod renderers;
pub mod scheduler;

pub use binding::{bind_datasets, link_models};
pub use composer::{Composer, ComposerBuilder};
pub use operators::create_operators;
pub use renderers::{RendererEntry, RendererMap, RendererRole, WeakRendererRole};
pub use scheduler::{FlushMode, RefetchScheduler};
