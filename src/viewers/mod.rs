// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod descriptor;
pub mod mount;
pub mod query_image_type;
pub mod selector;

pub use descriptor::{ViewerDescriptor, ViewerUi};
pub use mount::{mount_viewer, ViewerHost};
pub use query_image_type::QueryImageViewerType;
pub use selector::PrioritizedSelector;
