// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::consts::QUERY_DATA_MODEL_TAG;
use crate::config::{Manifest, ViewerConfig};
use crate::model::QueryDataModel;
use crate::traits::{ViewerBuildArgs, ViewerSelector, ViewerTypeBuilder};
use crate::viewers::query_image_type::QueryImageViewerType;
use crate::viewers::{ViewerDescriptor, ViewerUi};

/// Viewer Type Selector trying its viewer types in registration order.
///
/// Every attempt starts from the same seeded descriptor: a `GenericViewer`
/// carrying the configuration, the manifest's background color and, for
/// query-data-model manifests, a fresh query data model.
pub struct PrioritizedSelector {
    types: Vec<Arc<dyn ViewerTypeBuilder>>,
}

impl PrioritizedSelector {
    pub fn new(types: Vec<Arc<dyn ViewerTypeBuilder>>) -> Self {
        Self { types }
    }

    /// Append a type with the lowest priority so far.
    pub fn with_type(mut self, viewer_type: Arc<dyn ViewerTypeBuilder>) -> Self {
        self.types.push(viewer_type);
        self
    }

    fn seed(basepath: &str, manifest: &Manifest, config: &ViewerConfig) -> ViewerDescriptor {
        let mut viewer = ViewerDescriptor::new(ViewerUi::GenericViewer, config.clone());
        viewer.bg_color = manifest.metadata.background_color.clone();
        if manifest.has_type(QUERY_DATA_MODEL_TAG) {
            viewer.query_data_model = Some(Arc::new(QueryDataModel::from_manifest(
                &manifest.raw,
                basepath,
            )));
        }
        viewer
    }
}

impl Default for PrioritizedSelector {
    fn default() -> Self {
        Self::new(Vec::new()).with_type(Arc::new(QueryImageViewerType))
    }
}

#[async_trait]
impl ViewerSelector for PrioritizedSelector {
    async fn select(
        &self,
        basepath: &str,
        manifest: &Manifest,
        config: &ViewerConfig,
    ) -> Option<ViewerDescriptor> {
        for viewer_type in &self.types {
            let mut viewer = Self::seed(basepath, manifest, config);
            let mut args = ViewerBuildArgs {
                basepath,
                manifest,
                viewer: &mut viewer,
            };
            if viewer_type.build(&mut args) {
                tracing::debug!(viewer_type = viewer_type.name(), url = %manifest.url, "viewer type selected");
                return Some(viewer);
            }
        }
        None
    }
}
