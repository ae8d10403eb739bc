// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use crate::config::ViewerConfig;
use crate::engine::RendererMap;
use crate::model::QueryDataModel;
use crate::traits::{ImageBuilder, Painter};

/// UI component a descriptor is mounted as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewerUi {
    GenericViewer,
    GeometryViewer,
    MultiViewerWidget,
    ViewerSelector,
    ArcticListViewer,
    /// Any other component tag a viewer type chooses.
    Component(String),
}

impl ViewerUi {
    pub fn as_str(&self) -> &str {
        match self {
            ViewerUi::GenericViewer => "GenericViewer",
            ViewerUi::GeometryViewer => "GeometryViewer",
            ViewerUi::MultiViewerWidget => "MultiViewerWidget",
            ViewerUi::ViewerSelector => "ViewerSelector",
            ViewerUi::ArcticListViewer => "ArcticListViewer",
            ViewerUi::Component(tag) => tag,
        }
    }
}

impl fmt::Display for ViewerUi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one composition call, consumed once by the UI mount.
#[derive(Clone)]
pub struct ViewerDescriptor {
    pub ui: ViewerUi,
    pub query_data_model: Option<Arc<QueryDataModel>>,
    pub image_builder: Option<Arc<dyn ImageBuilder>>,
    pub painter: Option<Arc<dyn Painter>>,
    /// Named renderers of an ensemble.
    pub renderers: Option<RendererMap>,
    /// Alternatives produced by a nested selector; the first one is canonical.
    pub list: Vec<ViewerDescriptor>,
    /// Dataset listing shown by `ArcticListViewer`.
    pub listing: Option<Value>,
    pub base_path: Option<String>,
    pub allow_magic_lens: bool,
    pub bg_color: Option<String>,
    pub config: ViewerConfig,
}

impl ViewerDescriptor {
    pub fn new(ui: ViewerUi, config: ViewerConfig) -> Self {
        Self {
            ui,
            query_data_model: None,
            image_builder: None,
            painter: None,
            renderers: None,
            list: Vec::new(),
            listing: None,
            base_path: None,
            allow_magic_lens: false,
            bg_color: None,
            config,
        }
    }

    /// Release every renderer held by this descriptor and its list items.
    pub fn destroy(&self) {
        if let Some(builder) = &self.image_builder {
            builder.destroy();
        }
        if let Some(painter) = &self.painter {
            painter.destroy();
        }
        for item in &self.list {
            item.destroy();
        }
    }
}

impl fmt::Debug for ViewerDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewerDescriptor")
            .field("ui", &self.ui)
            .field("query_data_model", &self.query_data_model.as_ref().map(|m| m.id()))
            .field("image_builder", &self.image_builder.as_ref().map(|b| b.name()))
            .field("painter", &self.painter.as_ref().map(|p| p.name()))
            .field("renderers", &self.renderers)
            .field("list_len", &self.list.len())
            .field("base_path", &self.base_path)
            .field("allow_magic_lens", &self.allow_magic_lens)
            .field("bg_color", &self.bg_color)
            .finish()
    }
}
