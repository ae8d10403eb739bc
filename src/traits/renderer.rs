// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Interfaces the composition engine needs from concrete renderers.
//!
//! The engine never renders anything itself. It decides which renderer
//! objects exist, links them, and tells them when to update; everything it
//! calls on a renderer is declared here.

use serde_json::Value;
use std::sync::Arc;

use crate::errors::ComposeError;
use crate::model::{QueryDataModel, SubscriptionId};

/// Handler for a named renderer event (`listen`).
pub type EventHandler = Arc<dyn Fn(&Value) + Send + Sync>;

/// Handler for "image ready" notifications.
pub type ImageListener = Arc<dyn Fn(&ImageData) + Send + Sync>;

/// One rendered frame as published by an image builder.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageData {
    /// Name of the builder that produced the frame.
    pub builder: String,
    pub width: usize,
    pub height: usize,
    /// Row-major scalar values, `width * height` entries.
    pub pixels: Arc<Vec<f32>>,
    /// Location the frame was derived from, when it came from a data file.
    pub source_url: Option<String>,
}

impl ImageData {
    pub fn new(builder: impl Into<String>, width: usize, height: usize, pixels: Vec<f32>) -> Self {
        Self {
            builder: builder.into(),
            width,
            height,
            pixels: Arc::new(pixels),
            source_url: None,
        }
    }

    pub fn same_shape(&self, other: &ImageData) -> bool {
        self.width == other.width && self.height == other.height
    }

    /// True when `pixels` holds exactly `width * height` values.
    pub fn is_complete(&self) -> bool {
        self.width
            .checked_mul(self.height)
            .is_some_and(|len| len == self.pixels.len())
    }
}

/// A sub-model (lookup table, painter settings, ...) that can be kept in
/// two-way sync with its peers on other renderers.
pub trait SharedModel: Send + Sync {
    /// Keep `self` and every model in `peers` synchronized from now on.
    /// `peers` includes `self`.
    fn bind(&self, peers: &[Arc<dyn SharedModel>]);
}

/// Behavior shared by image builders and painters.
pub trait Renderer: Send + Sync {
    fn name(&self) -> String;

    fn set_name(&self, name: &str);

    /// Render with the current state.
    fn update(&self) {}

    /// Subscribe to a named event. Returns false when the renderer has no
    /// such event.
    fn listen(&self, _event: &str, _handler: EventHandler) -> bool {
        false
    }

    /// Invoke a named setter with an event payload. Returns false when the
    /// renderer has no such setter.
    fn apply(&self, _setter: &str, _payload: &Value) -> bool {
        false
    }

    /// Named sub-model, if this renderer carries one.
    fn sub_model(&self, _field: &str) -> Option<Arc<dyn SharedModel>> {
        None
    }

    /// Release resources; called on list items that are discarded.
    fn destroy(&self) {}
}

/// Image-producing renderer.
pub trait ImageBuilder: Renderer {
    fn query_data_model(&self) -> Option<Arc<QueryDataModel>>;

    fn on_image_ready(&self, listener: ImageListener) -> SubscriptionId;

    /// Input side of a pixel operator; `None` for plain builders.
    fn pixel_operator(&self) -> Option<&dyn PixelOperator> {
        None
    }
}

/// Geometry-drawing renderer.
pub trait Painter: Renderer {}

/// Derived renderer combining the frames of several source renderers.
pub trait PixelOperator: Send + Sync {
    /// Feed the latest frame of `source`. Recomputation policy belongs to
    /// the implementation.
    fn update_data(&self, source: &str, image: &ImageData);

    fn sources(&self) -> Vec<String>;
}

/// Constructs pixel operators from `(operation, sources)`.
pub trait OperatorFactory: Send + Sync {
    fn create(
        &self,
        name: &str,
        operation: &str,
        sources: &[String],
    ) -> Result<Arc<dyn ImageBuilder>, ComposeError>;
}
