// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Pixel operators: image builders that combine the frames of other builders.
//!
//! An operator keeps the latest frame per source. Once every source has
//! delivered a frame of the same shape, the operation is folded over the
//! frames in declared source order and the result is published to the
//! operator's own image-ready listeners, so operators can feed operators.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::errors::ComposeError;
use crate::model::subscription::lock;
use crate::model::{Listeners, QueryDataModel, SubscriptionId};
use crate::traits::{
    ImageBuilder, ImageData, ImageListener, OperatorFactory, PixelOperator, Renderer,
};

/// Per-pixel combination function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelOperation {
    Add,
    Subtract,
    Multiply,
    Divide,
    Average,
    Min,
    Max,
}

impl PixelOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            PixelOperation::Add => "add",
            PixelOperation::Subtract => "subtract",
            PixelOperation::Multiply => "multiply",
            PixelOperation::Divide => "divide",
            PixelOperation::Average => "average",
            PixelOperation::Min => "min",
            PixelOperation::Max => "max",
        }
    }

    /// Combine equally sized frames pixel by pixel.
    ///
    /// Folds left to right (`a - b - c` for subtract). Division follows IEEE
    /// float semantics, so a zero divisor yields an infinity or NaN.
    pub fn combine(&self, frames: &[&[f32]]) -> Vec<f32> {
        let Some((first, rest)) = frames.split_first() else {
            return Vec::new();
        };

        let mut out = first.to_vec();
        for frame in rest {
            for (acc, value) in out.iter_mut().zip(frame.iter()) {
                *acc = match self {
                    PixelOperation::Add | PixelOperation::Average => *acc + value,
                    PixelOperation::Subtract => *acc - value,
                    PixelOperation::Multiply => *acc * value,
                    PixelOperation::Divide => *acc / value,
                    PixelOperation::Min => acc.min(*value),
                    PixelOperation::Max => acc.max(*value),
                };
            }
        }

        if *self == PixelOperation::Average {
            let count = frames.len() as f32;
            out.iter_mut().for_each(|v| *v /= count);
        }
        out
    }
}

impl FromStr for PixelOperation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "add" | "sum" => Ok(PixelOperation::Add),
            "subtract" | "diff" => Ok(PixelOperation::Subtract),
            "multiply" => Ok(PixelOperation::Multiply),
            "divide" => Ok(PixelOperation::Divide),
            "average" | "mean" => Ok(PixelOperation::Average),
            "min" => Ok(PixelOperation::Min),
            "max" => Ok(PixelOperation::Max),
            other => Err(other.to_string()),
        }
    }
}

impl fmt::Display for PixelOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub struct PixelOperatorBuilder {
    name: Mutex<String>,
    operation: PixelOperation,
    sources: Vec<String>,
    frames: Mutex<HashMap<String, ImageData>>,
    images: Listeners<ImageData>,
    inputs: AtomicUsize,
    computed: AtomicUsize,
}

impl PixelOperatorBuilder {
    pub fn new(name: &str, operation: PixelOperation, sources: &[String]) -> Self {
        Self {
            name: Mutex::new(name.to_string()),
            operation,
            sources: sources.to_vec(),
            frames: Mutex::new(HashMap::new()),
            images: Listeners::new(),
            inputs: AtomicUsize::new(0),
            computed: AtomicUsize::new(0),
        }
    }

    pub fn operation(&self) -> PixelOperation {
        self.operation
    }

    /// Number of `update_data` calls accepted so far.
    pub fn input_count(&self) -> usize {
        self.inputs.load(Ordering::SeqCst)
    }

    /// Number of frames computed and published so far.
    pub fn computed_count(&self) -> usize {
        self.computed.load(Ordering::SeqCst)
    }

    /// Fold the stored frames, or `None` while a source is missing or the
    /// shapes disagree.
    fn compute(&self) -> Option<ImageData> {
        let frames = lock(&self.frames);
        let ordered: Vec<&ImageData> = self
            .sources
            .iter()
            .map(|source| frames.get(source))
            .collect::<Option<_>>()?;

        let first = ordered.first()?;
        if let Some(mismatch) = ordered.iter().find(|frame| !frame.same_shape(first)) {
            tracing::warn!(
                operator = %lock(&self.name),
                expected = ?(first.width, first.height),
                found = ?(mismatch.width, mismatch.height),
                "pixel operator inputs differ in size"
            );
            return None;
        }

        let pixels: Vec<&[f32]> = ordered.iter().map(|frame| frame.pixels.as_slice()).collect();
        Some(ImageData::new(
            lock(&self.name).clone(),
            first.width,
            first.height,
            self.operation.combine(&pixels),
        ))
    }
}

impl Renderer for PixelOperatorBuilder {
    fn name(&self) -> String {
        lock(&self.name).clone()
    }

    fn set_name(&self, name: &str) {
        *lock(&self.name) = name.to_string();
    }

    fn update(&self) {
        if let Some(image) = self.compute() {
            self.images.emit(&image);
        }
    }
}

impl ImageBuilder for PixelOperatorBuilder {
    fn query_data_model(&self) -> Option<Arc<QueryDataModel>> {
        None
    }

    fn on_image_ready(&self, listener: ImageListener) -> SubscriptionId {
        self.images.subscribe(listener)
    }

    fn pixel_operator(&self) -> Option<&dyn PixelOperator> {
        Some(self)
    }
}

impl PixelOperator for PixelOperatorBuilder {
    fn update_data(&self, source: &str, image: &ImageData) {
        if !self.sources.iter().any(|s| s == source) {
            tracing::debug!(operator = %self.name(), source, "ignoring frame from unknown source");
            return;
        }
        if !image.is_complete() {
            tracing::warn!(
                operator = %self.name(),
                source,
                width = image.width,
                height = image.height,
                pixels = image.pixels.len(),
                "dropping frame with wrong pixel count"
            );
            return;
        }

        lock(&self.frames).insert(source.to_string(), image.clone());
        self.inputs.fetch_add(1, Ordering::SeqCst);

        if let Some(result) = self.compute() {
            self.computed.fetch_add(1, Ordering::SeqCst);
            self.images.emit(&result);
        }
    }

    fn sources(&self) -> Vec<String> {
        self.sources.clone()
    }
}

/// Builds a `PixelOperatorBuilder` for every known operation name.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultOperatorFactory;

impl OperatorFactory for DefaultOperatorFactory {
    fn create(
        &self,
        name: &str,
        operation: &str,
        sources: &[String],
    ) -> Result<Arc<dyn ImageBuilder>, ComposeError> {
        let op = operation
            .parse::<PixelOperation>()
            .map_err(|operation| ComposeError::UnknownOperation {
                name: name.to_string(),
                operation,
            })?;
        Ok(Arc::new(PixelOperatorBuilder::new(name, op, sources)))
    }
}
