// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Lens compositing renderer.
//!
//! Shows the foreground layer inside a circular lens and the background
//! layer everywhere else. Both layers keep rendering on their own; this
//! builder only listens to their frames and recomposites.

use serde_json::Value;
use std::sync::{Arc, Mutex, Weak};

use crate::model::subscription::lock;
use crate::model::{Listeners, QueryDataModel, SubscriptionId};
use crate::traits::{
    EventHandler, ImageBuilder, ImageData, ImageListener, Renderer, SharedModel,
};

pub const SET_LENS_CENTER: &str = "setLensCenter";
pub const SET_LENS_RADIUS: &str = "setLensRadius";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layer {
    Foreground,
    Background,
}

#[derive(Debug, Clone)]
struct LensState {
    /// Normalized image coordinates.
    center: (f64, f64),
    /// Normalized to the smaller image dimension.
    radius: f64,
    foreground: Option<ImageData>,
    background: Option<ImageData>,
}

impl Default for LensState {
    fn default() -> Self {
        Self {
            center: (0.5, 0.5),
            radius: 0.25,
            foreground: None,
            background: None,
        }
    }
}

pub struct MagicLensBuilder {
    name: Mutex<String>,
    foreground: Arc<dyn ImageBuilder>,
    background: Arc<dyn ImageBuilder>,
    state: Mutex<LensState>,
    images: Listeners<ImageData>,
}

impl MagicLensBuilder {
    /// Wrap two layers. The lens takes over the foreground's name.
    pub fn new(foreground: Arc<dyn ImageBuilder>, background: Arc<dyn ImageBuilder>) -> Arc<Self> {
        Arc::new_cyclic(|weak: &Weak<Self>| {
            foreground.on_image_ready(layer_listener(weak.clone(), Layer::Foreground));
            background.on_image_ready(layer_listener(weak.clone(), Layer::Background));
            Self {
                name: Mutex::new(foreground.name()),
                foreground,
                background,
                state: Mutex::new(LensState::default()),
                images: Listeners::new(),
            }
        })
    }

    pub fn foreground(&self) -> &Arc<dyn ImageBuilder> {
        &self.foreground
    }

    pub fn background(&self) -> &Arc<dyn ImageBuilder> {
        &self.background
    }

    pub fn lens_center(&self) -> (f64, f64) {
        lock(&self.state).center
    }

    pub fn lens_radius(&self) -> f64 {
        lock(&self.state).radius
    }

    fn receive(&self, layer: Layer, image: &ImageData) {
        if !image.is_complete() {
            tracing::warn!(
                lens = %lock(&self.name),
                ?layer,
                width = image.width,
                height = image.height,
                pixels = image.pixels.len(),
                "dropping lens layer frame with wrong pixel count"
            );
            return;
        }
        {
            let mut state = lock(&self.state);
            match layer {
                Layer::Foreground => state.foreground = Some(image.clone()),
                Layer::Background => state.background = Some(image.clone()),
            }
        }
        self.recomposite();
    }

    fn recomposite(&self) {
        let composed = {
            let state = lock(&self.state);
            match (&state.foreground, &state.background) {
                (Some(fg), Some(bg)) if fg.same_shape(bg) => {
                    Some(composite(&lock(&self.name), fg, bg, state.center, state.radius))
                }
                _ => None,
            }
        };
        if let Some(image) = composed {
            self.images.emit(&image);
        }
    }
}

fn layer_listener(lens: Weak<MagicLensBuilder>, layer: Layer) -> ImageListener {
    Arc::new(move |image: &ImageData| {
        if let Some(lens) = lens.upgrade() {
            lens.receive(layer, image);
        }
    })
}

fn composite(
    name: &str,
    fg: &ImageData,
    bg: &ImageData,
    center: (f64, f64),
    radius: f64,
) -> ImageData {
    let (width, height) = (fg.width, fg.height);
    let scale = width.min(height).max(1) as f64;
    let (cx, cy) = (center.0 * width as f64, center.1 * height as f64);
    let r = radius * scale;

    let pixels = (0..width * height)
        .map(|idx| {
            let x = (idx % width) as f64 + 0.5;
            let y = (idx / width) as f64 + 0.5;
            let inside = (x - cx).powi(2) + (y - cy).powi(2) <= r * r;
            if inside {
                fg.pixels[idx]
            } else {
                bg.pixels[idx]
            }
        })
        .collect();

    let mut image = ImageData::new(name, width, height, pixels);
    image.source_url = fg.source_url.clone();
    image
}

fn parse_center(payload: &Value) -> Option<(f64, f64)> {
    match payload {
        Value::Array(items) if items.len() == 2 => Some((items[0].as_f64()?, items[1].as_f64()?)),
        Value::Object(map) => Some((map.get("x")?.as_f64()?, map.get("y")?.as_f64()?)),
        _ => None,
    }
}

impl Renderer for MagicLensBuilder {
    fn name(&self) -> String {
        lock(&self.name).clone()
    }

    fn set_name(&self, name: &str) {
        *lock(&self.name) = name.to_string();
    }

    fn update(&self) {
        self.foreground.update();
        self.background.update();
    }

    fn listen(&self, event: &str, handler: EventHandler) -> bool {
        self.foreground.listen(event, handler)
    }

    fn apply(&self, setter: &str, payload: &Value) -> bool {
        match setter {
            SET_LENS_CENTER => {
                let Some(center) = parse_center(payload) else {
                    return false;
                };
                lock(&self.state).center = center;
            }
            SET_LENS_RADIUS => {
                let Some(radius) = payload.as_f64().filter(|r| *r >= 0.0) else {
                    return false;
                };
                lock(&self.state).radius = radius;
            }
            _ => return self.foreground.apply(setter, payload),
        }
        self.recomposite();
        true
    }

    fn sub_model(&self, field: &str) -> Option<Arc<dyn SharedModel>> {
        self.foreground.sub_model(field)
    }

    fn destroy(&self) {
        self.foreground.destroy();
        self.background.destroy();
    }
}

impl ImageBuilder for MagicLensBuilder {
    fn query_data_model(&self) -> Option<Arc<QueryDataModel>> {
        self.foreground.query_data_model()
    }

    fn on_image_ready(&self, listener: ImageListener) -> SubscriptionId {
        self.images.subscribe(listener)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderers::stub::StubImageBuilder;
    use serde_json::json;

    fn layers() -> (Arc<StubImageBuilder>, Arc<StubImageBuilder>, Arc<MagicLensBuilder>) {
        let fg = Arc::new(
            StubImageBuilder::new("fg")
                .with_model(Arc::new(QueryDataModel::new("")))
                .with_setter("setLut"),
        );
        let bg = Arc::new(StubImageBuilder::new("bg"));
        let lens = MagicLensBuilder::new(fg.clone(), bg.clone());
        (fg, bg, lens)
    }

    fn collect(lens: &MagicLensBuilder) -> Arc<Mutex<Vec<ImageData>>> {
        let frames = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&frames);
        lens.on_image_ready(Arc::new(move |image: &ImageData| {
            sink.lock().unwrap().push(image.clone());
        }));
        frames
    }

    #[test]
    fn exposes_foreground_model_and_name() {
        let (fg, _bg, lens) = layers();
        assert_eq!(lens.name(), "fg");
        assert_eq!(
            lens.query_data_model().map(|m| m.id()),
            fg.query_data_model().map(|m| m.id())
        );
    }

    #[test]
    fn composites_foreground_inside_lens() {
        let (fg, bg, lens) = layers();
        let frames = collect(&lens);

        fg.emit_image(&ImageData::new("fg", 4, 4, vec![1.0; 16]));
        assert!(frames.lock().unwrap().is_empty());
        bg.emit_image(&ImageData::new("bg", 4, 4, vec![0.0; 16]));

        let frames = frames.lock().unwrap();
        assert_eq!(frames.len(), 1);
        let pixels = &frames[0].pixels;
        // radius 0.25 * 4 = 1 pixel around the center (2, 2)
        assert_eq!(pixels[0], 0.0);
        assert_eq!(pixels[4 + 1], 1.0);
        assert_eq!(pixels[2 * 4 + 2], 1.0);
        assert_eq!(pixels[15], 0.0);
    }

    #[test]
    fn lens_setters_recomposite() {
        let (fg, bg, lens) = layers();
        let frames = collect(&lens);
        fg.emit_image(&ImageData::new("fg", 2, 2, vec![1.0; 4]));
        bg.emit_image(&ImageData::new("bg", 2, 2, vec![0.0; 4]));

        assert!(lens.apply(SET_LENS_RADIUS, &json!(0)));
        assert!(lens.apply(SET_LENS_CENTER, &json!({ "x": 0.25, "y": 0.25 })));
        assert!(!lens.apply(SET_LENS_CENTER, &json!("middle")));

        assert_eq!(lens.lens_center(), (0.25, 0.25));
        let frames = frames.lock().unwrap();
        assert_eq!(frames.len(), 3);
        // zero radius still covers the pixel whose center is the lens center
        assert_eq!(*frames[2].pixels, vec![1.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn incomplete_frames_are_dropped() {
        let (fg, bg, lens) = layers();
        let frames = collect(&lens);

        fg.emit_image(&ImageData::new("fg", 2, 2, vec![1.0]));
        bg.emit_image(&ImageData::new("bg", 2, 2, vec![0.0]));
        assert!(frames.lock().unwrap().is_empty());

        fg.emit_image(&ImageData::new("fg", 2, 2, vec![1.0; 4]));
        bg.emit_image(&ImageData::new("bg", 2, 2, vec![0.0; 3]));
        assert!(frames.lock().unwrap().is_empty());

        bg.emit_image(&ImageData::new("bg", 2, 2, vec![0.0; 4]));
        assert_eq!(frames.lock().unwrap().len(), 1);
    }

    #[test]
    fn unknown_setters_reach_foreground() {
        let (fg, _bg, lens) = layers();
        assert!(lens.apply("setLut", &json!("jet")));
        assert_eq!(fg.applied(), vec![("setLut".to_string(), json!("jet"))]);
    }
}
