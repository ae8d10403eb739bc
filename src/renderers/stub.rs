// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Recording renderers and viewer types for tests.

use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::model::subscription::lock;
use crate::model::{Listeners, QueryDataModel, SubscriptionId};
use crate::traits::{
    EventHandler, ImageBuilder, ImageData, ImageListener, Painter, Renderer, SharedModel,
    ViewerBuildArgs, ViewerTypeBuilder,
};

/// Sub-model that records the peer group it was bound to.
#[derive(Debug, Default)]
pub struct StubSharedModel {
    bound_peers: Mutex<Option<usize>>,
}

impl StubSharedModel {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn bound_peers(&self) -> Option<usize> {
        *lock(&self.bound_peers)
    }
}

impl SharedModel for StubSharedModel {
    fn bind(&self, peers: &[Arc<dyn SharedModel>]) {
        *lock(&self.bound_peers) = Some(peers.len());
    }
}

/// Renderer state shared by the stub builder and painter.
#[derive(Default)]
struct StubCore {
    name: Mutex<String>,
    events: HashMap<String, Listeners<Value>>,
    setters: Vec<String>,
    applied: Mutex<Vec<(String, Value)>>,
    sub_models: HashMap<String, Arc<StubSharedModel>>,
    updates: AtomicUsize,
    destroyed: AtomicBool,
}

impl StubCore {
    fn named(name: &str) -> Self {
        Self {
            name: Mutex::new(name.to_string()),
            ..Self::default()
        }
    }

    fn listen(&self, event: &str, handler: EventHandler) -> bool {
        match self.events.get(event) {
            Some(listeners) => {
                listeners.subscribe(handler);
                true
            }
            None => false,
        }
    }

    fn apply(&self, setter: &str, payload: &Value) -> bool {
        if !self.setters.iter().any(|s| s == setter) {
            return false;
        }
        lock(&self.applied).push((setter.to_string(), payload.clone()));
        true
    }

    fn emit_event(&self, event: &str, payload: &Value) -> usize {
        self.events.get(event).map(|l| l.emit(payload)).unwrap_or(0)
    }

    fn sub_model(&self, field: &str) -> Option<Arc<dyn SharedModel>> {
        self.sub_models
            .get(field)
            .map(|m| Arc::clone(m) as Arc<dyn SharedModel>)
    }
}

macro_rules! stub_renderer_impl {
    ($ty:ty) => {
        impl $ty {
            pub fn with_event(mut self, event: &str) -> Self {
                self.core.events.insert(event.to_string(), Listeners::new());
                self
            }

            pub fn with_setter(mut self, setter: &str) -> Self {
                self.core.setters.push(setter.to_string());
                self
            }

            pub fn with_sub_model(mut self, field: &str, model: Arc<StubSharedModel>) -> Self {
                self.core.sub_models.insert(field.to_string(), model);
                self
            }

            /// Fire a named event as the renderer itself would.
            pub fn emit_event(&self, event: &str, payload: &Value) -> usize {
                self.core.emit_event(event, payload)
            }

            pub fn applied(&self) -> Vec<(String, Value)> {
                lock(&self.core.applied).clone()
            }

            pub fn update_count(&self) -> usize {
                self.core.updates.load(Ordering::SeqCst)
            }

            pub fn is_destroyed(&self) -> bool {
                self.core.destroyed.load(Ordering::SeqCst)
            }
        }

        impl Renderer for $ty {
            fn name(&self) -> String {
                lock(&self.core.name).clone()
            }

            fn set_name(&self, name: &str) {
                *lock(&self.core.name) = name.to_string();
            }

            fn update(&self) {
                self.core.updates.fetch_add(1, Ordering::SeqCst);
            }

            fn listen(&self, event: &str, handler: EventHandler) -> bool {
                self.core.listen(event, handler)
            }

            fn apply(&self, setter: &str, payload: &Value) -> bool {
                self.core.apply(setter, payload)
            }

            fn sub_model(&self, field: &str) -> Option<Arc<dyn SharedModel>> {
                self.core.sub_model(field)
            }

            fn destroy(&self) {
                self.core.destroyed.store(true, Ordering::SeqCst);
            }
        }
    };
}

pub struct StubImageBuilder {
    core: StubCore,
    model: Option<Arc<QueryDataModel>>,
    images: Listeners<ImageData>,
}

impl StubImageBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            core: StubCore::named(name),
            model: None,
            images: Listeners::new(),
        }
    }

    pub fn with_model(mut self, model: Arc<QueryDataModel>) -> Self {
        self.model = Some(model);
        self
    }

    /// Publish a frame to image-ready listeners.
    pub fn emit_image(&self, image: &ImageData) -> usize {
        self.images.emit(image)
    }

    pub fn image_listener_count(&self) -> usize {
        self.images.len()
    }
}

stub_renderer_impl!(StubImageBuilder);

impl ImageBuilder for StubImageBuilder {
    fn query_data_model(&self) -> Option<Arc<QueryDataModel>> {
        self.model.clone()
    }

    fn on_image_ready(&self, listener: ImageListener) -> SubscriptionId {
        self.images.subscribe(listener)
    }
}

pub struct StubPainter {
    core: StubCore,
}

impl StubPainter {
    pub fn new(name: &str) -> Self {
        Self {
            core: StubCore::named(name),
        }
    }
}

stub_renderer_impl!(StubPainter);

impl Painter for StubPainter {}

/// Viewer type accepting manifests tagged with `tag`.
///
/// Every accepted manifest gets a `StubImageBuilder` driven by the seeded
/// query model (or a fresh one). With `list_items > 0` the descriptor also
/// carries that many alternative list items. Created builders are kept for
/// inspection.
pub struct StubViewerType {
    tag: String,
    allow_magic_lens: bool,
    list_items: usize,
    created: Mutex<Vec<Arc<StubImageBuilder>>>,
}

impl StubViewerType {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            allow_magic_lens: false,
            list_items: 0,
            created: Mutex::new(Vec::new()),
        }
    }

    pub fn allow_magic_lens(mut self, allow: bool) -> Self {
        self.allow_magic_lens = allow;
        self
    }

    pub fn with_list_items(mut self, count: usize) -> Self {
        self.list_items = count;
        self
    }

    pub fn created(&self) -> Vec<Arc<StubImageBuilder>> {
        lock(&self.created).clone()
    }

    fn new_builder(&self, model: Arc<QueryDataModel>) -> Arc<StubImageBuilder> {
        let builder = Arc::new(
            StubImageBuilder::new("stub")
                .with_model(model)
                .with_event("onLutChange")
                .with_setter("setLut")
                .with_sub_model("lookupTableManager", StubSharedModel::new()),
        );
        lock(&self.created).push(Arc::clone(&builder));
        builder
    }
}

impl ViewerTypeBuilder for StubViewerType {
    fn name(&self) -> &'static str {
        "stub"
    }

    fn build(&self, args: &mut ViewerBuildArgs<'_>) -> bool {
        if !args.manifest.has_type(&self.tag) {
            return false;
        }

        let model = args.viewer.query_data_model.clone().unwrap_or_else(|| {
            Arc::new(QueryDataModel::from_manifest(&args.manifest.raw, args.basepath))
        });
        args.viewer.query_data_model = Some(Arc::clone(&model));
        args.viewer.image_builder = Some(self.new_builder(Arc::clone(&model)));
        args.viewer.allow_magic_lens = self.allow_magic_lens;

        for _ in 0..self.list_items {
            let item_model = Arc::new(QueryDataModel::from_manifest(
                &args.manifest.raw,
                args.basepath,
            ));
            let mut item = args.viewer.clone();
            item.list.clear();
            item.query_data_model = Some(Arc::clone(&item_model));
            item.image_builder = Some(self.new_builder(item_model));
            args.viewer.list.push(item);
        }
        true
    }
}
