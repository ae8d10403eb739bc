// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::BTreeMap;
use std::sync::{Arc, Weak};

use serde_json::Value;

use crate::model::QueryDataModel;
use crate::traits::{EventHandler, ImageBuilder, Painter, SharedModel};

/// The role a renderer plays in an ensemble.
///
/// Image builders produce frames and may carry a query data model; painters
/// draw geometry. Binding treats both as renderers; operator wiring only
/// accepts builders.
#[derive(Clone)]
pub enum RendererRole {
    Builder(Arc<dyn ImageBuilder>),
    Painter(Arc<dyn Painter>),
}

impl RendererRole {
    pub fn name(&self) -> String {
        match self {
            RendererRole::Builder(b) => b.name(),
            RendererRole::Painter(p) => p.name(),
        }
    }

    pub fn set_name(&self, name: &str) {
        match self {
            RendererRole::Builder(b) => b.set_name(name),
            RendererRole::Painter(p) => p.set_name(name),
        }
    }

    pub fn update(&self) {
        match self {
            RendererRole::Builder(b) => b.update(),
            RendererRole::Painter(p) => p.update(),
        }
    }

    pub fn listen(&self, event: &str, handler: EventHandler) -> bool {
        match self {
            RendererRole::Builder(b) => b.listen(event, handler),
            RendererRole::Painter(p) => p.listen(event, handler),
        }
    }

    pub fn apply(&self, setter: &str, payload: &Value) -> bool {
        match self {
            RendererRole::Builder(b) => b.apply(setter, payload),
            RendererRole::Painter(p) => p.apply(setter, payload),
        }
    }

    pub fn sub_model(&self, field: &str) -> Option<Arc<dyn SharedModel>> {
        match self {
            RendererRole::Builder(b) => b.sub_model(field),
            RendererRole::Painter(p) => p.sub_model(field),
        }
    }

    pub fn destroy(&self) {
        match self {
            RendererRole::Builder(b) => b.destroy(),
            RendererRole::Painter(p) => p.destroy(),
        }
    }

    pub fn builder(&self) -> Option<&Arc<dyn ImageBuilder>> {
        match self {
            RendererRole::Builder(b) => Some(b),
            RendererRole::Painter(_) => None,
        }
    }

    /// Query data model of a builder; painters have none.
    pub fn query_data_model(&self) -> Option<Arc<QueryDataModel>> {
        self.builder().and_then(|b| b.query_data_model())
    }

    pub fn downgrade(&self) -> WeakRendererRole {
        match self {
            RendererRole::Builder(b) => WeakRendererRole::Builder(Arc::downgrade(b)),
            RendererRole::Painter(p) => WeakRendererRole::Painter(Arc::downgrade(p)),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            RendererRole::Builder(_) => "builder",
            RendererRole::Painter(_) => "painter",
        }
    }
}

/// Non-owning handle, held by callbacks that renderers themselves own.
#[derive(Clone)]
pub enum WeakRendererRole {
    Builder(Weak<dyn ImageBuilder>),
    Painter(Weak<dyn Painter>),
}

impl WeakRendererRole {
    pub fn upgrade(&self) -> Option<RendererRole> {
        match self {
            WeakRendererRole::Builder(b) => b.upgrade().map(RendererRole::Builder),
            WeakRendererRole::Painter(p) => p.upgrade().map(RendererRole::Painter),
        }
    }
}

/// One named renderer of an ensemble.
#[derive(Clone)]
pub struct RendererEntry {
    pub name: String,
    pub role: RendererRole,
    pub query_data_model: Option<Arc<QueryDataModel>>,
}

impl RendererEntry {
    /// Entry for an image builder, using the builder's own query model.
    pub fn builder(name: impl Into<String>, builder: Arc<dyn ImageBuilder>) -> Self {
        let query_data_model = builder.query_data_model();
        Self {
            name: name.into(),
            role: RendererRole::Builder(builder),
            query_data_model,
        }
    }

    pub fn painter(name: impl Into<String>, painter: Arc<dyn Painter>) -> Self {
        Self {
            name: name.into(),
            role: RendererRole::Painter(painter),
            query_data_model: None,
        }
    }
}

/// Renderers of an ensemble keyed by their unique name.
#[derive(Clone, Default)]
pub struct RendererMap(pub BTreeMap<String, RendererEntry>);

impl RendererMap {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Insert under the entry's name, replacing an existing entry.
    pub fn insert(&mut self, entry: RendererEntry) -> Option<RendererEntry> {
        self.0.insert(entry.name.clone(), entry)
    }

    pub fn get(&self, name: &str) -> Option<&RendererEntry> {
        self.0.get(name)
    }

    /// Image builder registered under `name`.
    pub fn builder(&self, name: &str) -> Option<Arc<dyn ImageBuilder>> {
        self.get(name)
            .and_then(|entry| entry.role.builder())
            .map(Arc::clone)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn entries(&self) -> impl Iterator<Item = &RendererEntry> {
        self.0.values()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Debug for RendererMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(self.0.iter().map(|(name, entry)| (name, entry.role.kind())))
            .finish()
    }
}

impl From<BTreeMap<String, RendererEntry>> for RendererMap {
    fn from(map: BTreeMap<String, RendererEntry>) -> Self {
        Self(map)
    }
}
