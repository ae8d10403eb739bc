// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Named-argument state container driving which data variant a renderer shows.
//!
//! A `QueryDataModel` holds the current value of every query argument of a
//! dataset (`time`, `phi`, `theta`, ...). Changing a value notifies state
//! listeners; `fetch_data` resolves the dataset's data patterns against the
//! current values and announces the resulting request to data listeners.
//!
//! Models are shared by reference (`Arc<QueryDataModel>`): several renderers
//! may hold the same instance, and a mutation through any holder is visible to
//! all of them.

use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::model::subscription::{lock, Listener, Listeners, SubscriptionId};

static NEXT_MODEL_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a model instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModelId(u64);

impl std::fmt::Display for ModelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "qdm#{}", self.0)
    }
}

/// Published on the state channel whenever an argument value changes.
#[derive(Debug, Clone, PartialEq)]
pub struct ArgumentChange {
    pub name: String,
    pub value: Value,
    pub model: ModelId,
}

/// Published on the data channel by `fetch_data`.
#[derive(Debug, Clone, PartialEq)]
pub struct DataRequest {
    pub model: ModelId,
    pub arguments: BTreeMap<String, Value>,
    /// Resolved URL per data entry name.
    pub urls: BTreeMap<String, String>,
}

#[derive(Debug, Clone)]
struct DataPattern {
    name: String,
    pattern: String,
}

#[derive(Debug, Default)]
struct ModelState {
    values: BTreeMap<String, Value>,
    allowed: BTreeMap<String, Vec<Value>>,
    order: Vec<String>,
}

pub struct QueryDataModel {
    id: ModelId,
    basepath: String,
    patterns: Vec<DataPattern>,
    state: Mutex<ModelState>,
    state_listeners: Listeners<ArgumentChange>,
    data_listeners: Listeners<DataRequest>,
    fetch_count: AtomicUsize,
}

impl QueryDataModel {
    /// Create an empty model that accepts any value for any argument.
    pub fn new(basepath: impl Into<String>) -> Self {
        Self {
            id: ModelId(NEXT_MODEL_ID.fetch_add(1, Ordering::Relaxed)),
            basepath: basepath.into(),
            patterns: Vec::new(),
            state: Mutex::new(ModelState::default()),
            state_listeners: Listeners::new(),
            data_listeners: Listeners::new(),
            fetch_count: AtomicUsize::new(0),
        }
    }

    /// Build a model from a dataset manifest.
    ///
    /// Reads `arguments.<name>.values` (allowed values), `arguments.<name>.default`
    /// (index into `values`, defaults to 0), `arguments_order`, and the
    /// `data[].{name, pattern}` entries used by `fetch_data`.
    pub fn from_manifest(manifest: &Value, basepath: impl Into<String>) -> Self {
        let mut model = Self::new(basepath);
        let mut state = ModelState::default();

        if let Some(arguments) = manifest.get("arguments").and_then(Value::as_object) {
            for (name, spec) in arguments {
                let values = argument_values(spec);
                let default_index = spec
                    .get("default")
                    .and_then(Value::as_u64)
                    .map(|idx| idx as usize)
                    .unwrap_or(0);
                if let Some(initial) = values.get(default_index).or_else(|| values.first()) {
                    state.values.insert(name.clone(), initial.clone());
                }
                state.allowed.insert(name.clone(), values);
            }
        }

        state.order = manifest
            .get("arguments_order")
            .and_then(Value::as_array)
            .map(|order| {
                order
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_else(|| state.allowed.keys().cloned().collect());

        model.patterns = manifest
            .get("data")
            .and_then(Value::as_array)
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(|entry| {
                        Some(DataPattern {
                            name: entry.get("name")?.as_str()?.to_string(),
                            pattern: entry.get("pattern")?.as_str()?.to_string(),
                        })
                    })
                    .collect()
            })
            .unwrap_or_default();

        model.state = Mutex::new(state);
        model
    }

    pub fn id(&self) -> ModelId {
        self.id
    }

    pub fn basepath(&self) -> &str {
        &self.basepath
    }

    pub fn get_value(&self, name: &str) -> Option<Value> {
        lock(&self.state).values.get(name).cloned()
    }

    /// Snapshot of every current argument value.
    pub fn values(&self) -> BTreeMap<String, Value> {
        lock(&self.state).values.clone()
    }

    /// Argument names in their declared order.
    pub fn argument_names(&self) -> Vec<String> {
        lock(&self.state).order.clone()
    }

    /// Set an argument value. Returns true when the stored value changed.
    ///
    /// Values outside a declared value list are rejected. Listeners are
    /// notified after the internal lock is released.
    pub fn set_value(&self, name: &str, value: impl Into<Value>) -> bool {
        let value = value.into();
        {
            let mut state = lock(&self.state);
            if let Some(allowed) = state.allowed.get(name) {
                if !allowed.is_empty() && !allowed.contains(&value) {
                    tracing::debug!(model = %self.id, argument = name, %value, "rejected value outside argument range");
                    return false;
                }
            }
            if state.values.get(name) == Some(&value) {
                return false;
            }
            state.values.insert(name.to_string(), value.clone());
            if !state.order.iter().any(|n| n == name) {
                state.order.push(name.to_string());
            }
        }

        self.state_listeners.emit(&ArgumentChange {
            name: name.to_string(),
            value,
            model: self.id,
        });
        true
    }

    pub fn on_state_change(&self, listener: Listener<ArgumentChange>) -> SubscriptionId {
        self.state_listeners.subscribe(listener)
    }

    pub fn on_data_request(&self, listener: Listener<DataRequest>) -> SubscriptionId {
        self.data_listeners.subscribe(listener)
    }

    /// Detach a state or data listener.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.state_listeners.unsubscribe(id) || self.data_listeners.unsubscribe(id)
    }

    pub fn state_listener_count(&self) -> usize {
        self.state_listeners.len()
    }

    /// Request data for the current argument values.
    pub fn fetch_data(&self) -> DataRequest {
        let arguments = self.values();
        let urls = self
            .patterns
            .iter()
            .map(|p| {
                (
                    p.name.clone(),
                    format!("{}{}", self.basepath, resolve_pattern(&p.pattern, &arguments)),
                )
            })
            .collect();
        let request = DataRequest {
            model: self.id,
            arguments,
            urls,
        };

        self.fetch_count.fetch_add(1, Ordering::SeqCst);
        self.data_listeners.emit(&request);
        request
    }

    /// Number of `fetch_data` calls so far.
    pub fn fetch_count(&self) -> usize {
        self.fetch_count.load(Ordering::SeqCst)
    }
}

impl std::fmt::Debug for QueryDataModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryDataModel")
            .field("id", &self.id)
            .field("basepath", &self.basepath)
            .field("values", &self.values())
            .finish()
    }
}

fn argument_values(spec: &Value) -> Vec<Value> {
    spec.get("values")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default()
}

/// Substitute `{name}` placeholders with argument values.
fn resolve_pattern(pattern: &str, arguments: &BTreeMap<String, Value>) -> String {
    let mut resolved = pattern.to_string();
    for (name, value) in arguments {
        let text = match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        resolved = resolved.replace(&format!("{{{}}}", name), &text);
    }
    resolved
}

/// Build a manifest-shaped argument section, mostly useful for callers that
/// assemble models programmatically.
pub fn arguments_section(arguments: &[(&str, Vec<Value>)]) -> Value {
    let mut section = Map::new();
    for (name, values) in arguments {
        let mut spec = Map::new();
        spec.insert("values".to_string(), Value::Array(values.clone()));
        section.insert(name.to_string(), Value::Object(spec));
    }
    Value::Object(section)
}
