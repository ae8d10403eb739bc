// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::consts::{ENSEMBLE_KEY, MAGIC_LENS_KEY};
use crate::errors::ConfigError;
use serde_json::{Map, Number, Value};
use std::fs;
use std::path::Path;

/// Effective configuration of one composition call.
///
/// The configuration is an open JSON object: viewer types may read any key
/// they understand. Two keys drive composition itself:
///
/// * `MagicLens` - compose plain manifests as a two-layer magic lens (truthy)
/// * `ensemble` - set on every ensemble child; disables the magic lens there
///
/// # Example
/// ```
/// use arctic_composer::config::ViewerConfig;
/// use serde_json::json;
///
/// let mut config = ViewerConfig::from_value(json!({ "MagicLens": true }));
/// assert!(config.magic_lens());
///
/// config.merge(&ViewerConfig::from_value(json!({ "MagicLens": false })));
/// assert!(!config.magic_lens());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewerConfig(Map<String, Value>);

impl ViewerConfig {
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Wrap a JSON document. Anything other than an object yields an empty
    /// configuration.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map),
            _ => Self::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Deep-merge `other` into `self`; `other` wins on conflicts.
    ///
    /// Nested objects are merged key by key, every other value replaces
    /// the existing one.
    pub fn merge(&mut self, other: &ViewerConfig) {
        merge_maps(&mut self.0, &other.0);
    }

    pub fn magic_lens(&self) -> bool {
        self.get(MAGIC_LENS_KEY).map(is_truthy).unwrap_or(false)
    }

    pub fn set_magic_lens(&mut self, enabled: bool) {
        self.set(MAGIC_LENS_KEY, enabled);
    }

    pub fn is_ensemble(&self) -> bool {
        self.get(ENSEMBLE_KEY).map(is_truthy).unwrap_or(false)
    }

    pub fn set_ensemble(&mut self, ensemble: bool) {
        self.set(ENSEMBLE_KEY, ensemble);
    }
}

impl From<Map<String, Value>> for ViewerConfig {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl From<ViewerConfig> for Value {
    fn from(config: ViewerConfig) -> Self {
        Value::Object(config.0)
    }
}

fn merge_maps(target: &mut Map<String, Value>, source: &Map<String, Value>) {
    for (key, value) in source {
        match (target.get_mut(key), value) {
            (Some(Value::Object(existing)), Value::Object(incoming)) => {
                merge_maps(existing, incoming);
            }
            _ => {
                target.insert(key.clone(), value.clone());
            }
        }
    }
}

/// JavaScript-style truthiness of a configuration value.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(false),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Compute the effective configuration: base, then overrides, then
/// parameters from the page location. Later sources win.
///
/// A missing base (fetch failure) counts as an empty object.
pub fn effective_config(
    base: Option<Value>,
    overrides: &ViewerConfig,
    location: Option<&str>,
) -> ViewerConfig {
    let mut config = base.map(ViewerConfig::from_value).unwrap_or_default();
    config.merge(overrides);
    if let Some(location) = location {
        config.merge(&ViewerConfig(parse_location_params(location)));
    }
    config
}

/// Extract query-string parameters from a page location.
///
/// Values are typecast: `true`/`false` become booleans, `null` becomes
/// null, numeric strings become numbers. A key given more than once
/// collects its values into an array.
pub fn parse_location_params(location: &str) -> Map<String, Value> {
    let query = match url::Url::parse(location) {
        Ok(url) => url.query().map(str::to_string),
        Err(_) => location.split_once('?').map(|(_, q)| q.to_string()),
    };

    let mut params = Map::new();
    let Some(query) = query else {
        return params;
    };

    for (key, raw) in url::form_urlencoded::parse(query.as_bytes()) {
        let value = typecast(&raw);
        match params.get_mut(key.as_ref()) {
            Some(Value::Array(existing)) => existing.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
            None => {
                params.insert(key.into_owned(), value);
            }
        }
    }
    params
}

fn typecast(raw: &str) -> Value {
    match raw {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        "null" => Value::Null,
        _ => {
            if let Ok(int) = raw.parse::<i64>() {
                return Value::Number(int.into());
            }
            raw.parse::<f64>()
                .ok()
                .filter(|f| f.is_finite())
                .and_then(Number::from_f64)
                .map(Value::Number)
                .unwrap_or_else(|| Value::String(raw.to_string()))
        }
    }
}

/// Load a configuration override file (YAML or JSON).
pub fn load_overrides<P: AsRef<Path>>(path: P) -> Result<ViewerConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let value: Value = serde_yaml::from_str(&content)?;
    match value {
        Value::Object(map) => Ok(ViewerConfig(map)),
        Value::Null => Ok(ViewerConfig::new()),
        Value::Array(_) => Err(ConfigError::NotAMapping("a sequence")),
        _ => Err(ConfigError::NotAMapping("a scalar")),
    }
}
