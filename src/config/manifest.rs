// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Manifest schema and manifest-kind classification.
//!
//! Manifests are untyped JSON documents. Only the fields that drive
//! composition are parsed; the raw document is kept so viewer types can read
//! whatever else they need.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::config::consts::{ENSEMBLE_TAG, LISTING_TAG};
use crate::config::ViewerConfig;
use crate::errors::ComposeError;

/// A fetched manifest document.
#[derive(Debug, Clone)]
pub struct Manifest {
    pub url: String,
    pub types: Vec<String>,
    pub ensemble: Option<EnsembleSpec>,
    pub metadata: ManifestMetadata,
    pub list: Option<Value>,
    pub raw: Value,
}

/// Display hints. A hint of the wrong type is ignored.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct ManifestMetadata {
    #[serde(rename = "backgroundColor", default, deserialize_with = "string_or_none")]
    pub background_color: Option<String>,
}

fn string_or_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        _ => None,
    })
}

/// `Ensemble` section of an ensemble manifest.
///
/// # Example
/// ```json
/// {
///   "datasets": [{ "name": "A", "data": "a/index.json" }, { "name": "B", "data": "b/index.json" }],
///   "binding": [{ "datasets": ["A", "B"], "arguments": ["time"] }],
///   "operators": [{ "name": "diff", "operation": "subtract", "datasets": ["A", "B"] }]
/// }
/// ```
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct EnsembleSpec {
    #[serde(default)]
    pub datasets: Vec<DatasetRef>,
    #[serde(default)]
    pub binding: Vec<BindingRule>,
    #[serde(default)]
    pub operators: Vec<OperatorRule>,
}

/// One child dataset of an ensemble; `data` is relative to the ensemble manifest.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct DatasetRef {
    pub name: String,
    pub data: String,
}

/// Cross-renderer synchronization directive.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct BindingRule {
    #[serde(default)]
    pub datasets: Vec<String>,
    /// Argument names whose changes propagate between the datasets' models.
    #[serde(default)]
    pub arguments: Vec<String>,
    /// Renderer event/setter pairs to cross-wire.
    #[serde(default)]
    pub other: Option<Vec<RendererBinding>>,
    /// Sub-model fields kept identical across renderers.
    #[serde(default)]
    pub bind: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct RendererBinding {
    pub listener: String,
    pub setter: String,
}

/// Derived-image directive.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct OperatorRule {
    pub name: String,
    pub operation: String,
    #[serde(default)]
    pub datasets: Vec<String>,
}

#[derive(Deserialize)]
struct ManifestHeader {
    #[serde(rename = "type")]
    types: Vec<String>,
    #[serde(rename = "Ensemble", default)]
    ensemble: Option<Value>,
    #[serde(default)]
    metadata: Option<Value>,
    #[serde(default)]
    list: Option<Value>,
}

impl Manifest {
    /// Parse the composition-relevant part of a manifest document.
    ///
    /// Only `type`, and `Ensemble` on an ensemble manifest, must be well
    /// formed. A malformed `metadata` section is ignored.
    pub fn from_value(url: impl Into<String>, raw: Value) -> Result<Self, ComposeError> {
        let url = url.into();
        let invalid = |e: serde_json::Error| ComposeError::InvalidManifest {
            url: url.clone(),
            reason: e.to_string(),
        };
        let header: ManifestHeader = serde_json::from_value(raw.clone()).map_err(invalid)?;

        let ensemble = match header.ensemble {
            Some(section) if header.types.iter().any(|t| t == ENSEMBLE_TAG) => {
                Some(serde_json::from_value(section).map_err(invalid)?)
            }
            _ => None,
        };

        let metadata = match header.metadata {
            Some(section) => serde_json::from_value(section).unwrap_or_else(|e| {
                tracing::warn!(url = %url, error = %e, "ignoring malformed manifest metadata");
                ManifestMetadata::default()
            }),
            None => ManifestMetadata::default(),
        };

        Ok(Self {
            url,
            types: header.types,
            ensemble,
            metadata,
            list: header.list,
            raw,
        })
    }

    pub fn has_type(&self, tag: &str) -> bool {
        self.types.iter().any(|t| t == tag)
    }
}

/// Manifest kinds, in dispatch priority order.
#[derive(Debug, Clone, PartialEq)]
pub enum ManifestKind {
    Ensemble(EnsembleSpec),
    Listing(Value),
    MagicLens,
    Plain,
}

impl ManifestKind {
    pub fn label(&self) -> &'static str {
        match self {
            ManifestKind::Ensemble(_) => "ensemble",
            ManifestKind::Listing(_) => "listing",
            ManifestKind::MagicLens => "magic_lens",
            ManifestKind::Plain => "plain",
        }
    }
}

/// Decide how a manifest is composed. First match wins:
/// ensemble tag, listing tag, magic lens (lens on, not an ensemble child),
/// then plain.
pub fn classify(manifest: &Manifest, config: &ViewerConfig) -> ManifestKind {
    if manifest.has_type(ENSEMBLE_TAG) {
        return ManifestKind::Ensemble(manifest.ensemble.clone().unwrap_or_default());
    }
    if manifest.has_type(LISTING_TAG) {
        return ManifestKind::Listing(manifest.list.clone().unwrap_or(Value::Null));
    }
    if config.magic_lens() && !config.is_ensemble() {
        return ManifestKind::MagicLens;
    }
    ManifestKind::Plain
}
