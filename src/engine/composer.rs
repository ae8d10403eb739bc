// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Viewer Composition Orchestrator.
//!
//! `Composer::compose` fetches the configuration and the manifest at a URL,
//! classifies the manifest and builds a [`ViewerDescriptor`]:
//!
//! * **ensemble**: every child dataset is composed concurrently. Once all
//!   children have finished, in whatever order, the binding rules and then
//!   the operator rules are applied to the collected renderers.
//! * **listing**: a dataset list viewer; nothing else is composed.
//! * **magic lens**: the manifest is built twice (background and foreground
//!   layer). The layers' query models are linked and the foreground builder
//!   is wrapped in a lens compositor.
//! * **plain**: handed to the viewer selector.
//!
//! The effective configuration is computed once per call and passed down to
//! children explicitly.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, RwLock};

use tokio::task::JoinSet;

use crate::config::consts::{DEFAULT_CONFIG_URL, LENS_SYNC_ARGUMENTS, LISTING_BASE_PATH};
use crate::config::{
    classify, effective_config, validate_ensemble, EnsembleSpec, Manifest, ManifestKind,
    ViewerConfig,
};
use crate::engine::binding::{bind_datasets, link_models};
use crate::engine::operators::create_operators;
use crate::engine::renderers::{RendererEntry, RendererMap, RendererRole};
use crate::engine::scheduler::RefetchScheduler;
use crate::errors::ComposeError;
use crate::fetch::{basepath_of, JsonFetcher};
use crate::observability::messages::compose::{
    CompositionStarted, EnsembleAssembled, EnsembleChildReady, MagicLensComposed,
    MagicLensDeclined, ManifestClassified, ManifestUnsupported,
};
use crate::observability::messages::fetch::{ConfigFetchFailed, ManifestFetchFailed};
use crate::observability::messages::StructuredLog;
use crate::renderers::{DefaultOperatorFactory, MagicLensBuilder};
use crate::traits::{OperatorFactory, ViewerSelector};
use crate::viewers::{ViewerDescriptor, ViewerUi};

type ComposeFuture = Pin<Box<dyn Future<Output = Result<ViewerDescriptor, ComposeError>> + Send>>;

struct ComposerInner {
    fetcher: Arc<dyn JsonFetcher>,
    selector: Arc<dyn ViewerSelector>,
    operators: Arc<dyn OperatorFactory>,
    scheduler: RefetchScheduler,
    config_url: String,
    location: Option<String>,
    overrides: RwLock<ViewerConfig>,
}

/// Builds viewer descriptors from manifest URLs.
///
/// Cheap to clone; clones share the fetcher, selector, scheduler and the
/// configuration override.
#[derive(Clone)]
pub struct Composer {
    inner: Arc<ComposerInner>,
}

pub struct ComposerBuilder {
    fetcher: Arc<dyn JsonFetcher>,
    selector: Arc<dyn ViewerSelector>,
    operators: Arc<dyn OperatorFactory>,
    scheduler: RefetchScheduler,
    config_url: String,
    location: Option<String>,
    overrides: ViewerConfig,
}

impl ComposerBuilder {
    pub fn operator_factory(mut self, operators: Arc<dyn OperatorFactory>) -> Self {
        self.operators = operators;
        self
    }

    pub fn scheduler(mut self, scheduler: RefetchScheduler) -> Self {
        self.scheduler = scheduler;
        self
    }

    pub fn config_url(mut self, url: impl Into<String>) -> Self {
        self.config_url = url.into();
        self
    }

    /// Page location whose query parameters feed the effective configuration.
    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn overrides(mut self, overrides: ViewerConfig) -> Self {
        self.overrides = overrides;
        self
    }

    pub fn build(self) -> Composer {
        Composer {
            inner: Arc::new(ComposerInner {
                fetcher: self.fetcher,
                selector: self.selector,
                operators: self.operators,
                scheduler: self.scheduler,
                config_url: self.config_url,
                location: self.location,
                overrides: RwLock::new(self.overrides),
            }),
        }
    }
}

impl Composer {
    pub fn builder(fetcher: Arc<dyn JsonFetcher>, selector: Arc<dyn ViewerSelector>) -> ComposerBuilder {
        ComposerBuilder {
            fetcher,
            selector,
            operators: Arc::new(DefaultOperatorFactory),
            scheduler: RefetchScheduler::deferred(),
            config_url: DEFAULT_CONFIG_URL.to_string(),
            location: None,
            overrides: ViewerConfig::new(),
        }
    }

    /// Replace the configuration override used by every later composition.
    pub fn update_config(&self, overrides: ViewerConfig) {
        let mut current = self
            .inner
            .overrides
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        *current = overrides;
    }

    pub fn overrides(&self) -> ViewerConfig {
        self.inner
            .overrides
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    pub fn scheduler(&self) -> &RefetchScheduler {
        &self.inner.scheduler
    }

    /// Compose the viewer for the manifest at `url`.
    pub async fn compose(&self, url: &str) -> Result<ViewerDescriptor, ComposeError> {
        self.compose_with(url.to_string(), false).await
    }

    /// Boxed so ensemble children can be spawned recursively.
    fn compose_with(&self, url: String, ensemble_child: bool) -> ComposeFuture {
        let composer = self.clone();
        Box::pin(async move {
            let started = CompositionStarted {
                url: &url,
                ensemble_child,
            };
            started.log();

            let config = composer.load_config(ensemble_child).await;
            let manifest = composer.load_manifest(&url).await?;
            let kind = classify(&manifest, &config);
            ManifestClassified {
                url: &url,
                kind: kind.label(),
            }
            .log();

            match kind {
                ManifestKind::Ensemble(spec) => composer.compose_ensemble(&url, spec, config).await,
                ManifestKind::Listing(list) => Ok(listing_viewer(list, config)),
                ManifestKind::MagicLens => composer.compose_magic_lens(&url, &manifest, config).await,
                ManifestKind::Plain => composer.select(&url, &manifest, &config).await,
            }
        })
    }

    async fn load_config(&self, ensemble_child: bool) -> ViewerConfig {
        let base = match self.inner.fetcher.fetch_json(&self.inner.config_url).await {
            Ok(document) => Some(document),
            Err(error) => {
                ConfigFetchFailed {
                    url: &self.inner.config_url,
                    error: &error,
                }
                .log();
                None
            }
        };

        let mut config = effective_config(base, &self.overrides(), self.inner.location.as_deref());
        if ensemble_child {
            config.set_ensemble(true);
        }
        config
    }

    async fn load_manifest(&self, url: &str) -> Result<Manifest, ComposeError> {
        let raw = match self.inner.fetcher.fetch_json(url).await {
            Ok(raw) => raw,
            Err(error) => {
                ManifestFetchFailed { url, error: &error }.log();
                return Err(error.into());
            }
        };
        Manifest::from_value(url, raw)
    }

    async fn select(
        &self,
        url: &str,
        manifest: &Manifest,
        config: &ViewerConfig,
    ) -> Result<ViewerDescriptor, ComposeError> {
        let basepath = basepath_of(url);
        match self.inner.selector.select(&basepath, manifest, config).await {
            Some(viewer) => Ok(viewer),
            None => {
                ManifestUnsupported {
                    url,
                    types: &manifest.types,
                }
                .log();
                Err(ComposeError::UnsupportedManifest {
                    url: url.to_string(),
                })
            }
        }
    }

    async fn compose_ensemble(
        &self,
        url: &str,
        spec: EnsembleSpec,
        config: ViewerConfig,
    ) -> Result<ViewerDescriptor, ComposeError> {
        validate_ensemble(&spec)?;

        let basepath = basepath_of(url);
        let expected = spec.datasets.len();
        let mut children = JoinSet::new();
        for dataset in &spec.datasets {
            let name = dataset.name.clone();
            let child = self.compose_with(format!("{}{}", basepath, dataset.data), true);
            children.spawn(async move { (name, child.await) });
        }

        let mut renderers = RendererMap::new();
        let mut representative = None;
        let mut first_error = None;
        let mut ready = 0;

        while let Some(joined) = children.join_next().await {
            match joined {
                Ok((name, Ok(viewer))) => {
                    ready += 1;
                    match canonical_entry(&name, viewer) {
                        Some(entry) => {
                            if representative.is_none() {
                                representative = entry.query_data_model.clone();
                            }
                            renderers.insert(entry);
                        }
                        None => tracing::warn!(dataset = %name, "ensemble child produced no renderer"),
                    }
                    EnsembleChildReady {
                        name: &name,
                        ready,
                        expected,
                    }
                    .log();
                }
                Ok((name, Err(error))) => {
                    tracing::error!(dataset = %name, error = %error, "ensemble child failed");
                    first_error.get_or_insert(error);
                }
                Err(join_error) => {
                    first_error.get_or_insert(ComposeError::ChildTask(join_error.to_string()));
                }
            }
        }

        if let Some(error) = first_error {
            return Err(error);
        }

        bind_datasets(&spec.binding, &renderers, &self.inner.scheduler);
        create_operators(&spec.operators, &mut renderers, self.inner.operators.as_ref())?;

        EnsembleAssembled {
            url,
            renderer_count: renderers.len(),
            binding_rules: spec.binding.len(),
            operator_rules: spec.operators.len(),
        }
        .log();

        let mut viewer = ViewerDescriptor::new(ViewerUi::MultiViewerWidget, config);
        viewer.query_data_model = representative;
        viewer.renderers = Some(renderers);
        Ok(viewer)
    }

    async fn compose_magic_lens(
        &self,
        url: &str,
        manifest: &Manifest,
        config: ViewerConfig,
    ) -> Result<ViewerDescriptor, ComposeError> {
        let mut background = self.select(url, manifest, &config).await?;
        let background_builder = background.image_builder.clone();

        let Some(background_builder) = background_builder.filter(|_| background.allow_magic_lens) else {
            MagicLensDeclined { url }.log();
            background.config.set_magic_lens(false);
            return Ok(background);
        };

        let mut foreground = self.select(url, manifest, &config).await?;
        let Some(foreground_builder) = foreground.image_builder.clone() else {
            MagicLensDeclined { url }.log();
            background.config.set_magic_lens(false);
            return Ok(background);
        };

        if let (Some(fg_model), Some(bg_model)) = (
            foreground_builder.query_data_model(),
            background_builder.query_data_model(),
        ) {
            let scheduler = &self.inner.scheduler;
            link_models(&fg_model, &bg_model, &LENS_SYNC_ARGUMENTS, true, scheduler);
            link_models(&bg_model, &fg_model, &LENS_SYNC_ARGUMENTS, true, scheduler);
        }

        foreground.image_builder = Some(MagicLensBuilder::new(foreground_builder, background_builder));
        MagicLensComposed {
            url,
            synchronized: &LENS_SYNC_ARGUMENTS,
        }
        .log();
        Ok(foreground)
    }
}

fn listing_viewer(list: serde_json::Value, config: ViewerConfig) -> ViewerDescriptor {
    let mut viewer = ViewerDescriptor::new(ViewerUi::ArcticListViewer, config);
    viewer.listing = Some(list);
    viewer.base_path = Some(LISTING_BASE_PATH.to_string());
    viewer
}

/// Reduce a child's descriptor to the renderer entry registered under `name`.
///
/// A child that produced a list keeps its first item; the other items are
/// destroyed.
fn canonical_entry(name: &str, mut viewer: ViewerDescriptor) -> Option<RendererEntry> {
    let source = if viewer.list.is_empty() {
        viewer
    } else {
        let mut items = std::mem::take(&mut viewer.list).into_iter();
        let first = items.next()?;
        for discarded in items {
            discarded.destroy();
        }
        first
    };

    let role = match (source.image_builder, source.painter) {
        (Some(builder), _) => RendererRole::Builder(builder),
        (None, Some(painter)) => RendererRole::Painter(painter),
        (None, None) => return None,
    };
    role.set_name(name);

    Some(RendererEntry {
        name: name.to_string(),
        role,
        query_data_model: source.query_data_model,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::MemoryFetcher;
    use crate::renderers::stub::StubViewerType;
    use crate::traits::Renderer;
    use crate::viewers::PrioritizedSelector;
    use serde_json::json;

    fn composer(fetcher: MemoryFetcher, viewer_type: StubViewerType) -> Composer {
        let selector = PrioritizedSelector::new(Vec::new()).with_type(Arc::new(viewer_type));
        Composer::builder(Arc::new(fetcher), Arc::new(selector))
            .scheduler(RefetchScheduler::manual())
            .build()
    }

    #[tokio::test]
    async fn missing_config_still_applies_overrides() {
        let fetcher = MemoryFetcher::new()
            .with_document("data/index.json", json!({ "type": ["stub"] }));
        let composer = composer(fetcher, StubViewerType::new("stub"));
        composer.update_config(ViewerConfig::from_value(json!({ "theme": "dark" })));

        let viewer = composer.compose("data/index.json").await.unwrap();
        assert_eq!(viewer.config.get("theme"), Some(&json!("dark")));
        assert_eq!(viewer.ui, ViewerUi::GenericViewer);
    }

    #[tokio::test]
    async fn manifest_fetch_error_is_fatal() {
        let fetcher = MemoryFetcher::new().with_status("data/index.json", 500);
        let composer = composer(fetcher, StubViewerType::new("stub"));

        let err = composer.compose("data/index.json").await.unwrap_err();
        assert!(matches!(err, ComposeError::Fetch(_)));
    }

    #[tokio::test]
    async fn listing_needs_no_viewer_type() {
        let fetcher = MemoryFetcher::new().with_document(
            "index.json",
            json!({ "type": ["arctic-viewer-list"], "list": [{ "name": "a" }] }),
        );
        let composer = composer(fetcher, StubViewerType::new("stub"));

        let viewer = composer.compose("index.json").await.unwrap();
        assert_eq!(viewer.ui, ViewerUi::ArcticListViewer);
        assert_eq!(viewer.listing, Some(json!([{ "name": "a" }])));
        assert_eq!(viewer.base_path.as_deref(), Some("/data/"));
    }

    #[tokio::test]
    async fn unsupported_manifest_is_reported() {
        let fetcher = MemoryFetcher::new().with_document("x.json", json!({ "type": ["unknown"] }));
        let composer = composer(fetcher, StubViewerType::new("stub"));

        let err = composer.compose("x.json").await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "The metadata format seems to be unsupported (x.json)"
        );
    }

    #[test]
    fn canonical_entry_keeps_first_list_item() {
        use crate::renderers::stub::StubImageBuilder;

        let first = Arc::new(StubImageBuilder::new("first"));
        let second = Arc::new(StubImageBuilder::new("second"));
        let mut item_a = ViewerDescriptor::new(ViewerUi::GenericViewer, ViewerConfig::new());
        item_a.image_builder = Some(first.clone());
        let mut item_b = ViewerDescriptor::new(ViewerUi::GenericViewer, ViewerConfig::new());
        item_b.image_builder = Some(second.clone());
        let mut viewer = ViewerDescriptor::new(ViewerUi::ViewerSelector, ViewerConfig::new());
        viewer.list = vec![item_a, item_b];

        let entry = canonical_entry("A", viewer).unwrap();
        assert_eq!(entry.name, "A");
        assert_eq!(first.name(), "A");
        assert!(!first.is_destroyed());
        assert!(second.is_destroyed());
    }

    #[test]
    fn canonical_entry_without_renderer_is_skipped() {
        let viewer = ViewerDescriptor::new(ViewerUi::GenericViewer, ViewerConfig::new());
        assert!(canonical_entry("A", viewer).is_none());
    }
}
