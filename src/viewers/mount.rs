// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Handing a composed viewer to the UI.

use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::errors::ComposeError;
use crate::traits::ImageBuilder;
use crate::viewers::{ViewerDescriptor, ViewerUi};

/// Container a viewer is mounted into.
pub trait ViewerHost: Send + Sync {
    fn set_style(&self, property: &str, value: &str);

    /// Remove whatever the container currently shows.
    fn unmount(&self);

    /// Show `viewer` as the component named `ui`.
    fn mount(&self, ui: &str, viewer: &ViewerDescriptor) -> Result<(), String>;
}

/// CSS property for a background value: gradients need the `background`
/// shorthand.
pub fn background_property(value: &str) -> &'static str {
    if value.contains("gradient") {
        "background"
    } else {
        "background-color"
    }
}

/// Builders updated by the initial render pass: every ensemble builder
/// followed by the descriptor's own image builder.
pub fn render_targets(viewer: &ViewerDescriptor) -> Vec<Arc<dyn ImageBuilder>> {
    let mut targets: Vec<Arc<dyn ImageBuilder>> = viewer
        .renderers
        .iter()
        .flat_map(|renderers| renderers.entries())
        .filter_map(|entry| entry.role.builder().cloned())
        .collect();
    targets.extend(viewer.image_builder.clone());
    targets
}

pub fn initial_render_pass(targets: &[Arc<dyn ImageBuilder>]) {
    for builder in targets {
        builder.update();
    }
}

/// Mount `viewer` into `host`.
///
/// Applies the background color (not for `MultiViewerWidget`), replaces the
/// host's content and then runs the initial render pass. With a tokio
/// runtime available the pass is spawned and its handle returned; otherwise
/// it runs before this function returns.
pub fn mount_viewer(
    viewer: &ViewerDescriptor,
    host: &dyn ViewerHost,
) -> Result<Option<JoinHandle<()>>, ComposeError> {
    if let Some(color) = &viewer.bg_color {
        if viewer.ui != ViewerUi::MultiViewerWidget {
            host.set_style(background_property(color), color);
        }
    }

    let targets = render_targets(viewer);

    host.unmount();
    host.mount(viewer.ui.as_str(), viewer)
        .map_err(|reason| ComposeError::Mount {
            ui: viewer.ui.to_string(),
            reason,
        })?;

    match Handle::try_current() {
        Ok(handle) => Ok(Some(handle.spawn(async move {
            initial_render_pass(&targets);
        }))),
        Err(_) => {
            initial_render_pass(&targets);
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ViewerConfig;
    use crate::engine::{RendererEntry, RendererMap};
    use crate::model::subscription::lock;
    use crate::renderers::stub::StubImageBuilder;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingHost {
        calls: Mutex<Vec<String>>,
        refuse: bool,
    }

    impl ViewerHost for RecordingHost {
        fn set_style(&self, property: &str, value: &str) {
            lock(&self.calls).push(format!("style {}={}", property, value));
        }

        fn unmount(&self) {
            lock(&self.calls).push("unmount".to_string());
        }

        fn mount(&self, ui: &str, _viewer: &ViewerDescriptor) -> Result<(), String> {
            if self.refuse {
                return Err("no such component".to_string());
            }
            lock(&self.calls).push(format!("mount {}", ui));
            Ok(())
        }
    }

    #[test]
    fn gradients_use_background_shorthand() {
        assert_eq!(background_property("linear-gradient(#000, #fff)"), "background");
        assert_eq!(background_property("#000"), "background-color");
    }

    #[test]
    fn mounts_in_order_without_runtime() {
        let builder = Arc::new(StubImageBuilder::new("img"));
        let mut viewer = ViewerDescriptor::new(ViewerUi::GenericViewer, ViewerConfig::new());
        viewer.bg_color = Some("#222".into());
        viewer.image_builder = Some(builder.clone());
        let host = RecordingHost::default();

        let handle = mount_viewer(&viewer, &host).unwrap();

        assert!(handle.is_none());
        assert_eq!(
            *host.calls.lock().unwrap(),
            vec!["style background-color=#222", "unmount", "mount GenericViewer"]
        );
        assert_eq!(builder.update_count(), 1);
    }

    #[tokio::test]
    async fn ensemble_render_pass_is_deferred() {
        let a = Arc::new(StubImageBuilder::new("A"));
        let b = Arc::new(StubImageBuilder::new("B"));
        let mut renderers = RendererMap::new();
        renderers.insert(RendererEntry::builder("A", a.clone()));
        renderers.insert(RendererEntry::builder("B", b.clone()));
        let mut viewer = ViewerDescriptor::new(ViewerUi::MultiViewerWidget, ViewerConfig::new());
        viewer.bg_color = Some("#222".into());
        viewer.renderers = Some(renderers);
        let host = RecordingHost::default();

        let handle = mount_viewer(&viewer, &host).unwrap().unwrap();
        assert_eq!(a.update_count(), 0);
        handle.await.unwrap();

        assert_eq!(a.update_count(), 1);
        assert_eq!(b.update_count(), 1);
        assert_eq!(
            *host.calls.lock().unwrap(),
            vec!["unmount", "mount MultiViewerWidget"]
        );
    }

    #[test]
    fn refused_mount_is_an_error() {
        let viewer = ViewerDescriptor::new(ViewerUi::ArcticListViewer, ViewerConfig::new());
        let host = RecordingHost {
            refuse: true,
            ..Default::default()
        };

        let err = mount_viewer(&viewer, &host).unwrap_err();
        assert!(matches!(err, ComposeError::Mount { ref ui, .. } if ui == "ArcticListViewer"));
    }
}
