// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Pixel Operator Assembly.
//!
//! Two strictly ordered phases:
//! 1. every operator rule is instantiated and registered in the renderer map;
//! 2. every operator subscribes to the image-ready notifications of its
//!    sources and forwards each frame tagged with the source name.
//!
//! Phase 2 looks operators up by name, and an operator may be the source of
//! another operator, so no wiring happens before every registration is done.

use std::sync::Arc;

use crate::config::OperatorRule;
use crate::engine::renderers::{RendererEntry, RendererMap};
use crate::errors::ComposeError;
use crate::observability::messages::binding::OperatorRegistered;
use crate::observability::messages::StructuredLog;
use crate::traits::{ImageBuilder, ImageData, OperatorFactory};

pub fn create_operators(
    rules: &[OperatorRule],
    renderers: &mut RendererMap,
    factory: &dyn OperatorFactory,
) -> Result<(), ComposeError> {
    for rule in rules {
        let operator = factory.create(&rule.name, &rule.operation, &rule.datasets)?;
        operator.set_name(&rule.name);
        renderers.insert(RendererEntry::builder(&rule.name, operator));
        OperatorRegistered {
            name: &rule.name,
            operation: &rule.operation,
            sources: &rule.datasets,
        }
        .log();
    }

    for rule in rules {
        let operator = renderers
            .builder(&rule.name)
            .filter(|builder| builder.pixel_operator().is_some())
            .ok_or_else(|| ComposeError::MissingRenderer {
                name: rule.name.clone(),
            })?;

        for source_name in &rule.datasets {
            let source = renderers
                .builder(source_name)
                .ok_or_else(|| ComposeError::MissingRenderer {
                    name: source_name.clone(),
                })?;
            forward_frames(&source, &operator, source_name);
        }
    }

    Ok(())
}

fn forward_frames(source: &Arc<dyn ImageBuilder>, operator: &Arc<dyn ImageBuilder>, source_name: &str) {
    let operator = Arc::downgrade(operator);
    let tag = source_name.to_string();
    source.on_image_ready(Arc::new(move |image: &ImageData| {
        let Some(operator) = operator.upgrade() else {
            return;
        };
        if let Some(pixel_operator) = operator.pixel_operator() {
            pixel_operator.update_data(&tag, image);
        }
    }));
}
