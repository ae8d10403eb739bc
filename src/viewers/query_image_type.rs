// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use crate::config::consts::QUERY_DATA_MODEL_TAG;
use crate::model::QueryDataModel;
use crate::renderers::QueryImageBuilder;
use crate::traits::{ViewerBuildArgs, ViewerTypeBuilder};

/// Image viewer for datasets described by a query data model.
#[derive(Debug, Default, Clone, Copy)]
pub struct QueryImageViewerType;

impl ViewerTypeBuilder for QueryImageViewerType {
    fn name(&self) -> &'static str {
        "query-image"
    }

    fn build(&self, args: &mut ViewerBuildArgs<'_>) -> bool {
        if !args.manifest.has_type(QUERY_DATA_MODEL_TAG) {
            return false;
        }

        let model = match &args.viewer.query_data_model {
            Some(model) => Arc::clone(model),
            None => Arc::new(QueryDataModel::from_manifest(&args.manifest.raw, args.basepath)),
        };
        args.viewer.query_data_model = Some(Arc::clone(&model));
        args.viewer.image_builder = Some(QueryImageBuilder::new(model));
        args.viewer.allow_magic_lens = true;
        true
    }
}
