// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::{Arc, Mutex, Weak};

use crate::model::subscription::lock;
use crate::model::{DataRequest, Listeners, QueryDataModel, SubscriptionId};
use crate::traits::{ImageBuilder, ImageData, ImageListener, Renderer};

/// Image builder for query-data-model datasets.
///
/// Each data request of its model becomes an image-ready frame tagged with
/// the resolved data URL. Decoding the data itself is left to whoever
/// listens for frames, so published frames carry no pixels.
pub struct QueryImageBuilder {
    name: Mutex<String>,
    model: Arc<QueryDataModel>,
    data_subscription: SubscriptionId,
    images: Listeners<ImageData>,
}

impl QueryImageBuilder {
    pub fn new(model: Arc<QueryDataModel>) -> Arc<Self> {
        Arc::new_cyclic(|weak: &Weak<Self>| {
            let weak = weak.clone();
            let data_subscription = model.on_data_request(Arc::new(move |request: &DataRequest| {
                if let Some(builder) = weak.upgrade() {
                    builder.publish(request);
                }
            }));
            Self {
                name: Mutex::new(String::from("image")),
                model,
                data_subscription,
                images: Listeners::new(),
            }
        })
    }

    fn publish(&self, request: &DataRequest) {
        let mut frame = ImageData::new(self.name(), 0, 0, Vec::new());
        frame.source_url = request.urls.values().next().cloned();
        self.images.emit(&frame);
    }
}

impl Renderer for QueryImageBuilder {
    fn name(&self) -> String {
        lock(&self.name).clone()
    }

    fn set_name(&self, name: &str) {
        *lock(&self.name) = name.to_string();
    }

    /// Request data for the model's current arguments.
    fn update(&self) {
        self.model.fetch_data();
    }

    fn destroy(&self) {
        self.model.unsubscribe(self.data_subscription);
    }
}

impl ImageBuilder for QueryImageBuilder {
    fn query_data_model(&self) -> Option<Arc<QueryDataModel>> {
        Some(Arc::clone(&self.model))
    }

    fn on_image_ready(&self, listener: ImageListener) -> SubscriptionId {
        self.images.subscribe(listener)
    }
}
