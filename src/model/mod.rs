// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod query_data_model;
pub mod subscription;

pub use query_data_model::{ArgumentChange, DataRequest, ModelId, QueryDataModel};
pub use subscription::{Listener, Listeners, SubscriptionId};
