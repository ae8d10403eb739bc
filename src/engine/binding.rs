// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Dataset Binding Engine.
//!
//! Wires the renderers of an ensemble together according to its binding
//! rules:
//! * argument changes on one query data model are copied into the other
//!   models of the rule and a coalesced refetch is scheduled for each;
//! * renderer events are broadcast to a setter on every renderer of the rule;
//! * named sub-models are bound into one synchronized group.
//!
//! Names that do not resolve to a renderer contribute nothing.
//!
//! Callbacks only hold weak references to models and renderers. Models and
//! renderers own their listener lists, so a strong reference would keep the
//! whole ensemble alive through a cycle.

use std::collections::BTreeSet;
use std::sync::{Arc, Weak};

use serde_json::Value;

use crate::config::BindingRule;
use crate::engine::renderers::{RendererMap, RendererRole, WeakRendererRole};
use crate::engine::scheduler::RefetchScheduler;
use crate::model::{ArgumentChange, Listener, QueryDataModel, SubscriptionId};
use crate::observability::messages::binding::{
    ArgumentPropagated, BindingRuleApplied, ModelsLinked,
};
use crate::observability::messages::StructuredLog;
use crate::traits::{EventHandler, SharedModel};

/// Apply every binding rule to `renderers`.
pub fn bind_datasets(rules: &[BindingRule], renderers: &RendererMap, scheduler: &RefetchScheduler) {
    for rule in rules {
        bind_rule(rule, renderers, scheduler);
    }
}

fn bind_rule(rule: &BindingRule, renderers: &RendererMap, scheduler: &RefetchScheduler) {
    let roles: Vec<RendererRole> = rule
        .datasets
        .iter()
        .filter_map(|name| renderers.get(name))
        .map(|entry| entry.role.clone())
        .collect();

    let mut models: Vec<Arc<QueryDataModel>> = Vec::new();
    for model in roles.iter().filter_map(RendererRole::query_data_model) {
        if !models.iter().any(|m| m.id() == model.id()) {
            models.push(model);
        }
    }

    if !rule.arguments.is_empty() {
        propagate_arguments(&rule.arguments, &models, scheduler);
    }

    if let Some(pairs) = &rule.other {
        let targets: Arc<Vec<WeakRendererRole>> =
            Arc::new(roles.iter().map(RendererRole::downgrade).collect());
        for pair in pairs {
            let handler = broadcast_handler(pair.setter.clone(), Arc::clone(&targets));
            for role in &roles {
                if !role.listen(&pair.listener, Arc::clone(&handler)) {
                    tracing::debug!(
                        renderer = %role.name(),
                        event = %pair.listener,
                        "renderer has no such event"
                    );
                }
            }
        }
    }

    if let Some(fields) = &rule.bind {
        for field in fields {
            let instances: Vec<Arc<dyn SharedModel>> =
                roles.iter().filter_map(|role| role.sub_model(field)).collect();
            if let Some(first) = instances.first() {
                first.bind(&instances);
            }
        }
    }

    BindingRuleApplied {
        datasets: &rule.datasets,
        models: models.len(),
        renderers: roles.len(),
    }
    .log();
}

/// Subscribe one shared listener on every model of the rule.
fn propagate_arguments(
    arguments: &[String],
    models: &[Arc<QueryDataModel>],
    scheduler: &RefetchScheduler,
) {
    if models.is_empty() {
        return;
    }

    let watched: BTreeSet<String> = arguments.iter().cloned().collect();
    let peers: Vec<Weak<QueryDataModel>> = models.iter().map(Arc::downgrade).collect();
    let scheduler = scheduler.clone();

    let listener: Listener<ArgumentChange> = Arc::new(move |change: &ArgumentChange| {
        if !watched.contains(&change.name) {
            return;
        }
        for peer in peers.iter().filter_map(Weak::upgrade) {
            copy_argument(change, &peer, &scheduler);
        }
    });

    for model in models {
        model.on_state_change(Arc::clone(&listener));
    }
}

/// Copy `change` into `target` when its value differs and schedule a refetch.
fn copy_argument(change: &ArgumentChange, target: &Arc<QueryDataModel>, scheduler: &RefetchScheduler) {
    if target.get_value(&change.name).as_ref() == Some(&change.value) {
        return;
    }
    if target.set_value(&change.name, change.value.clone()) {
        ArgumentPropagated {
            argument: &change.name,
            value: &change.value,
            target: target.id(),
        }
        .log();
        scheduler.schedule(Arc::clone(target));
    }
}

fn broadcast_handler(setter: String, targets: Arc<Vec<WeakRendererRole>>) -> EventHandler {
    Arc::new(move |payload: &Value| {
        for target in targets.iter().filter_map(WeakRendererRole::upgrade) {
            target.apply(&setter, payload);
        }
    })
}

/// Propagate changes of `arguments` from `source` into `target`.
///
/// With `fetch`, every propagated change also schedules a refetch of
/// `target`. Link both directions for a two-way binding.
pub fn link_models(
    source: &Arc<QueryDataModel>,
    target: &Arc<QueryDataModel>,
    arguments: &[&str],
    fetch: bool,
    scheduler: &RefetchScheduler,
) -> SubscriptionId {
    let watched: BTreeSet<String> = arguments.iter().map(|a| a.to_string()).collect();
    let weak_target = Arc::downgrade(target);
    let scheduler = scheduler.clone();

    let id = source.on_state_change(Arc::new(move |change: &ArgumentChange| {
        if !watched.contains(&change.name) {
            return;
        }
        let Some(target) = weak_target.upgrade() else {
            return;
        };
        if target.get_value(&change.name).as_ref() == Some(&change.value) {
            return;
        }
        if target.set_value(&change.name, change.value.clone()) && fetch {
            scheduler.schedule(target);
        }
    }));

    ModelsLinked {
        source: source.id(),
        target: target.id(),
        arguments,
    }
    .log();
    id
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RendererBinding;
    use crate::engine::renderers::RendererEntry;
    use crate::renderers::stub::{StubImageBuilder, StubPainter, StubSharedModel};
    use serde_json::json;

    fn rule(datasets: &[&str], arguments: &[&str]) -> BindingRule {
        BindingRule {
            datasets: datasets.iter().map(|d| d.to_string()).collect(),
            arguments: arguments.iter().map(|a| a.to_string()).collect(),
            other: None,
            bind: None,
        }
    }

    fn builder_entry(name: &str) -> (Arc<StubImageBuilder>, Arc<QueryDataModel>, RendererEntry) {
        let model = Arc::new(QueryDataModel::new(format!("/data/{}/", name)));
        let builder = Arc::new(
            StubImageBuilder::new(name)
                .with_model(Arc::clone(&model))
                .with_event("onLutChange")
                .with_setter("setLut"),
        );
        let entry = RendererEntry::builder(name, builder.clone());
        (builder, model, entry)
    }

    #[test]
    fn propagates_watched_arguments_and_coalesces_refetch() {
        let (_a, model_a, entry_a) = builder_entry("A");
        let (_b, model_b, entry_b) = builder_entry("B");
        let mut renderers = RendererMap::new();
        renderers.insert(entry_a);
        renderers.insert(entry_b);
        let scheduler = RefetchScheduler::manual();

        bind_datasets(&[rule(&["A", "B"], &["time"])], &renderers, &scheduler);

        model_a.set_value("time", 5);
        assert_eq!(model_b.get_value("time"), Some(json!(5)));
        model_a.set_value("time", 6);
        model_a.set_value("phi", 90);

        assert_eq!(model_b.get_value("time"), Some(json!(6)));
        assert_eq!(model_b.get_value("phi"), None);
        assert_eq!(scheduler.pending_len(), 1);

        scheduler.flush();
        assert_eq!(model_b.fetch_count(), 1);
        assert_eq!(model_a.fetch_count(), 0);
    }

    #[test]
    fn propagation_is_symmetric() {
        let (_a, model_a, entry_a) = builder_entry("A");
        let (_b, model_b, entry_b) = builder_entry("B");
        let mut renderers = RendererMap::new();
        renderers.insert(entry_a);
        renderers.insert(entry_b);
        let scheduler = RefetchScheduler::manual();

        bind_datasets(&[rule(&["A", "B"], &["time"])], &renderers, &scheduler);
        model_b.set_value("time", 3);

        assert_eq!(model_a.get_value("time"), Some(json!(3)));
        assert_eq!(scheduler.flush(), 1);
        assert_eq!(model_a.fetch_count(), 1);
    }

    #[test]
    fn unknown_dataset_names_contribute_nothing() {
        let (_a, model_a, entry_a) = builder_entry("A");
        let mut renderers = RendererMap::new();
        renderers.insert(entry_a);
        let scheduler = RefetchScheduler::manual();

        bind_datasets(&[rule(&["A", "missing"], &["time"])], &renderers, &scheduler);
        model_a.set_value("time", 1);

        assert_eq!(scheduler.pending_len(), 0);
        assert_eq!(model_a.state_listener_count(), 1);
    }

    #[test]
    fn other_pairs_broadcast_to_every_renderer() {
        let (a, _model_a, entry_a) = builder_entry("A");
        let (b, _model_b, entry_b) = builder_entry("B");
        let painter = Arc::new(StubPainter::new("mesh").with_setter("setLut"));
        let mut renderers = RendererMap::new();
        renderers.insert(entry_a);
        renderers.insert(entry_b);
        renderers.insert(RendererEntry::painter("mesh", painter.clone()));

        let mut binding = rule(&["A", "B", "mesh"], &[]);
        binding.other = Some(vec![RendererBinding {
            listener: "onLutChange".into(),
            setter: "setLut".into(),
        }]);
        bind_datasets(&[binding], &renderers, &RefetchScheduler::manual());

        a.emit_event("onLutChange", &json!("jet"));

        let expected = vec![("setLut".to_string(), json!("jet"))];
        assert_eq!(a.applied(), expected);
        assert_eq!(b.applied(), expected);
        assert_eq!(painter.applied(), expected);
    }

    #[test]
    fn bind_groups_sub_models_through_first_instance() {
        let first = StubSharedModel::new();
        let second = StubSharedModel::new();
        let mut renderers = RendererMap::new();
        renderers.insert(RendererEntry::builder(
            "A",
            Arc::new(StubImageBuilder::new("A").with_sub_model("lookupTableManager", first.clone())),
        ));
        renderers.insert(RendererEntry::builder(
            "B",
            Arc::new(StubImageBuilder::new("B").with_sub_model("lookupTableManager", second.clone())),
        ));
        renderers.insert(RendererEntry::builder("C", Arc::new(StubImageBuilder::new("C"))));

        let mut binding = rule(&["A", "B", "C"], &[]);
        binding.bind = Some(vec!["lookupTableManager".into(), "absent".into()]);
        bind_datasets(&[binding], &renderers, &RefetchScheduler::manual());

        assert_eq!(first.bound_peers(), Some(2));
        assert_eq!(second.bound_peers(), None);
    }

    #[test]
    fn shared_model_is_subscribed_once() {
        let model = Arc::new(QueryDataModel::new(""));
        let mut renderers = RendererMap::new();
        for name in ["A", "B"] {
            renderers.insert(RendererEntry::builder(
                name,
                Arc::new(StubImageBuilder::new(name).with_model(Arc::clone(&model))),
            ));
        }

        bind_datasets(&[rule(&["A", "B"], &["time"])], &renderers, &RefetchScheduler::manual());
        assert_eq!(model.state_listener_count(), 1);
    }

    #[test]
    fn link_models_is_one_way() {
        let source = Arc::new(QueryDataModel::new(""));
        let target = Arc::new(QueryDataModel::new(""));
        let scheduler = RefetchScheduler::manual();

        link_models(&source, &target, &["time", "phi"], true, &scheduler);
        source.set_value("time", 2);
        source.set_value("theta", 10);
        target.set_value("phi", 45);

        assert_eq!(target.get_value("time"), Some(json!(2)));
        assert_eq!(target.get_value("theta"), None);
        assert_eq!(source.get_value("phi"), None);
        assert_eq!(scheduler.flush(), 1);
        assert_eq!(target.fetch_count(), 1);
    }

    #[test]
    fn two_way_link_settles() {
        let left = Arc::new(QueryDataModel::new(""));
        let right = Arc::new(QueryDataModel::new(""));
        let scheduler = RefetchScheduler::manual();

        link_models(&left, &right, &["time"], false, &scheduler);
        link_models(&right, &left, &["time"], false, &scheduler);

        right.set_value("time", 7);
        assert_eq!(left.get_value("time"), Some(json!(7)));
        assert_eq!(scheduler.pending_len(), 0);
    }
}
