use std::collections::BTreeMap;

use crate::config::EnsembleSpec;

/// Newtype wrapper for the operator dependency graph providing type safety.
///
/// Edges point from a source renderer to the operators that read from it,
/// so a dataset feeding two operators has two dependents.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph(pub BTreeMap<String, Vec<String>>);

impl DependencyGraph {
    /// Create a new empty dependency graph
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Build the graph of an ensemble: one node per dataset and operator,
    /// one edge per operator source.
    ///
    /// Sources naming nothing known still get a node, so reference checks can
    /// report them separately.
    pub fn from_ensemble(spec: &EnsembleSpec) -> Self {
        let mut graph = Self::new();
        for dataset in &spec.datasets {
            graph.0.entry(dataset.name.clone()).or_default();
        }
        for operator in &spec.operators {
            graph.0.entry(operator.name.clone()).or_default();
        }
        for operator in &spec.operators {
            for source in &operator.datasets {
                graph.add_dependent(source, &operator.name);
            }
        }
        graph
    }

    /// Record that `dependent` reads from `source`
    pub fn add_dependent(&mut self, source: &str, dependent: &str) {
        self.0
            .entry(source.to_string())
            .or_default()
            .push(dependent.to_string());
    }

    /// Get dependents for a renderer
    pub fn get_dependents(&self, name: &str) -> Option<&Vec<String>> {
        self.0.get(name)
    }

    /// Get all renderer names in the graph
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }
}
