//! Ensemble validation before any child dataset is fetched.
//!
//! Binding rules are deliberately left alone: a binding that names an unknown
//! dataset contributes nothing at wiring time and is not an error. Operators
//! are stricter, because a derived image with a missing input can never be
//! computed.
//!
//! # Validation Pipeline
//!
//! 1. **Uniqueness**: dataset and operator names share one namespace
//! 2. **Completeness**: every operator has at least one source
//! 3. **References**: every operator source is a dataset or another operator
//! 4. **Cycle Detection**: DFS over the operator graph, reporting the cycle path
//!
//! Cycle detection only runs when the first three stages pass, since it needs a
//! structurally valid graph.

use std::collections::HashSet;

use crate::config::{DependencyGraph, EnsembleSpec};
use crate::errors::ValidationError;
use crate::observability::messages::validation::{CyclicDependencyDetected, UnresolvedSource};
use crate::observability::messages::StructuredLog;

/// Validates an ensemble section, accumulating every error found.
pub fn validate_ensemble(spec: &EnsembleSpec) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Err(duplicates) = validate_unique_names(spec) {
        errors.extend(duplicates);
    }

    for operator in &spec.operators {
        if operator.datasets.is_empty() {
            errors.push(ValidationError::EmptyOperator {
                operator: operator.name.clone(),
            });
        }
    }

    if let Err(unresolved) = validate_source_references(spec) {
        errors.extend(unresolved);
    }

    if errors.is_empty() {
        if let Err(cycle_errors) = validate_acyclic_operators(spec) {
            errors.extend(cycle_errors);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_unique_names(spec: &EnsembleSpec) -> Result<(), Vec<ValidationError>> {
    let mut seen = HashSet::new();
    let names = spec
        .datasets
        .iter()
        .map(|d| &d.name)
        .chain(spec.operators.iter().map(|o| &o.name));

    let errors: Vec<ValidationError> = names
        .filter(|name| !seen.insert(name.as_str()))
        .map(|name| ValidationError::DuplicateRendererName { name: name.clone() })
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_source_references(spec: &EnsembleSpec) -> Result<(), Vec<ValidationError>> {
    let known: HashSet<&str> = spec
        .datasets
        .iter()
        .map(|d| d.name.as_str())
        .chain(spec.operators.iter().map(|o| o.name.as_str()))
        .collect();
    let mut errors = Vec::new();

    for operator in &spec.operators {
        for source in &operator.datasets {
            if !known.contains(source.as_str()) {
                UnresolvedSource {
                    operator: &operator.name,
                    missing_source: source,
                }
                .log();
                errors.push(ValidationError::UnresolvedSource {
                    operator: operator.name.clone(),
                    missing_source: source.clone(),
                });
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Three-color DFS over source -> dependent edges.
fn validate_acyclic_operators(spec: &EnsembleSpec) -> Result<(), Vec<ValidationError>> {
    let graph = DependencyGraph::from_ensemble(spec);
    let mut visited = HashSet::new();
    let mut rec_stack = HashSet::new();
    let mut path = Vec::new();

    for name in graph.keys() {
        if !visited.contains(name.as_str()) {
            if let Some(cycle) =
                dfs_cycle_detection(name, &graph, &mut visited, &mut rec_stack, &mut path)
            {
                let steps: Vec<&str> = cycle.iter().map(String::as_str).collect();
                CyclicDependencyDetected { cycle: &steps }.log();
                return Err(vec![ValidationError::CyclicDependency { cycle }]);
            }
        }
    }

    Ok(())
}

/// Returns the cycle path (closed, first node repeated at the end) if one is
/// reachable from `node`.
fn dfs_cycle_detection<'a>(
    node: &'a str,
    graph: &'a DependencyGraph,
    visited: &mut HashSet<&'a str>,
    rec_stack: &mut HashSet<&'a str>,
    path: &mut Vec<&'a str>,
) -> Option<Vec<String>> {
    visited.insert(node);
    rec_stack.insert(node);
    path.push(node);

    if let Some(dependents) = graph.get_dependents(node) {
        for next in dependents {
            let next = next.as_str();
            if rec_stack.contains(next) {
                let start = path.iter().position(|n| *n == next).unwrap_or(0);
                let mut cycle: Vec<String> = path[start..].iter().map(|n| n.to_string()).collect();
                cycle.push(next.to_string());
                return Some(cycle);
            }
            if !visited.contains(next) {
                if let Some(cycle) = dfs_cycle_detection(next, graph, visited, rec_stack, path) {
                    return Some(cycle);
                }
            }
        }
    }

    rec_stack.remove(node);
    path.pop();
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DatasetRef, OperatorRule};

    fn dataset(name: &str) -> DatasetRef {
        DatasetRef {
            name: name.to_string(),
            data: format!("{}/index.json", name),
        }
    }

    fn operator(name: &str, sources: &[&str]) -> OperatorRule {
        OperatorRule {
            name: name.to_string(),
            operation: "add".to_string(),
            datasets: sources.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn valid_ensemble_passes() {
        let spec = EnsembleSpec {
            datasets: vec![dataset("A"), dataset("B")],
            binding: vec![],
            operators: vec![operator("diff", &["A", "B"]), operator("twice", &["diff", "diff"])],
        };
        assert!(validate_ensemble(&spec).is_ok());
    }

    #[test]
    fn duplicate_names_across_datasets_and_operators() {
        let spec = EnsembleSpec {
            datasets: vec![dataset("A"), dataset("A")],
            binding: vec![],
            operators: vec![operator("A", &["A"])],
        };

        let errors = validate_ensemble(&spec).unwrap_err();
        assert_eq!(
            errors
                .iter()
                .filter(|e| matches!(e, ValidationError::DuplicateRendererName { .. }))
                .count(),
            2
        );
    }

    #[test]
    fn unresolved_sources_are_reported() {
        let spec = EnsembleSpec {
            datasets: vec![dataset("A")],
            binding: vec![],
            operators: vec![operator("diff", &["A", "C"])],
        };

        let errors = validate_ensemble(&spec).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::UnresolvedSource {
                operator: "diff".to_string(),
                missing_source: "C".to_string(),
            }]
        );
    }

    #[test]
    fn empty_operators_are_reported() {
        let spec = EnsembleSpec {
            datasets: vec![dataset("A")],
            binding: vec![],
            operators: vec![operator("nothing", &[])],
        };
        let errors = validate_ensemble(&spec).unwrap_err();
        assert!(matches!(errors[0], ValidationError::EmptyOperator { .. }));
    }

    #[test]
    fn operator_cycles_are_reported_with_path() {
        let spec = EnsembleSpec {
            datasets: vec![dataset("A")],
            binding: vec![],
            operators: vec![operator("x", &["A", "y"]), operator("y", &["x"])],
        };

        let errors = validate_ensemble(&spec).unwrap_err();
        match &errors[0] {
            ValidationError::CyclicDependency { cycle } => {
                assert_eq!(cycle.first(), cycle.last());
                assert!(cycle.contains(&"x".to_string()));
                assert!(cycle.contains(&"y".to_string()));
            }
            other => panic!("expected cycle, got {:?}", other),
        }
    }

    #[test]
    fn self_referencing_operator_is_a_cycle() {
        let spec = EnsembleSpec {
            datasets: vec![dataset("A")],
            binding: vec![],
            operators: vec![operator("loop", &["loop"])],
        };
        let errors = validate_ensemble(&spec).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::CyclicDependency {
                cycle: vec!["loop".to_string(), "loop".to_string()],
            }]
        );
    }

    #[test]
    fn bindings_to_unknown_datasets_are_tolerated() {
        let spec = EnsembleSpec {
            datasets: vec![dataset("A")],
            binding: vec![crate::config::BindingRule {
                datasets: vec!["A".to_string(), "ghost".to_string()],
                arguments: vec!["time".to_string()],
                other: None,
                bind: None,
            }],
            operators: vec![],
        };
        assert!(validate_ensemble(&spec).is_ok());
    }
}
