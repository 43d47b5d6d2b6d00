//! The Auxiliary subgraph is acyclic.
use crate::analysis::topology;
use crate::graph::DependencyGraph;
use crate::store::Node;
use crate::validation::error::{ValidationError, ValidationErrorType};

pub(crate) fn check(nodes: &[Node], graph: &DependencyGraph) -> Result<(), ValidationError> {
    topology::detect_cycle(nodes, graph).map_err(|hit| {
        let id = &nodes[hit.index()].id;
        ValidationError::at_node(
            ValidationErrorType::CycleDependency,
            id,
            format!("Cycle Error: auxiliary '{}' depends on itself through other auxiliaries.", id),
        )
    })
}
