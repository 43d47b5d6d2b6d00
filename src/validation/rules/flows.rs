//! Every Rate feeds or drains at least one Level.
use crate::graph::{DependencyGraph, EdgeKind};
use crate::store::{Node, NodeId, NodeKind};
use crate::validation::error::{ValidationError, ValidationErrorType};

pub(crate) fn check(nodes: &[Node], graph: &DependencyGraph) -> Result<(), ValidationError> {
    for (i, node) in nodes.iter().enumerate() {
        if node.kind() != NodeKind::Rate {
            continue;
        }
        let attached = graph
            .dependents(NodeId::new(i))
            .iter()
            .any(|(_, kind)| matches!(kind, EdgeKind::Inflow | EdgeKind::Outflow));
        if !attached {
            return Err(ValidationError::at_node(
                ValidationErrorType::RateWithoutLevel,
                &node.id,
                format!("Flow Error: rate '{}' is not an inflow or outflow of any level.", node.id),
            ));
        }
    }
    Ok(())
}
