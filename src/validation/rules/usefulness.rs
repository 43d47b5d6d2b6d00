//! Every node has a dependency path into some Level.
use crate::analysis::topology;
use crate::graph::DependencyGraph;
use crate::store::Node;
use crate::validation::error::{ValidationError, ValidationErrorType};

pub(crate) fn check(nodes: &[Node], graph: &DependencyGraph) -> Result<(), ValidationError> {
    let useless = topology::useless_nodes(nodes, graph);
    if useless.is_empty() {
        return Ok(());
    }
    let ids: Vec<String> = useless.iter().map(|id| nodes[id.index()].id.clone()).collect();
    Err(ValidationError {
        message: format!("Useless Error: nodes {:?} never influence any level.", ids),
        node_ids: ids,
        error_type: ValidationErrorType::UselessNode,
    })
}
