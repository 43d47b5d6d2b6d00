//! Every node id is unique.
use crate::store::{Node, NodeId};
use crate::validation::error::{ValidationError, ValidationErrorType};
use std::collections::HashMap;

/// Builds the id index, failing on the first id seen twice (reader order).
pub(crate) fn check(nodes: &[Node]) -> Result<HashMap<&str, NodeId>, ValidationError> {
    let mut index = HashMap::with_capacity(nodes.len());
    for (i, node) in nodes.iter().enumerate() {
        if index.insert(node.id.as_str(), NodeId::new(i)).is_some() {
            return Err(ValidationError::at_node(
                ValidationErrorType::DuplicateId,
                &node.id,
                format!("Duplicate Error: node id '{}' is declared more than once.", node.id),
            ));
        }
    }
    Ok(index)
}
