//! Every reference resolves, and to a node of an allowed kind.
use crate::store::{Node, NodeBody, NodeId, NodeKind};
use crate::validation::error::{ValidationError, ValidationErrorType};
use std::collections::HashMap;

pub(crate) fn check(nodes: &[Node], index: &HashMap<&str, NodeId>) -> Result<(), ValidationError> {
    for node in nodes {
        match &node.body {
            NodeBody::Constant { .. } => {}
            NodeBody::Level { inflows, outflows, .. } => {
                for flow in inflows.iter().chain(outflows.iter()) {
                    let kind = resolve(nodes, index, node, flow)?;
                    if kind != NodeKind::Rate {
                        return Err(invalid(
                            node,
                            flow,
                            format!("Reference Error: level '{}' lists {} '{}' as a flow; only rate nodes can be flows.", node.id, kind, flow),
                        ));
                    }
                }
            }
            NodeBody::Rate { formula } | NodeBody::Auxiliary { formula } => {
                for reference in formula.references() {
                    let kind = resolve(nodes, index, node, reference)?;
                    if kind == NodeKind::Rate {
                        return Err(invalid(
                            node,
                            reference,
                            format!("Reference Error: formula of '{}' reads rate '{}'; formulas may only read constants, levels and auxiliaries.", node.id, reference),
                        ));
                    }
                }
            }
        }
    }
    Ok(())
}

fn resolve(nodes: &[Node], index: &HashMap<&str, NodeId>, node: &Node, reference: &str) -> Result<NodeKind, ValidationError> {
    match index.get(reference) {
        Some(id) => Ok(nodes[id.index()].kind()),
        None => Err(ValidationError {
            node_ids: vec![node.id.clone(), reference.to_string()],
            error_type: ValidationErrorType::DanglingReference,
            message: format!("Reference Error: node '{}' references unknown id '{}'.", node.id, reference),
        }),
    }
}

fn invalid(node: &Node, reference: &str, message: String) -> ValidationError {
    ValidationError {
        node_ids: vec![node.id.clone(), reference.to_string()],
        error_type: ValidationErrorType::InvalidReference,
        message,
    }
}
