use crate::graph::DependencyGraph;
use crate::store::{Node, NodeId, NodeKind};
use petgraph::graph::NodeIndex;
use petgraph::visit::{Dfs, Reversed};
use std::cmp::Reverse;
use std::collections::BinaryHeap;

// Levels and Rates are round-start snapshot inputs, so only the
// Auxiliary-induced subgraph can form an intra-round cycle.

fn is_auxiliary(nodes: &[Node], id: NodeId) -> bool {
    nodes[id.index()].kind() == NodeKind::Auxiliary
}

/// Auxiliary ids sorted by their string id.
fn auxiliaries_by_id(nodes: &[Node]) -> Vec<NodeId> {
    let mut out: Vec<NodeId> = (0..nodes.len())
        .map(NodeId::new)
        .filter(|&id| is_auxiliary(nodes, id))
        .collect();
    out.sort_by(|a, b| nodes[a.index()].id.cmp(&nodes[b.index()].id));
    out
}

/// Auxiliary dependencies of `id`, sorted by string id.
fn auxiliary_inputs(nodes: &[Node], graph: &DependencyGraph, id: NodeId) -> Vec<NodeId> {
    let mut out: Vec<NodeId> = graph
        .dependencies(id)
        .into_iter()
        .map(|(n, _)| n)
        .filter(|&n| is_auxiliary(nodes, n))
        .collect();
    out.sort_by(|a, b| nodes[a.index()].id.cmp(&nodes[b.index()].id));
    out
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum VisitState {
    None,
    Visiting, // Used for cycle detection
    Visited,
}

/// Depth-first search over the Auxiliary subgraph.
///
/// Roots and inputs are visited in id order. Returns the node that was
/// re-entered while still on the traversal stack.
pub fn detect_cycle(nodes: &[Node], graph: &DependencyGraph) -> Result<(), NodeId> {
    let mut state = vec![VisitState::None; nodes.len()];
    for root in auxiliaries_by_id(nodes) {
        if state[root.index()] == VisitState::None {
            visit(root, nodes, graph, &mut state)?;
        }
    }
    Ok(())
}

fn visit(root: NodeId, nodes: &[Node], graph: &DependencyGraph, state: &mut [VisitState]) -> Result<(), NodeId> {
    // Explicit stack of (node, its inputs, next input to visit).
    state[root.index()] = VisitState::Visiting;
    let mut stack = vec![(root, auxiliary_inputs(nodes, graph, root), 0usize)];

    while let Some((node, inputs, next)) = stack.last_mut() {
        let Some(&input) = inputs.get(*next) else {
            state[node.index()] = VisitState::Visited;
            stack.pop();
            continue;
        };
        *next += 1;
        match state[input.index()] {
            VisitState::Visited => {}
            VisitState::Visiting => return Err(input),
            VisitState::None => {
                state[input.index()] = VisitState::Visiting;
                let inputs = auxiliary_inputs(nodes, graph, input);
                stack.push((input, inputs, 0));
            }
        }
    }
    Ok(())
}

/// Evaluation order of the Auxiliary nodes using Kahn's Algorithm.
///
/// The ready set is a min-heap on the string id, so among nodes with no
/// ordering constraint the smaller id comes first. Requires an acyclic
/// Auxiliary subgraph; nodes on a cycle are left out.
pub fn auxiliary_order(nodes: &[Node], graph: &DependencyGraph) -> Vec<NodeId> {
    let auxiliaries = auxiliaries_by_id(nodes);
    let mut in_degree = vec![0usize; nodes.len()];
    let mut ready = BinaryHeap::new();

    for &id in &auxiliaries {
        let degree = auxiliary_inputs(nodes, graph, id).len();
        in_degree[id.index()] = degree;
        if degree == 0 {
            ready.push(Reverse((nodes[id.index()].id.as_str(), id)));
        }
    }

    let mut order = Vec::with_capacity(auxiliaries.len());
    while let Some(Reverse((_, id))) = ready.pop() {
        order.push(id);
        for (child, _) in graph.dependents(id) {
            if !is_auxiliary(nodes, child) {
                continue;
            }
            let degree = &mut in_degree[child.index()];
            *degree -= 1;
            if *degree == 0 {
                ready.push(Reverse((nodes[child.index()].id.as_str(), child)));
            }
        }
    }
    order
}

/// Nodes with no dependency path into any Level, sorted by string id.
///
/// Walks the reversed graph from every Level; whatever is not reached can
/// never influence state.
pub fn useless_nodes(nodes: &[Node], graph: &DependencyGraph) -> Vec<NodeId> {
    let reversed = Reversed(&graph.graph);
    let mut dfs = Dfs::empty(reversed);
    let mut reached = vec![false; nodes.len()];

    for (i, node) in nodes.iter().enumerate() {
        if node.kind() != NodeKind::Level {
            continue;
        }
        dfs.move_to(NodeIndex::new(i));
        while let Some(n) = dfs.next(reversed) {
            reached[n.index()] = true;
        }
    }

    let mut useless: Vec<NodeId> = (0..nodes.len())
        .filter(|&i| !reached[i])
        .map(NodeId::new)
        .collect();
    useless.sort_by(|a, b| nodes[a.index()].id.cmp(&nodes[b.index()].id));
    useless
}
