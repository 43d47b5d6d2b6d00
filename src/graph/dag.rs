//! dag.rs
//! The dependency graph of a frozen model, backed by petgraph.

use super::edge::EdgeKind;
use crate::store::{Node, NodeBody, NodeId};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::collections::HashMap;

/// Directed graph with an edge `A -> B` whenever `B` depends on `A`.
///
/// Graph indices coincide with model arena indices: node `i` of the model is
/// `NodeIndex::new(i)` here, so no separate mapping is kept.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    pub(crate) graph: DiGraph<NodeId, EdgeKind>,
}

impl DependencyGraph {
    /// Builds the graph from nodes whose references are already known to resolve.
    /// Unresolvable ids are skipped.
    pub fn build(nodes: &[Node], index: &HashMap<&str, NodeId>) -> Self {
        let mut graph = DiGraph::with_capacity(nodes.len(), nodes.len() * 2);
        for i in 0..nodes.len() {
            graph.add_node(NodeId::new(i));
        }

        let mut this = Self { graph };
        for (i, node) in nodes.iter().enumerate() {
            let target = NodeId::new(i);
            match &node.body {
                NodeBody::Constant { .. } => {}
                NodeBody::Level { inflows, outflows, .. } => {
                    for rate in inflows.iter().filter_map(|r| index.get(r.as_str())) {
                        this.link(*rate, target, EdgeKind::Inflow);
                    }
                    for rate in outflows.iter().filter_map(|r| index.get(r.as_str())) {
                        this.link(*rate, target, EdgeKind::Outflow);
                    }
                }
                NodeBody::Rate { formula } | NodeBody::Auxiliary { formula } => {
                    for source in formula.references().into_iter().filter_map(|r| index.get(r)) {
                        this.link(*source, target, EdgeKind::Formula);
                    }
                }
            }
        }
        this
    }

    /// Adds `from -> to` unless an edge of the same kind is already present.
    fn link(&mut self, from: NodeId, to: NodeId, kind: EdgeKind) {
        let (a, b) = (NodeIndex::new(from.index()), NodeIndex::new(to.index()));
        if !self.graph.edges_connecting(a, b).any(|e| *e.weight() == kind) {
            self.graph.add_edge(a, b, kind);
        }
    }

    pub fn node_count(&self) -> usize { self.graph.node_count() }

    pub fn edge_count(&self) -> usize { self.graph.edge_count() }

    /// Nodes `id` depends on, with the edge kind, sorted by arena index.
    pub fn dependencies(&self, id: NodeId) -> Vec<(NodeId, EdgeKind)> {
        self.neighbors(id, Direction::Incoming)
    }

    /// Nodes that depend on `id`, with the edge kind, sorted by arena index.
    pub fn dependents(&self, id: NodeId) -> Vec<(NodeId, EdgeKind)> {
        self.neighbors(id, Direction::Outgoing)
    }

    fn neighbors(&self, id: NodeId, dir: Direction) -> Vec<(NodeId, EdgeKind)> {
        let idx = NodeIndex::new(id.index());
        let mut out: Vec<(NodeId, EdgeKind)> = self
            .graph
            .edges_directed(idx, dir)
            .map(|e| {
                let other = if dir == Direction::Incoming { e.source() } else { e.target() };
                (NodeId::new(other.index()), *e.weight())
            })
            .collect();
        out.sort_by_key(|(n, k)| (*n, *k as u8));
        out
    }

    /// All edges as `(from, to, kind)`.
    pub fn edges(&self) -> impl Iterator<Item = (NodeId, NodeId, EdgeKind)> + '_ {
        self.graph.edge_references().map(|e| {
            (NodeId::new(e.source().index()), NodeId::new(e.target().index()), *e.weight())
        })
    }
}
