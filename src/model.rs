//! The frozen, validated model.
use crate::compute::bytecode::{Compiler, Program};
use crate::graph::DependencyGraph;
use crate::store::{Node, NodeBody, NodeId, NodeKind};
use std::collections::HashMap;

/// A model that passed validation.
///
/// There are no mutators: structure, parameters and formulas are fixed for
/// the lifetime of the value. To change a parameter, go back through a
/// `ModelBuilder` and validate again.
#[derive(Debug, Clone)]
pub struct Model {
    nodes: Vec<Node>,
    index: HashMap<String, NodeId>,
    graph: DependencyGraph,
    auxiliary_order: Vec<NodeId>,
    rate_order: Vec<NodeId>,
    /// Level column order: by name, then id.
    levels: Vec<NodeId>,
    program: Program,
}

impl Model {
    pub(crate) fn freeze(
        nodes: Vec<Node>,
        index: HashMap<String, NodeId>,
        graph: DependencyGraph,
        auxiliary_order: Vec<NodeId>,
    ) -> Self {
        let ids_of = |kind: NodeKind| -> Vec<NodeId> {
            (0..nodes.len()).map(NodeId::new).filter(|id| nodes[id.index()].kind() == kind).collect()
        };

        let mut rate_order = ids_of(NodeKind::Rate);
        rate_order.sort_by(|a, b| nodes[a.index()].id.cmp(&nodes[b.index()].id));

        let mut levels = ids_of(NodeKind::Level);
        levels.sort_by(|a, b| {
            let (na, nb) = (&nodes[a.index()], &nodes[b.index()]);
            na.name.cmp(&nb.name).then_with(|| na.id.cmp(&nb.id))
        });

        let program = Compiler::new(&nodes, &index).compile(&auxiliary_order, &rate_order, &levels);

        Self { nodes, index, graph, auxiliary_order, rate_order, levels, program }
    }

    pub fn len(&self) -> usize { self.nodes.len() }

    pub fn is_empty(&self) -> bool { self.nodes.is_empty() }

    pub fn nodes(&self) -> &[Node] { &self.nodes }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.node_id(id).map(|n| &self.nodes[n.index()])
    }

    pub fn node_id(&self, id: &str) -> Option<NodeId> {
        self.index.get(id).copied()
    }

    #[inline(always)]
    pub fn node_at(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn graph(&self) -> &DependencyGraph { &self.graph }

    /// Auxiliary evaluation order, fixed at freeze time.
    pub fn auxiliary_order(&self) -> &[NodeId] { &self.auxiliary_order }

    /// Rates in id order.
    pub fn rate_order(&self) -> &[NodeId] { &self.rate_order }

    /// Levels in output column order.
    pub fn level_ids(&self) -> &[NodeId] { &self.levels }

    /// Level names in output column order.
    pub fn level_columns(&self) -> Vec<&str> {
        self.levels.iter().map(|id| self.nodes[id.index()].name.as_str()).collect()
    }

    pub(crate) fn program(&self) -> &Program { &self.program }

    /// Round-0 value of every slot. Formula nodes start at zero and are
    /// marked unevaluated by the ledger.
    pub(crate) fn initial_values(&self) -> Vec<f64> {
        self.nodes
            .iter()
            .map(|n| match n.body {
                NodeBody::Constant { value, .. } => value,
                NodeBody::Level { initial, .. } => initial,
                NodeBody::Rate { .. } | NodeBody::Auxiliary { .. } => 0.0,
            })
            .collect()
    }
}
