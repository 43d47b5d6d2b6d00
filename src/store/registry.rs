use super::document::ModelDocument;
use super::formula::Expr;
use super::node::{Node, NodeBody};
use super::types::ValidRange;
use crate::error::{Error, Result};
use crate::model::Model;
use crate::validation::{ValidationError, Validator};

/// An unvalidated model under construction.
///
/// The builder accepts any collection of nodes, including duplicates and
/// dangling references; nothing is checked until [`ModelBuilder::validate`].
/// Edits address the first node with a matching id.
#[derive(Debug, Clone, Default)]
pub struct ModelBuilder {
    nodes: Vec<Node>,
}

impl ModelBuilder {
    pub fn new() -> Self { Self::default() }

    pub fn from_nodes(nodes: Vec<Node>) -> Self { Self { nodes } }

    /// Reads node records from a JSON model document.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(ModelDocument::from_json(json)?.into_builder())
    }

    pub fn len(&self) -> usize { self.nodes.len() }

    pub fn is_empty(&self) -> bool { self.nodes.is_empty() }

    pub fn nodes(&self) -> &[Node] { &self.nodes }

    pub fn into_nodes(self) -> Vec<Node> { self.nodes }

    pub fn push(&mut self, node: Node) -> &mut Self {
        self.nodes.push(node);
        self
    }

    pub fn add_constant(&mut self, id: &str, name: &str, value: f64, range: Option<ValidRange>) -> &mut Self {
        self.push(Node::new(id, name, NodeBody::Constant { value, range }))
    }

    pub fn add_level(&mut self, id: &str, name: &str, initial: f64, inflows: &[&str], outflows: &[&str]) -> &mut Self {
        self.push(Node::new(
            id,
            name,
            NodeBody::Level {
                initial,
                inflows: inflows.iter().map(|s| s.to_string()).collect(),
                outflows: outflows.iter().map(|s| s.to_string()).collect(),
                range: None,
            },
        ))
    }

    pub fn add_rate(&mut self, id: &str, name: &str, formula: Expr) -> &mut Self {
        self.push(Node::new(id, name, NodeBody::Rate { formula }))
    }

    pub fn add_auxiliary(&mut self, id: &str, name: &str, formula: Expr) -> &mut Self {
        self.push(Node::new(id, name, NodeBody::Auxiliary { formula }))
    }

    pub fn get(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    fn get_mut(&mut self, id: &str) -> Result<&mut Node> {
        self.nodes
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or_else(|| Error::UnknownNode(id.to_string()))
    }

    pub fn remove(&mut self, id: &str) -> Result<Node> {
        let pos = self
            .nodes
            .iter()
            .position(|n| n.id == id)
            .ok_or_else(|| Error::UnknownNode(id.to_string()))?;
        Ok(self.nodes.remove(pos))
    }

    /// Replaces the formula of a Rate or Auxiliary node.
    pub fn set_formula(&mut self, id: &str, expr: Expr) -> Result<()> {
        let node = self.get_mut(id)?;
        let kind = node.kind();
        match &mut node.body {
            NodeBody::Rate { formula } | NodeBody::Auxiliary { formula } => {
                *formula = expr;
                Ok(())
            }
            _ => Err(Error::InvalidEdit {
                node: id.to_string(),
                reason: format!("{} nodes have no formula", kind),
            }),
        }
    }

    /// Replaces a Constant's value or a Level's initial value.
    pub fn override_value(&mut self, id: &str, value: f64) -> Result<()> {
        let node = self.get_mut(id)?;
        let kind = node.kind();
        match &mut node.body {
            NodeBody::Constant { value: v, .. } | NodeBody::Level { initial: v, .. } => {
                *v = value;
                Ok(())
            }
            _ => Err(Error::InvalidEdit {
                node: id.to_string(),
                reason: format!("{} nodes are computed, not parameters", kind),
            }),
        }
    }

    /// Runs the structural checks and freezes the model.
    pub fn validate(self) -> std::result::Result<Model, ValidationError> {
        Validator::new(self).validate()
    }
}
