//! The node record: identity plus exactly one kind-specific body.

use super::formula::Expr;
use super::types::{NodeKind, ValidRange};
use serde::{Deserialize, Serialize};

/// A single model variable.
///
/// A node is the "skeleton" of the model: it carries parameters and formulas,
/// but not simulated values (those live in the `compute::Ledger`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    /// Human-readable label; also the Level column sort key.
    #[serde(default)]
    pub name: String,
    #[serde(flatten)]
    pub body: NodeBody,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum NodeBody {
    /// A fixed numeric input.
    Constant {
        value: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        range: Option<ValidRange>,
    },
    /// A stock, updated once per round by its net flow.
    Level {
        initial: f64,
        /// Rate ids adding to the stock. Listed twice still counts once.
        #[serde(default)]
        inflows: Vec<String>,
        /// Rate ids draining the stock.
        #[serde(default)]
        outflows: Vec<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        range: Option<ValidRange>,
    },
    /// A flow magnitude, recomputed every round.
    Rate { formula: Expr },
    /// A derived value, recomputed every round with no state across rounds.
    Auxiliary { formula: Expr },
}

impl Node {
    pub fn new(id: impl Into<String>, name: impl Into<String>, body: NodeBody) -> Self {
        Self { id: id.into(), name: name.into(), body }
    }

    pub fn id(&self) -> &str { &self.id }

    pub fn name(&self) -> &str { &self.name }

    pub fn kind(&self) -> NodeKind {
        match self.body {
            NodeBody::Constant { .. } => NodeKind::Constant,
            NodeBody::Level { .. } => NodeKind::Level,
            NodeBody::Rate { .. } => NodeKind::Rate,
            NodeBody::Auxiliary { .. } => NodeKind::Auxiliary,
        }
    }

    pub fn formula(&self) -> Option<&Expr> {
        match &self.body {
            NodeBody::Rate { formula } | NodeBody::Auxiliary { formula } => Some(formula),
            _ => None,
        }
    }

    /// Ids this node points at: formula inputs, or the flow lists of a Level.
    pub fn references(&self) -> Vec<&str> {
        match &self.body {
            NodeBody::Constant { .. } => Vec::new(),
            NodeBody::Level { inflows, outflows, .. } => {
                inflows.iter().chain(outflows.iter()).map(String::as_str).collect()
            }
            NodeBody::Rate { formula } | NodeBody::Auxiliary { formula } => formula.references(),
        }
    }

    /// Declared numeric parameters as `(value, range)`; `range` is `None` when
    /// only finiteness is required. Formula literals count as parameters too.
    pub(crate) fn parameters(&self) -> Vec<(f64, Option<ValidRange>)> {
        match &self.body {
            NodeBody::Constant { value, range } => vec![(*value, *range)],
            NodeBody::Level { initial, range, .. } => vec![(*initial, *range)],
            NodeBody::Rate { formula } | NodeBody::Auxiliary { formula } => formula
                .coefficients()
                .into_iter()
                .map(|(v, r)| (v, Some(r)))
                .chain(formula.literals().into_iter().map(|v| (v, None)))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_and_references() {
        let level = Node::new(
            "stock",
            "Stock",
            NodeBody::Level {
                initial: 1.0,
                inflows: vec!["in".into()],
                outflows: vec!["out".into()],
                range: None,
            },
        );
        assert_eq!(level.kind(), NodeKind::Level);
        assert_eq!(level.references(), vec!["in", "out"]);
        assert!(level.formula().is_none());

        let aux = Node::new("a", "A", NodeBody::Auxiliary { formula: Expr::parse("x * y").unwrap() });
        assert_eq!(aux.kind(), NodeKind::Auxiliary);
        assert_eq!(aux.references(), vec!["x", "y"]);
    }

    #[test]
    fn test_json_shape() {
        let json = r#"{"id": "birth", "name": "Births", "kind": "rate", "formula": "pop * 0.03"}"#;
        let node: Node = serde_json::from_str(json).unwrap();
        assert_eq!(node.kind(), NodeKind::Rate);
        assert_eq!(node.formula().map(|f| f.to_string()), Some("pop * 0.03".to_string()));
    }
}
