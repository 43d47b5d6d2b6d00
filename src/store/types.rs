use serde::{Deserialize, Serialize};
use std::fmt;

/// Arena handle for a node inside a frozen model.
///
/// Indices are assigned in reader order at freeze time and double as petgraph
/// node indices in the dependency graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl NodeId {
    #[inline(always)]
    pub fn index(&self) -> usize { self.0 as usize }
    pub fn new(idx: usize) -> Self { Self(idx as u32) }
}

/// The four node kinds. Adding a fifth is a schema change, not an extension point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Constant,
    Level,
    Rate,
    Auxiliary,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NodeKind::Constant => "constant",
            NodeKind::Level => "level",
            NodeKind::Rate => "rate",
            NodeKind::Auxiliary => "auxiliary",
        };
        f.write_str(s)
    }
}

/// An inclusive `[min, max]` interval a declared parameter must fall in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValidRange {
    pub min: f64,
    pub max: f64,
}

impl ValidRange {
    pub fn new(min: f64, max: f64) -> Self { Self { min, max } }

    /// An inverted range contains nothing; NaN is never contained.
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

impl fmt::Display for ValidRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.min, self.max)
    }
}
