//! JSON record shape of a whole model, as produced by an external reader.

use super::node::Node;
use super::registry::ModelBuilder;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelDocument {
    /// Default round count for drivers that do not supply one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rounds: Option<usize>,
    pub nodes: Vec<Node>,
}

impl ModelDocument {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn into_builder(self) -> ModelBuilder {
        ModelBuilder::from_nodes(self.nodes)
    }
}

impl From<&ModelBuilder> for ModelDocument {
    fn from(builder: &ModelBuilder) -> Self {
        Self { rounds: None, nodes: builder.nodes().to_vec() }
    }
}
