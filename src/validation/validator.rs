//! The central validator that orchestrates the structural invariant checks.
use super::error::ValidationError;
use super::rules::{cycles, flows, ranges, references, uniqueness, usefulness};
use crate::analysis::topology;
use crate::graph::DependencyGraph;
use crate::model::Model;
use crate::store::{ModelBuilder, NodeId};
use std::collections::HashMap;
use tracing::{debug, info};

/// The gate between an editable `ModelBuilder` and a runnable `Model`.
///
/// Checks run in a fixed order and stop at the first violation, so the same
/// faulty model always reports the same error:
/// uniqueness, references, cycles, rate flows, usefulness, parameter ranges.
/// Consuming the builder makes validation a one-shot transition.
pub struct Validator {
    builder: ModelBuilder,
}

impl Validator {
    pub fn new(builder: ModelBuilder) -> Self {
        Self { builder }
    }

    /// Executes every check and, if all pass, freezes the model.
    pub fn validate(self) -> Result<Model, ValidationError> {
        let nodes = self.builder.into_nodes();
        debug!(nodes = nodes.len(), "validation starting");

        let (index, graph, auxiliary_order) = {
            let index = uniqueness::check(&nodes)?;
            references::check(&nodes, &index)?;
            debug!("references resolved");

            let graph = DependencyGraph::build(&nodes, &index);
            cycles::check(&nodes, &graph)?;
            flows::check(&nodes, &graph)?;
            usefulness::check(&nodes, &graph)?;
            ranges::check(&nodes)?;
            debug!(edges = graph.edge_count(), "structure checks passed");

            let order = topology::auxiliary_order(&nodes, &graph);
            let index: HashMap<String, NodeId> =
                index.into_iter().map(|(id, n)| (id.to_string(), n)).collect();
            (index, graph, order)
        };

        let model = Model::freeze(nodes, index, graph, auxiliary_order);
        info!(nodes = model.len(), levels = model.level_ids().len(), "model validated");
        Ok(model)
    }
}
