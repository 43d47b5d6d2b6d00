use crate::compute::Ledger;
use crate::model::Model;
use crate::store::{NodeBody, NodeId, NodeKind};
use std::collections::HashMap;
use std::fmt::Write;

/// Renders the dependency tree below `target` with the ledger's values.
pub fn format_trace(model: &Model, ledger: &Ledger, target: NodeId) -> String {
    let mut tracer = Tracer { model, ledger, visited_at_level: HashMap::new(), output: String::new() };

    if target.index() < model.len() {
        let name = &model.node_at(target).name;
        let _ = writeln!(tracer.output, "TRACE for node '{}' at round {}:", name, ledger.round());
        let _ = writeln!(tracer.output, "--------------------------------------------------");
        tracer.trace_node(target, 1, "", "");
    } else {
        let _ = writeln!(tracer.output, "Error: Invalid Node ID {:?}", target);
    }
    tracer.output
}

struct Tracer<'a> {
    model: &'a Model,
    ledger: &'a Ledger,
    visited_at_level: HashMap<NodeId, usize>,
    output: String,
}

impl<'a> Tracer<'a> {
    fn trace_node(&mut self, id: NodeId, level: usize, stem: &str, connector: &str) {
        let node = self.model.node_at(id);
        if let Some(&first_seen) = self.visited_at_level.get(&id) {
            let _ = writeln!(self.output, "{}{}{} -> (Ref to L{})", stem, connector, node.name, first_seen);
            return;
        }
        self.visited_at_level.insert(id, level);

        let header = format!("[L{}] {} {}", level, node.name, self.format_value(id));
        let detail = match &node.body {
            NodeBody::Constant { .. } => "-> Const".to_string(),
            NodeBody::Level { inflows, outflows, .. } => {
                let flows: Vec<String> = inflows
                    .iter()
                    .map(|r| format!("+{}", self.name_of(r)))
                    .chain(outflows.iter().map(|r| format!("-{}", self.name_of(r))))
                    .collect();
                format!("-> Level({})", flows.join(", "))
            }
            NodeBody::Rate { formula } | NodeBody::Auxiliary { formula } => format!("= {}", formula),
        };
        let _ = writeln!(self.output, "{}{}{} {}", stem, connector, header, detail);

        let child_stem = match connector {
            "|--" => format!("{}|  ", stem),
            _ => format!("{}   ", stem),
        };
        let children: Vec<NodeId> = self.model.graph().dependencies(id).into_iter().map(|(n, _)| n).collect();
        for (i, &child) in children.iter().enumerate() {
            let connector = if i == children.len() - 1 { "`--" } else { "|--" };
            self.trace_node(child, level + 1, &child_stem, connector);
        }
    }

    fn name_of<'n>(&'n self, id: &'n str) -> &'n str {
        self.model.node(id).map_or(id, |n| n.name.as_str())
    }

    fn format_value(&self, id: NodeId) -> String {
        let computed = matches!(self.model.node_at(id).kind(), NodeKind::Rate | NodeKind::Auxiliary);
        if computed && !self.ledger.is_evaluated() {
            return "[?]".to_string();
        }
        match self.ledger.get(id) {
            Some(v) => format!("[{:.3}]", v),
            None => "[?]".to_string(),
        }
    }
}
