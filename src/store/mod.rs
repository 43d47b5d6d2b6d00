//! The node model: node kinds, formulas, and the unvalidated builder.
pub mod document;
pub mod formula;
pub mod node;
pub mod parse;
pub mod registry;
pub mod types;

pub use document::ModelDocument;
pub use formula::{Expr, Operation};
pub use node::{Node, NodeBody};
pub use parse::ParseError;
pub use registry::ModelBuilder;
pub use types::{NodeId, NodeKind, ValidRange};
