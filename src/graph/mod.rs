//! The dependency graph between model nodes.
pub mod dag;
pub mod edge;

pub use dag::DependencyGraph;
pub use edge::EdgeKind;
