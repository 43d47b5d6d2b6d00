//! Defines the error types for the validation module.
use thiserror::Error;

/// The invariant a model violated.
///
// This enum allows for programmatic inspection of errors, which is more
// robust than string matching on the error message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationErrorType {
    /// Two nodes share an id.
    DuplicateId,
    /// A formula or flow list names an id that does not exist.
    DanglingReference,
    /// A reference resolves to a node of the wrong kind (a formula reading a
    /// Rate, or a flow list naming a non-Rate).
    InvalidReference,
    /// Auxiliary nodes depend on each other in a loop.
    CycleDependency,
    /// A Rate node that no Level lists as inflow or outflow.
    RateWithoutLevel,
    /// A node with no dependency path into any Level.
    UselessNode,
    /// A declared parameter outside its valid range, or not finite.
    OutOfRange,
}

/// A structured error report from the validator.
///
/// Validation stops at the first violated invariant, so a model yields at
/// most one of these.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ValidationError {
    /// Ids of the offending node(s); never empty.
    pub node_ids: Vec<String>,
    /// The category of the error.
    pub error_type: ValidationErrorType,
    /// A human-readable message explaining the error.
    pub message: String,
}

impl ValidationError {
    pub(crate) fn at_node(error_type: ValidationErrorType, node_id: &str, message: String) -> Self {
        Self { node_ids: vec![node_id.to_string()], error_type, message }
    }

    /// The first offending node id.
    pub fn node_id(&self) -> &str {
        self.node_ids.first().map(String::as_str).unwrap_or_default()
    }
}
