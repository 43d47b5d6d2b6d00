//! The crate-wide error type.
use crate::compute::{ComputationError, SinkError};
use crate::session::LifecycleError;
use crate::store::ParseError;
use crate::validation::ValidationError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Document(#[from] serde_json::Error),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
    #[error(transparent)]
    Computation(#[from] ComputationError),
    #[error(transparent)]
    Sink(#[from] SinkError),
    #[error("Unknown node '{0}'")]
    UnknownNode(String),
    #[error("Cannot edit node '{node}': {reason}")]
    InvalidEdit { node: String, reason: String },
    #[error("Scenario '{scenario}' overrides unknown or computed node '{node}'")]
    InvalidOverride { scenario: String, node: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
