//! Discrete-time stock-and-flow simulation core.
//!
//! A model is built as an editable [`ModelBuilder`], frozen into a [`Model`]
//! by validation, and stepped round by round by a [`Simulation`].

pub mod analysis;
pub mod batch;
pub mod bindings;
pub mod compute;
pub mod display;
pub mod error;
pub mod graph;
pub mod model;
pub mod session;
pub mod store;
pub mod validation;

pub use batch::{run_scenarios, Scenario, ScenarioResult};
pub use compute::{ComputationError, ResultSink, Simulation, SinkError, TimeSeries, TsvWriter};
pub use error::{Error, Result};
pub use model::Model;
pub use session::{LifecycleError, Session};
pub use store::{Expr, ModelBuilder, ModelDocument, Node, NodeBody, NodeId, NodeKind, ValidRange};
pub use validation::{ValidationError, ValidationErrorType};

#[cfg(feature = "python")]
use pyo3::prelude::*;

/// The compiled `_core` Python module.
#[cfg(feature = "python")]
#[pymodule]
fn _core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    bindings::python::register(m)
}
