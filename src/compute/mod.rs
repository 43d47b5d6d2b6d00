//! Round-by-round execution: formulas are lowered to a postfix tape once at
//! freeze time and replayed against a dense ledger every round.
pub mod bytecode;
pub mod engine;
pub mod kernel;
pub mod ledger;
pub mod sink;

pub use engine::Simulation;
pub use ledger::{ComputationError, Ledger};
pub use sink::{ResultSink, SinkError, TimeSeries, TsvWriter};
