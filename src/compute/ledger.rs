use crate::store::NodeId;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ComputationError {
    #[error("Division by zero at node '{node}' in round {round}")]
    DivisionByZero { node: String, round: usize },
    #[error("Node '{node}' produced non-finite value {value} in round {round}")]
    NonFinite { node: String, round: usize, value: f64 },
    #[error("Malformed program at node '{node}'")]
    MalformedProgram { node: String },
}

/// Current values of every node, one dense slot per `NodeId`.
///
/// A ledger always describes a single round. Rates and Auxiliaries hold the
/// values computed while producing that round; before the first step they
/// are unevaluated.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ledger {
    values: Vec<f64>,
    evaluated: bool,
    round: usize,
}

impl Ledger {
    pub fn new(values: Vec<f64>) -> Self {
        Self { values, evaluated: false, round: 0 }
    }

    pub fn round(&self) -> usize { self.round }

    pub fn len(&self) -> usize { self.values.len() }

    pub fn is_empty(&self) -> bool { self.values.is_empty() }

    /// Whether Rate and Auxiliary slots hold computed values.
    pub fn is_evaluated(&self) -> bool { self.evaluated }

    #[inline(always)]
    pub fn get(&self, id: NodeId) -> Option<f64> {
        self.values.get(id.index()).copied()
    }

    pub fn as_slice(&self) -> &[f64] { &self.values }

    /// Replaces every slot with the values of the next round.
    pub(crate) fn commit(&mut self, values: Vec<f64>) {
        self.values = values;
        self.round += 1;
        self.evaluated = true;
    }
}
