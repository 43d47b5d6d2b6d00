use crate::compute::bytecode::Program;
use crate::compute::kernel::{self, Fault};
use crate::compute::ledger::{ComputationError, Ledger};
use crate::compute::sink::ResultSink;
use crate::display::trace;
use crate::error::Result;
use crate::model::Model;
use crate::store::NodeKind;
use tracing::{info, trace};

/// A running simulation of one frozen model.
///
/// Each step produces the next round from the current one:
/// 1. Auxiliaries in topological order, then Rates in id order, evaluated
///    against round-start Levels and Constants.
/// 2. Every Level moves by its net flow, reading only round-start Levels.
/// 3. New values are committed together, or not at all on error.
pub struct Simulation {
    model: Model,
    ledger: Ledger,
}

impl Simulation {
    pub fn new(model: Model) -> Self {
        let ledger = Ledger::new(model.initial_values());
        Self { model, ledger }
    }

    pub fn model(&self) -> &Model { &self.model }

    pub fn ledger(&self) -> &Ledger { &self.ledger }

    pub fn into_model(self) -> Model { self.model }

    /// Index of the round the ledger currently describes.
    pub fn round(&self) -> usize { self.ledger.round() }

    /// Current value of a node. `None` for unknown ids, and for Rates and
    /// Auxiliaries before the first step.
    pub fn current_value(&self, id: &str) -> Option<f64> {
        let node = self.model.node_id(id)?;
        match self.model.node_at(node).kind() {
            NodeKind::Rate | NodeKind::Auxiliary if !self.ledger.is_evaluated() => None,
            _ => self.ledger.get(node),
        }
    }

    /// Level values in column order.
    pub fn level_values(&self) -> Vec<f64> {
        self.model
            .level_ids()
            .iter()
            .map(|&id| self.ledger.get(id).unwrap_or(f64::NAN))
            .collect()
    }

    /// Advances one round. On error the ledger is left unchanged.
    pub fn step(&mut self) -> std::result::Result<(), ComputationError> {
        let next_round = self.ledger.round() + 1;
        let program: &Program = self.model.program();
        let current = self.ledger.as_slice();
        let mut scratch = current.to_vec();

        for &id in &program.order {
            let value = kernel::evaluate(program.tape(id), &scratch).map_err(|fault| {
                let node = self.model.node_at(id).id.clone();
                match fault {
                    Fault::DivisionByZero => ComputationError::DivisionByZero { node, round: next_round },
                    Fault::Malformed => ComputationError::MalformedProgram { node },
                }
            })?;
            if !value.is_finite() {
                return Err(self.non_finite(id, next_round, value));
            }
            scratch[id.index()] = value;
        }

        for update in &program.levels {
            let inflow: f64 = update.inflows.iter().map(|r| scratch[r.index()]).sum();
            let outflow: f64 = update.outflows.iter().map(|r| scratch[r.index()]).sum();
            let next = current[update.level.index()] + inflow - outflow;
            if !next.is_finite() {
                return Err(self.non_finite(update.level, next_round, next));
            }
            scratch[update.level.index()] = next;
        }

        self.ledger.commit(scratch);
        trace!(round = next_round, "round committed");
        Ok(())
    }

    /// Emits the current round, then steps `rounds` times emitting each new
    /// round. Rows already handed to the sink stay there if a step fails.
    pub fn run<S: ResultSink + ?Sized>(&mut self, rounds: usize, sink: &mut S) -> Result<()> {
        let start = self.round();
        info!(start, rounds, levels = self.model.level_ids().len(), "simulation starting");

        sink.begin(&self.model.level_columns())?;
        sink.append_row(start, &self.level_values())?;
        for _ in 0..rounds {
            self.step()?;
            sink.append_row(self.round(), &self.level_values())?;
        }

        info!(round = self.round(), "simulation finished");
        Ok(())
    }

    /// Dependency tree of a node with current values.
    pub fn trace(&self, id: &str) -> Option<String> {
        let node = self.model.node_id(id)?;
        Some(trace::format_trace(&self.model, &self.ledger, node))
    }

    fn non_finite(&self, id: crate::store::NodeId, round: usize, value: f64) -> ComputationError {
        ComputationError::NonFinite { node: self.model.node_at(id).id.clone(), round, value }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::SinkError;
    use crate::error::Error;
    use crate::store::{Expr, ModelBuilder};
    use std::io;

    /// Stock fed by a constant inflow of 10 per round.
    fn steady() -> Model {
        let mut b = ModelBuilder::new();
        b.add_level("stock", "Stock", 100.0, &["inflow"], &[])
            .add_constant("k", "K", 10.0, None)
            .add_rate("inflow", "Inflow", Expr::reference("k"));
        b.validate().unwrap()
    }

    #[test]
    fn test_linear_accumulation() {
        let mut sim = Simulation::new(steady());
        let mut rows: Vec<Vec<f64>> = Vec::new();
        sim.run(3, &mut rows).unwrap();
        assert_eq!(rows, vec![vec![100.0], vec![110.0], vec![120.0], vec![130.0]]);
        assert_eq!(sim.round(), 3);
    }

    #[test]
    fn test_zero_rounds_emits_initial_state() {
        let mut sim = Simulation::new(steady());
        let mut rows: Vec<Vec<f64>> = Vec::new();
        sim.run(0, &mut rows).unwrap();
        assert_eq!(rows, vec![vec![100.0]]);
        assert_eq!(sim.current_value("inflow"), None);
        assert_eq!(sim.current_value("k"), Some(10.0));
    }

    #[test]
    fn test_deterministic() {
        let run = || {
            let mut sim = Simulation::new(steady());
            let mut rows: Vec<Vec<f64>> = Vec::new();
            sim.run(20, &mut rows).unwrap();
            rows
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_levels_update_simultaneously() {
        // Two stocks exchange their full contents every round.
        let mut b = ModelBuilder::new();
        b.add_level("a", "A", 1.0, &["to_a"], &["to_b"])
            .add_level("b", "B", 5.0, &["to_b"], &["to_a"])
            .add_rate("to_b", "To B", Expr::reference("a"))
            .add_rate("to_a", "To A", Expr::reference("b"));
        let mut sim = Simulation::new(b.validate().unwrap());

        sim.step().unwrap();
        assert_eq!(sim.level_values(), vec![5.0, 1.0]);
        sim.step().unwrap();
        assert_eq!(sim.level_values(), vec![1.0, 5.0]);
    }

    #[test]
    fn test_auxiliary_chain_reads_same_round() {
        let mut b = ModelBuilder::new();
        b.add_level("s", "S", 2.0, &["r"], &[])
            .add_auxiliary("half", "Half", Expr::reference("s") / Expr::number(2.0))
            .add_auxiliary("quarter", "Quarter", Expr::reference("half") / Expr::number(2.0))
            .add_rate("r", "R", Expr::reference("quarter"));
        let mut sim = Simulation::new(b.validate().unwrap());
        sim.step().unwrap();
        assert_eq!(sim.current_value("half"), Some(1.0));
        assert_eq!(sim.current_value("r"), Some(0.5));
        assert_eq!(sim.current_value("s"), Some(2.5));
    }

    /// The outflow drains the stock to zero; round 2 divides by it.
    fn draining() -> Model {
        let mut b = ModelBuilder::new();
        b.add_level("s", "S", 4.0, &[], &["drain"])
            .add_auxiliary("inverse", "Inverse", Expr::number(1.0) / Expr::reference("s"))
            .add_rate("drain", "Drain", Expr::reference("s") + Expr::reference("inverse") * Expr::number(0.0));
        b.validate().unwrap()
    }

    /// Accepts rows until `fail_at`, then reports an I/O failure.
    struct FullSink {
        fail_at: usize,
        rows: Vec<Vec<f64>>,
    }

    impl ResultSink for FullSink {
        fn append_row(&mut self, round: usize, row: &[f64]) -> std::result::Result<(), SinkError> {
            if round == self.fail_at {
                return Err(io::Error::new(io::ErrorKind::Other, "disk full").into());
            }
            self.rows.push(row.to_vec());
            Ok(())
        }
    }

    #[test]
    fn test_division_by_zero_leaves_ledger_unchanged() {
        let mut sim = Simulation::new(draining());

        sim.step().unwrap();
        assert_eq!(sim.level_values(), vec![0.0]);
        let before = sim.ledger().clone();

        let err = sim.step().unwrap_err();
        assert_eq!(err, ComputationError::DivisionByZero { node: "inverse".into(), round: 2 });
        assert_eq!(sim.ledger(), &before);
        assert_eq!(sim.round(), 1);
    }

    #[test]
    fn test_non_finite_level_rejected() {
        let mut b = ModelBuilder::new();
        b.add_level("s", "S", 1.0, &["grow"], &[])
            .add_constant("k", "K", 1e308, None)
            .add_rate("grow", "Grow", Expr::reference("s") * Expr::reference("k"));
        let mut sim = Simulation::new(b.validate().unwrap());
        sim.step().unwrap();
        assert!(matches!(sim.step(), Err(ComputationError::NonFinite { ref node, round: 2, .. }) if node == "grow"));
    }

    #[test]
    fn test_run_stops_at_computation_error_keeping_rows() {
        let mut sim = Simulation::new(draining());
        let mut rows: Vec<Vec<f64>> = Vec::new();

        let err = sim.run(5, &mut rows).unwrap_err();
        assert!(matches!(
            err,
            Error::Computation(ComputationError::DivisionByZero { ref node, round: 2 }) if node == "inverse"
        ));
        assert_eq!(rows, vec![vec![4.0], vec![0.0]]);
        assert_eq!(sim.round(), 1);
    }

    #[test]
    fn test_run_stops_at_sink_error() {
        let mut sim = Simulation::new(steady());
        let mut sink = FullSink { fail_at: 2, rows: Vec::new() };

        assert!(matches!(sim.run(10, &mut sink), Err(Error::Sink(SinkError::Io(_)))));
        assert_eq!(sink.rows, vec![vec![100.0], vec![110.0]]);
        // Round 2 was computed, then the sink refused it; nothing ran after.
        assert_eq!(sim.round(), 2);
    }

    #[test]
    fn test_into_model_returns_frozen_model() {
        let mut sim = Simulation::new(steady());
        sim.step().unwrap();
        let model = sim.into_model();

        // A fresh simulation of the same model starts from round 0 again.
        let restarted = Simulation::new(model);
        assert_eq!(restarted.round(), 0);
        assert_eq!(restarted.level_values(), vec![100.0]);
    }
}
