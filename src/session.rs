//! Runtime-checked lifecycle for callers that cannot hold the
//! `ModelBuilder -> Model` typestate (the Python facade, drivers that keep a
//! single handle).
use crate::compute::{ResultSink, Simulation, TimeSeries};
use crate::error::Result;
use crate::model::Model;
use crate::store::{Expr, ModelBuilder, Node, ValidRange};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleError {
    #[error("the model is frozen; structural edits are no longer allowed")]
    Frozen,
    #[error("the model has not been validated yet")]
    NotReady,
    #[error("the model is already validated")]
    AlreadyValidated,
    #[error("validation failed; the model was discarded")]
    Discarded,
}

#[derive(Debug)]
enum Phase {
    Building(ModelBuilder),
    Ready(Model),
    Discarded,
}

#[derive(Debug)]
pub struct Session {
    phase: Phase,
}

impl Default for Session {
    fn default() -> Self { Self::new() }
}

impl Session {
    pub fn new() -> Self {
        Self::from_builder(ModelBuilder::new())
    }

    pub fn from_builder(builder: ModelBuilder) -> Self {
        Self { phase: Phase::Building(builder) }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(Self::from_builder(ModelBuilder::from_json(json)?))
    }

    pub fn is_ready(&self) -> bool { matches!(self.phase, Phase::Ready(_)) }

    pub fn model(&self) -> Option<&Model> {
        match &self.phase {
            Phase::Ready(model) => Some(model),
            _ => None,
        }
    }

    fn builder(&mut self) -> Result<&mut ModelBuilder, LifecycleError> {
        match &mut self.phase {
            Phase::Building(b) => Ok(b),
            Phase::Ready(_) => Err(LifecycleError::Frozen),
            Phase::Discarded => Err(LifecycleError::Discarded),
        }
    }

    fn ready(&self) -> Result<&Model, LifecycleError> {
        match &self.phase {
            Phase::Ready(model) => Ok(model),
            Phase::Building(_) => Err(LifecycleError::NotReady),
            Phase::Discarded => Err(LifecycleError::Discarded),
        }
    }

    pub fn push(&mut self, node: Node) -> Result<()> {
        self.builder()?.push(node);
        Ok(())
    }

    pub fn add_constant(&mut self, id: &str, name: &str, value: f64, range: Option<ValidRange>) -> Result<()> {
        self.builder()?.add_constant(id, name, value, range);
        Ok(())
    }

    pub fn add_level(&mut self, id: &str, name: &str, initial: f64, inflows: &[&str], outflows: &[&str]) -> Result<()> {
        self.builder()?.add_level(id, name, initial, inflows, outflows);
        Ok(())
    }

    pub fn add_rate(&mut self, id: &str, name: &str, formula: Expr) -> Result<()> {
        self.builder()?.add_rate(id, name, formula);
        Ok(())
    }

    pub fn add_auxiliary(&mut self, id: &str, name: &str, formula: Expr) -> Result<()> {
        self.builder()?.add_auxiliary(id, name, formula);
        Ok(())
    }

    pub fn remove(&mut self, id: &str) -> Result<Node> {
        self.builder()?.remove(id)
    }

    pub fn set_formula(&mut self, id: &str, formula: Expr) -> Result<()> {
        self.builder()?.set_formula(id, formula)
    }

    pub fn override_value(&mut self, id: &str, value: f64) -> Result<()> {
        self.builder()?.override_value(id, value)
    }

    /// Freezes the model. A failed validation discards it for good.
    pub fn validate(&mut self) -> Result<()> {
        let builder = match std::mem::replace(&mut self.phase, Phase::Discarded) {
            Phase::Building(b) => b,
            Phase::Ready(model) => {
                self.phase = Phase::Ready(model);
                return Err(LifecycleError::AlreadyValidated.into());
            }
            Phase::Discarded => return Err(LifecycleError::Discarded.into()),
        };
        match builder.validate() {
            Ok(model) => {
                self.phase = Phase::Ready(model);
                Ok(())
            }
            Err(e) => {
                debug!(error = %e, "session discarded");
                Err(e.into())
            }
        }
    }

    /// Level column names of the frozen model.
    pub fn columns(&self) -> Result<Vec<String>> {
        Ok(self.ready()?.level_columns().into_iter().map(String::from).collect())
    }

    /// Simulates from the frozen initial state into `sink`.
    pub fn run_into<S: ResultSink + ?Sized>(&self, rounds: usize, sink: &mut S) -> Result<()> {
        let model = self.ready()?.clone();
        Simulation::new(model).run(rounds, sink)
    }

    pub fn run(&self, rounds: usize) -> Result<TimeSeries> {
        let mut series = TimeSeries::new();
        self.run_into(rounds, &mut series)?;
        Ok(series)
    }

    /// Trace of `id` after `rounds` steps, or `None` for an unknown id.
    pub fn trace(&self, id: &str, rounds: usize) -> Result<Option<String>> {
        let mut sim = Simulation::new(self.ready()?.clone());
        for _ in 0..rounds {
            sim.step()?;
        }
        Ok(sim.trace(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn session() -> Session {
        let mut s = Session::new();
        s.add_level("stock", "Stock", 100.0, &["inflow"], &[]).unwrap();
        s.add_constant("k", "K", 10.0, None).unwrap();
        s.add_rate("inflow", "Inflow", Expr::reference("k")).unwrap();
        s
    }

    fn lifecycle(err: Error) -> LifecycleError {
        match err {
            Error::Lifecycle(e) => e,
            other => panic!("expected lifecycle error, got {other:?}"),
        }
    }

    #[test]
    fn test_run_before_validate() {
        let s = session();
        assert_eq!(lifecycle(s.run(1).unwrap_err()), LifecycleError::NotReady);
    }

    #[test]
    fn test_frozen_after_validate() {
        let mut s = session();
        s.validate().unwrap();
        assert_eq!(lifecycle(s.add_constant("x", "X", 1.0, None).unwrap_err()), LifecycleError::Frozen);
        assert_eq!(lifecycle(s.remove("k").unwrap_err()), LifecycleError::Frozen);
        assert_eq!(lifecycle(s.set_formula("inflow", Expr::number(2.0)).unwrap_err()), LifecycleError::Frozen);
        assert_eq!(lifecycle(s.validate().unwrap_err()), LifecycleError::AlreadyValidated);
        assert!(s.is_ready());
    }

    #[test]
    fn test_failed_validation_discards() {
        let mut s = session();
        s.add_auxiliary("unused", "Unused", Expr::number(1.0)).unwrap();
        assert!(matches!(s.validate(), Err(Error::Validation(_))));
        assert_eq!(lifecycle(s.run(1).unwrap_err()), LifecycleError::Discarded);
        assert_eq!(lifecycle(s.add_constant("x", "X", 1.0, None).unwrap_err()), LifecycleError::Discarded);
        assert_eq!(lifecycle(s.validate().unwrap_err()), LifecycleError::Discarded);
    }

    #[test]
    fn test_repeated_runs_identical() {
        let mut s = session();
        s.validate().unwrap();
        let first = s.run(3).unwrap();
        let second = s.run(3).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.column("Stock"), Some(vec![100.0, 110.0, 120.0, 130.0]));
        assert_eq!(s.columns().unwrap(), vec!["Stock".to_string()]);
    }

    #[test]
    fn test_trace_after_rounds() {
        let mut s = session();
        s.validate().unwrap();
        let text = s.trace("stock", 3).unwrap().unwrap();
        assert!(text.starts_with("TRACE for node 'Stock' at round 3:"), "{}", text);
        assert!(s.trace("nope", 0).unwrap().is_none());
    }
}
