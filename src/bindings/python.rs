//! The `_core` Python module: a thin wrapper over `Session`.
use crate::error::Error;
use crate::session::Session;
use crate::store::{Expr, ValidRange};
use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;

/// Build and lifecycle mistakes are the caller's fault; evaluation failures
/// are not.
fn to_py_err(err: Error) -> PyErr {
    match err {
        Error::Computation(_) | Error::Sink(_) => PyRuntimeError::new_err(err.to_string()),
        _ => PyValueError::new_err(err.to_string()),
    }
}

fn parse_formula(text: &str) -> PyResult<Expr> {
    Expr::parse(text).map_err(|e| PyValueError::new_err(e.to_string()))
}

#[pyclass(name = "Session")]
#[derive(Debug, Default)]
pub struct PySession {
    inner: Session,
}

#[pymethods]
impl PySession {
    #[new]
    pub fn new() -> Self { Self::default() }

    #[staticmethod]
    pub fn from_json(json: &str) -> PyResult<Self> {
        Session::from_json(json).map(|inner| Self { inner }).map_err(to_py_err)
    }

    #[pyo3(signature = (id, name, value, range=None))]
    pub fn add_constant(&mut self, id: &str, name: &str, value: f64, range: Option<(f64, f64)>) -> PyResult<()> {
        let range = range.map(|(min, max)| ValidRange::new(min, max));
        self.inner.add_constant(id, name, value, range).map_err(to_py_err)
    }

    #[pyo3(signature = (id, name, initial, inflows=Vec::new(), outflows=Vec::new()))]
    pub fn add_level(
        &mut self,
        id: &str,
        name: &str,
        initial: f64,
        inflows: Vec<String>,
        outflows: Vec<String>,
    ) -> PyResult<()> {
        let inflows: Vec<&str> = inflows.iter().map(String::as_str).collect();
        let outflows: Vec<&str> = outflows.iter().map(String::as_str).collect();
        self.inner.add_level(id, name, initial, &inflows, &outflows).map_err(to_py_err)
    }

    pub fn add_rate(&mut self, id: &str, name: &str, formula: &str) -> PyResult<()> {
        let formula = parse_formula(formula)?;
        self.inner.add_rate(id, name, formula).map_err(to_py_err)
    }

    pub fn add_auxiliary(&mut self, id: &str, name: &str, formula: &str) -> PyResult<()> {
        let formula = parse_formula(formula)?;
        self.inner.add_auxiliary(id, name, formula).map_err(to_py_err)
    }

    pub fn validate(&mut self) -> PyResult<()> {
        self.inner.validate().map_err(to_py_err)
    }

    pub fn columns(&self) -> PyResult<Vec<String>> {
        self.inner.columns().map_err(to_py_err)
    }

    /// Level rows for round 0 through `rounds`.
    pub fn run(&self, rounds: usize) -> PyResult<Vec<Vec<f64>>> {
        let mut rows: Vec<Vec<f64>> = Vec::new();
        self.inner.run_into(rounds, &mut rows).map_err(to_py_err)?;
        Ok(rows)
    }

    #[pyo3(signature = (id, rounds=0))]
    pub fn trace(&self, id: &str, rounds: usize) -> PyResult<String> {
        self.inner
            .trace(id, rounds)
            .map_err(to_py_err)?
            .ok_or_else(|| PyValueError::new_err(format!("Unknown node '{}'", id)))
    }

    pub fn is_ready(&self) -> bool { self.inner.is_ready() }
}

pub fn register(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PySession>()?;
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;
    Ok(())
}
