//! Destinations for per-round Level values.
use serde::{Deserialize, Serialize};
use std::io::{self, Write};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SinkError {
    #[error("sink I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("row has {actual} values, sink expects {expected}")]
    RowLength { expected: usize, actual: usize },
}

/// Receives one row per emitted round, Level values in column order.
pub trait ResultSink {
    /// Called once before the first row.
    fn begin(&mut self, _columns: &[&str]) -> Result<(), SinkError> {
        Ok(())
    }

    fn append_row(&mut self, round: usize, row: &[f64]) -> Result<(), SinkError>;
}

impl ResultSink for Vec<Vec<f64>> {
    fn append_row(&mut self, _round: usize, row: &[f64]) -> Result<(), SinkError> {
        self.push(row.to_vec());
        Ok(())
    }
}

/// In-memory table of simulation output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    pub columns: Vec<String>,
    pub rounds: Vec<usize>,
    pub rows: Vec<Vec<f64>>,
}

impl TimeSeries {
    pub fn new() -> Self { Self::default() }

    pub fn len(&self) -> usize { self.rows.len() }

    pub fn is_empty(&self) -> bool { self.rows.is_empty() }

    /// All values of one column, by Level name. The first matching column wins.
    pub fn column(&self, name: &str) -> Option<Vec<f64>> {
        let idx = self.columns.iter().position(|c| c == name)?;
        Some(self.rows.iter().map(|row| row[idx]).collect())
    }
}

impl ResultSink for TimeSeries {
    fn begin(&mut self, columns: &[&str]) -> Result<(), SinkError> {
        self.columns = columns.iter().map(|c| c.to_string()).collect();
        self.rounds.clear();
        self.rows.clear();
        Ok(())
    }

    fn append_row(&mut self, round: usize, row: &[f64]) -> Result<(), SinkError> {
        if row.len() != self.columns.len() {
            return Err(SinkError::RowLength { expected: self.columns.len(), actual: row.len() });
        }
        self.rounds.push(round);
        self.rows.push(row.to_vec());
        Ok(())
    }
}

/// Tab-separated output: a `round` header line then one line per round.
pub struct TsvWriter<W: Write> {
    out: W,
    width: usize,
}

impl<W: Write> TsvWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out, width: 0 }
    }

    pub fn into_inner(self) -> W { self.out }
}

impl<W: Write> ResultSink for TsvWriter<W> {
    fn begin(&mut self, columns: &[&str]) -> Result<(), SinkError> {
        self.width = columns.len();
        let mut line = String::from("round");
        for c in columns {
            line.push('\t');
            line.push_str(c);
        }
        writeln!(self.out, "{}", line)?;
        Ok(())
    }

    fn append_row(&mut self, round: usize, row: &[f64]) -> Result<(), SinkError> {
        if row.len() != self.width {
            return Err(SinkError::RowLength { expected: self.width, actual: row.len() });
        }
        let mut line = round.to_string();
        for v in row {
            line.push('\t');
            line.push_str(&v.to_string());
        }
        writeln!(self.out, "{}", line)?;
        Ok(())
    }
}
