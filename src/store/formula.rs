//! Formula expression trees for Rate and Auxiliary nodes.
//!
//! Leaves are literals, bounded coefficients, or references to other nodes by
//! id. References stay as strings here; the validator resolves them and the
//! compiler lowers the tree to a postfix tape over arena slots.

use super::parse::{self, ParseError};
use super::types::ValidRange;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    Add,
    Subtract,
    Multiply,
    Divide,
    Min,
    Max,
}

impl Operation {
    fn precedence(&self) -> u8 {
        match self {
            Operation::Add | Operation::Subtract => 1,
            Operation::Multiply | Operation::Divide => 2,
            Operation::Min | Operation::Max => PRIMARY,
        }
    }

    fn symbol(&self) -> &'static str {
        match self {
            Operation::Add => "+",
            Operation::Subtract => "-",
            Operation::Multiply => "*",
            Operation::Divide => "/",
            Operation::Min => "min",
            Operation::Max => "max",
        }
    }
}

const UNARY: u8 = 3;
const PRIMARY: u8 = 4;

/// Formulas serialize as their text form, e.g. `"birth_rate * population"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Expr {
    Number(f64),
    /// A literal coefficient with a declared valid range.
    Coefficient { value: f64, range: ValidRange },
    Reference(String),
    Negate(Box<Expr>),
    Binary { op: Operation, lhs: Box<Expr>, rhs: Box<Expr> },
}

impl Expr {
    pub fn number(value: f64) -> Self { Expr::Number(value) }

    pub fn reference(id: impl Into<String>) -> Self { Expr::Reference(id.into()) }

    pub fn bounded(value: f64, range: ValidRange) -> Self { Expr::Coefficient { value, range } }

    pub fn binary(op: Operation, lhs: Expr, rhs: Expr) -> Self {
        Expr::Binary { op, lhs: Box::new(lhs), rhs: Box::new(rhs) }
    }

    pub fn min(lhs: Expr, rhs: Expr) -> Self { Self::binary(Operation::Min, lhs, rhs) }

    pub fn max(lhs: Expr, rhs: Expr) -> Self { Self::binary(Operation::Max, lhs, rhs) }

    /// Parses the text form of a formula.
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        parse::parse(text)
    }

    /// Every node id the formula reads, in first-appearance order, without repeats.
    pub fn references(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.walk(&mut |e| {
            if let Expr::Reference(id) = e {
                if !out.contains(&id.as_str()) {
                    out.push(id.as_str());
                }
            }
        });
        out
    }

    /// Every bounded coefficient in the formula as `(value, range)`.
    pub fn coefficients(&self) -> Vec<(f64, ValidRange)> {
        let mut out = Vec::new();
        self.walk(&mut |e| {
            if let Expr::Coefficient { value, range } = e {
                out.push((*value, *range));
            }
        });
        out
    }

    /// Every plain numeric literal in the formula.
    pub fn literals(&self) -> Vec<f64> {
        let mut out = Vec::new();
        self.walk(&mut |e| {
            if let Expr::Number(v) = e {
                out.push(*v);
            }
        });
        out
    }

    fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Expr)) {
        visit(self);
        match self {
            Expr::Number(_) | Expr::Coefficient { .. } | Expr::Reference(_) => {}
            Expr::Negate(inner) => inner.walk(visit),
            Expr::Binary { lhs, rhs, .. } => {
                lhs.walk(visit);
                rhs.walk(visit);
            }
        }
    }

    fn precedence(&self) -> u8 {
        match self {
            Expr::Number(v) if *v < 0.0 => UNARY,
            Expr::Negate(_) => UNARY,
            Expr::Binary { op, .. } => op.precedence(),
            _ => PRIMARY,
        }
    }

    fn fmt_prec(&self, f: &mut fmt::Formatter<'_>, required: u8) -> fmt::Result {
        let wrap = self.precedence() < required;
        if wrap {
            f.write_str("(")?;
        }
        match self {
            Expr::Number(v) => write!(f, "{}", v)?,
            Expr::Coefficient { value, range } => {
                write!(f, "bounded({}, {}, {})", value, range.min, range.max)?
            }
            Expr::Reference(id) => f.write_str(id)?,
            Expr::Negate(inner) => {
                f.write_str("-")?;
                inner.fmt_prec(f, UNARY)?;
            }
            Expr::Binary { op: op @ (Operation::Min | Operation::Max), lhs, rhs } => {
                write!(f, "{}(", op.symbol())?;
                lhs.fmt_prec(f, 0)?;
                f.write_str(", ")?;
                rhs.fmt_prec(f, 0)?;
                f.write_str(")")?;
            }
            Expr::Binary { op, lhs, rhs } => {
                let p = op.precedence();
                lhs.fmt_prec(f, p)?;
                write!(f, " {} ", op.symbol())?;
                // Left-associative: an equal-precedence right child needs parentheses.
                rhs.fmt_prec(f, p + 1)?;
            }
        }
        if wrap {
            f.write_str(")")?;
        }
        Ok(())
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_prec(f, 0)
    }
}

impl TryFrom<String> for Expr {
    type Error = ParseError;
    fn try_from(text: String) -> Result<Self, Self::Error> {
        Expr::parse(&text)
    }
}

impl From<Expr> for String {
    fn from(expr: Expr) -> Self {
        expr.to_string()
    }
}

impl From<f64> for Expr {
    fn from(value: f64) -> Self { Expr::Number(value) }
}

impl From<&str> for Expr {
    fn from(id: &str) -> Self { Expr::Reference(id.to_string()) }
}

macro_rules! impl_binary_op {
    ($trait:ident, $method:ident, $op:expr) => {
        impl ops::$trait for Expr {
            type Output = Expr;
            fn $method(self, rhs: Expr) -> Expr {
                Expr::binary($op, self, rhs)
            }
        }
    };
}

impl_binary_op!(Add, add, Operation::Add);
impl_binary_op!(Sub, sub, Operation::Subtract);
impl_binary_op!(Mul, mul, Operation::Multiply);
impl_binary_op!(Div, div, Operation::Divide);

impl ops::Neg for Expr {
    type Output = Expr;
    fn neg(self) -> Expr {
        Expr::Negate(Box::new(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_references_dedup_in_order() {
        let e = Expr::reference("b") * Expr::reference("a") + Expr::reference("b");
        assert_eq!(e.references(), vec!["b", "a"]);
    }

    #[test]
    fn test_coefficients_collected() {
        let e = Expr::bounded(0.5, ValidRange::new(0.0, 1.0)) * Expr::reference("pop");
        assert_eq!(e.coefficients(), vec![(0.5, ValidRange::new(0.0, 1.0))]);
    }

    #[rstest]
    #[case("a + b * c")]
    #[case("(a + b) * c")]
    #[case("a - (b - c)")]
    #[case("a / (b * c)")]
    #[case("-a * b")]
    #[case("-(a + b)")]
    #[case("min(a, max(b, 2))")]
    #[case("bounded(0.25, 0, 1) * growth")]
    #[case("stock.total * 0.5")]
    fn test_display_is_canonical(#[case] text: &str) {
        let parsed = Expr::parse(text).unwrap();
        assert_eq!(parsed.to_string(), text);
    }

    #[test]
    fn test_serde_uses_text_form() {
        let e = Expr::reference("a") + Expr::number(1.0);
        let json = serde_json::to_string(&e).unwrap();
        assert_eq!(json, "\"a + 1\"");
        let back: Expr = serde_json::from_str(&json).unwrap();
        assert_eq!(back, e);
    }

    #[test]
    fn test_serde_rejects_bad_formula() {
        let res: Result<Expr, _> = serde_json::from_str("\"a + \"");
        assert!(res.is_err());
    }
}
