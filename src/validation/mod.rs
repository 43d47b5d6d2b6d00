//! The structural validator: the one-time gate between building and running.
//!
//! The `Validator` checks a `ModelBuilder` against every structural invariant
//! and, on success, freezes it into a runnable `Model`.
pub use self::error::{ValidationError, ValidationErrorType};
pub use self::validator::Validator;

mod error;
mod rules;
mod validator;
