//! Declared parameters are finite and within their valid range.
use crate::store::Node;
use crate::validation::error::{ValidationError, ValidationErrorType};

pub(crate) fn check(nodes: &[Node]) -> Result<(), ValidationError> {
    for node in nodes {
        for (value, range) in node.parameters() {
            let ok = value.is_finite() && range.map_or(true, |r| r.contains(value));
            if ok {
                continue;
            }
            let message = match range {
                Some(r) => format!("Range Error: parameter {} of '{}' is outside its valid range {}.", value, node.id, r),
                None => format!("Range Error: parameter {} of '{}' is not a finite number.", value, node.id),
            };
            return Err(ValidationError::at_node(ValidationErrorType::OutOfRange, &node.id, message));
        }
    }
    Ok(())
}
