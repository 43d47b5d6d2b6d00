//! One module per structural invariant, in the order the validator runs them.
pub(crate) mod uniqueness;
pub(crate) mod references;
pub(crate) mod cycles;
pub(crate) mod flows;
pub(crate) mod usefulness;
pub(crate) mod ranges;
