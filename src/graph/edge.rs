//! Defines the `EdgeKind` type, the semantic label of a dependency.

use serde::{Deserialize, Serialize};

/// Describes why `B` depends on `A` for an edge `A -> B`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeKind {
    /// `A` is read by `B`'s formula within the round.
    Formula,
    /// Rate `A` adds to Level `B`.
    Inflow,
    /// Rate `A` drains Level `B`.
    Outflow,
}
