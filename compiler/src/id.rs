// id.rs — Stable declaration-order identifiers
//
// Reactions and connections are identified by their position in the
// declaring reactor. Positions are stable across runs for the same model,
// so operations and diagnostics carry these instead of names — downstream
// schedulers use the reaction index for tie-breaking priority.

use std::fmt;

use serde::Serialize;

/// Index of a reaction within its reactor, in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ReactionId(pub u32);

/// Index of a connection within its reactor, in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ConnectionId(pub u32);

impl fmt::Display for ReactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}", self.0)
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c{}", self.0)
    }
}
