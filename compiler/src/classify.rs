// classify.rs — Connection shape classification
//
// Decides whether a connection is a one-to-one scalar binding or a
// replicated binding that needs expansion. A pure predicate: it never
// fails, and a reference that does not resolve contributes nothing to the
// decision — the graph builder reports it when expanding the connection.

use crate::model::{Connection, Model, Reactor};
use crate::resolve::resolve_var;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionShape {
    /// Exactly one scalar reference on each side; binds directly.
    Simple,
    /// Multiple references, a multiport, or a banked container on either
    /// side; both sides must be expanded before binding.
    Replicated,
}

/// Classify one connection.
pub fn classify(model: &Model, reactor: &Reactor, connection: &Connection) -> ConnectionShape {
    if connection.left.len() > 1 || connection.right.len() > 1 {
        return ConnectionShape::Replicated;
    }
    for var in connection.left.iter().chain(connection.right.iter()) {
        if let Ok(resolved) = resolve_var(model, reactor, var) {
            if resolved.is_multiport() || resolved.is_bank() {
                return ConnectionShape::Replicated;
            }
        }
    }
    ConnectionShape::Simple
}
