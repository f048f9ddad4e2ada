// expand.rs — Replication expansion
//
// Turns a (possibly banked, possibly multiport) variable reference into an
// ordered flat sequence of elementary leaves. The iteration order — bank
// index outermost, port index innermost — is the canonical order for the
// whole assembler: the trigger/dependency/effect path and both sides of a
// connection all expand through this one function, so emitter and consumer
// cannot disagree on it.
//
// Preconditions: `reactor` is a member of `model`.
// Postconditions: leaves are in canonical order; a scalar reference yields
//                 exactly one leaf with no indices; zero-width banks and
//                 multiports yield no leaves.
// Failure modes: unresolved references or widths.
// Side effects: none.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::model::{Model, Reactor, VarRef};
use crate::resolve::{resolve_var, ResolveError, ResolvedVar, VarTarget};
use crate::width::{resolve_width, UnresolvedWidth, WidthContext};

// ── Leaves ───────────────────────────────────────────────────────────────

/// An elementary endpoint after expansion. Index fields are present only
/// where the corresponding axis is replicated: `instance_index` for a
/// banked container, `port_index` for a multiport.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Leaf {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance_index: Option<u32>,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port_index: Option<u32>,
}

impl Leaf {
    /// The single leaf of a reference used without expansion.
    pub fn scalar(var: &VarRef) -> Self {
        Leaf {
            instance: var.container.clone(),
            instance_index: None,
            name: var.name.clone(),
            port_index: None,
        }
    }
}

impl fmt::Display for Leaf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(instance) = &self.instance {
            write!(f, "{}", instance)?;
            if let Some(b) = self.instance_index {
                write!(f, "[{}]", b)?;
            }
            write!(f, ".")?;
        }
        write!(f, "{}", self.name)?;
        if let Some(p) = self.port_index {
            write!(f, "[{}]", p)?;
        }
        Ok(())
    }
}

// ── Errors ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExpandError {
    #[error("{0}")]
    Resolve(#[from] ResolveError),
    #[error("cannot resolve width of '{site}': {reason}")]
    Width {
        site: String,
        reason: UnresolvedWidth,
    },
}

// ── Expansion ────────────────────────────────────────────────────────────

/// Expand a variable reference into its ordered leaves.
pub fn expand_var(
    model: &Model,
    reactor: &Reactor,
    var: &VarRef,
    ctx: &dyn WidthContext,
) -> Result<Vec<Leaf>, ExpandError> {
    let resolved = resolve_var(model, reactor, var)?;
    expand_resolved(&resolved, var, ctx)
}

/// Expand an already-resolved reference. Bank index varies slower than
/// port index: for a bank of width b over a multiport of width w, the
/// leaves are (0,0), (0,1), .., (0,w-1), (1,0), .., (b-1,w-1).
pub fn expand_resolved(
    resolved: &ResolvedVar<'_>,
    var: &VarRef,
    ctx: &dyn WidthContext,
) -> Result<Vec<Leaf>, ExpandError> {
    let bank_width = match resolved.instance {
        Some(instance) => match &instance.width {
            Some(spec) => Some(resolve_width(spec, ctx).map_err(|reason| ExpandError::Width {
                site: instance.name.clone(),
                reason,
            })?),
            None => None,
        },
        None => None,
    };
    let port_width = match &resolved.target {
        VarTarget::Port(port) => match &port.width {
            Some(spec) => Some(resolve_width(spec, ctx).map_err(|reason| ExpandError::Width {
                site: var.to_string(),
                reason,
            })?),
            None => None,
        },
        // Actions and timers are always scalar.
        VarTarget::Action(_) | VarTarget::Timer(_) => None,
    };

    if bank_width.is_none() && port_width.is_none() {
        return Ok(vec![Leaf::scalar(var)]);
    }

    let banks = bank_width.unwrap_or(1);
    let ports = port_width.unwrap_or(1);
    let mut leaves = Vec::with_capacity(banks as usize * ports as usize);
    for b in 0..banks {
        for p in 0..ports {
            leaves.push(Leaf {
                instance: var.container.clone(),
                instance_index: bank_width.map(|_| b),
                name: var.name.clone(),
                port_index: port_width.map(|_| p),
            });
        }
    }
    Ok(leaves)
}
