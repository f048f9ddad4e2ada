// resolve.rs — Variable reference resolution
//
// Resolves a VarRef against the structural model: local names against the
// declaring reactor, contained names against the instance's class. The
// result is a tagged target — Port, Action, or Timer — so downstream code
// matches on variants instead of probing kinds at runtime.
//
// Preconditions: `reactor` is a member of `model`.
// Postconditions: the resolved target borrows from the model.
// Failure modes: unknown instance, class, or variable names.
// Side effects: none.

use thiserror::Error;

use crate::model::{Action, Instance, Model, Port, Reactor, Timer, VarRef};

// ── Resolved targets ─────────────────────────────────────────────────────

/// The variable a reference ultimately names.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VarTarget<'a> {
    Port(&'a Port),
    Action(&'a Action),
    Timer(&'a Timer),
}

/// A resolved reference: the containing instance (if any) plus the target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedVar<'a> {
    pub instance: Option<&'a Instance>,
    pub target: VarTarget<'a>,
}

impl ResolvedVar<'_> {
    pub fn is_bank(&self) -> bool {
        self.instance.is_some_and(|i| i.is_bank())
    }

    pub fn is_multiport(&self) -> bool {
        matches!(self.target, VarTarget::Port(p) if p.width.is_some())
    }
}

// ── Errors ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("reference to undeclared instance '{0}'")]
    UnknownInstance(String),
    #[error("instance '{instance}' refers to undefined reactor class '{class}'")]
    UnknownClass { instance: String, class: String },
    #[error("reference to undeclared variable '{0}'")]
    UnknownVariable(String),
}

// ── Resolution ───────────────────────────────────────────────────────────

/// Resolve a variable reference in the context of `reactor`.
///
/// A contained reference (`instance.port`) sees only the ports of the
/// instance's class; actions and timers are private to their reactor.
pub fn resolve_var<'a>(
    model: &'a Model,
    reactor: &'a Reactor,
    var: &VarRef,
) -> Result<ResolvedVar<'a>, ResolveError> {
    match &var.container {
        Some(container) => {
            let instance = reactor
                .instance(container)
                .ok_or_else(|| ResolveError::UnknownInstance(container.clone()))?;
            let class = model
                .reactor(&instance.class)
                .ok_or_else(|| ResolveError::UnknownClass {
                    instance: instance.name.clone(),
                    class: instance.class.clone(),
                })?;
            let port = class.port(&var.name).ok_or_else(|| {
                ResolveError::UnknownVariable(format!("{}.{}", container, var.name))
            })?;
            Ok(ResolvedVar {
                instance: Some(instance),
                target: VarTarget::Port(port),
            })
        }
        None => {
            if let Some(port) = reactor.port(&var.name) {
                return Ok(ResolvedVar {
                    instance: None,
                    target: VarTarget::Port(port),
                });
            }
            if let Some(action) = reactor.action(&var.name) {
                return Ok(ResolvedVar {
                    instance: None,
                    target: VarTarget::Action(action),
                });
            }
            if let Some(timer) = reactor.timer(&var.name) {
                return Ok(ResolvedVar {
                    instance: None,
                    target: VarTarget::Timer(timer),
                });
            }
            Err(ResolveError::UnknownVariable(var.name.clone()))
        }
    }
}
