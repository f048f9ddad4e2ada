// width.rs — Width specification resolution
//
// Shared by the connection classifier and the replication expander.
// Resolves a declared WidthSpec to a concrete multiplicity against the
// instantiation context. Absence of a WidthSpec means a scalar (width 1)
// and is handled by callers without consulting the resolver.

use std::collections::HashMap;

use thiserror::Error;

use crate::model::WidthSpec;

/// The instantiation context consumed by width resolution.
pub trait WidthContext {
    /// Look up a width parameter by name. `None` if the parameter is not
    /// bound in this context.
    fn lookup_parameter(&self, name: &str) -> Option<i64>;
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnresolvedWidth {
    #[error("width parameter '{0}' is not bound in the instantiation context")]
    UnknownParameter(String),
    #[error("width parameter '{name}' evaluates to {value}, which is not a valid width")]
    InvalidParameter { name: String, value: i64 },
    #[error("width is inferred, but no inferred value was materialized for this site")]
    Inferred,
}

/// Resolve a width spec to a concrete non-negative multiplicity.
pub fn resolve_width(spec: &WidthSpec, ctx: &dyn WidthContext) -> Result<u32, UnresolvedWidth> {
    match spec {
        WidthSpec::Fixed(n) => Ok(*n),
        WidthSpec::Param(name) => {
            let value = ctx
                .lookup_parameter(name)
                .ok_or_else(|| UnresolvedWidth::UnknownParameter(name.clone()))?;
            u32::try_from(value).map_err(|_| UnresolvedWidth::InvalidParameter {
                name: name.clone(),
                value,
            })
        }
        WidthSpec::Inferred => Err(UnresolvedWidth::Inferred),
    }
}

/// Width of an optional spec: absence is a scalar.
pub fn resolve_optional_width(
    spec: Option<&WidthSpec>,
    ctx: &dyn WidthContext,
) -> Result<u32, UnresolvedWidth> {
    match spec {
        Some(spec) => resolve_width(spec, ctx),
        None => Ok(1),
    }
}

/// Name → value bindings for parameter-valued widths. Backs the CLI's
/// `--param NAME=VALUE` flags; the empty map is a valid context for models
/// with only fixed widths.
#[derive(Debug, Clone, Default)]
pub struct ParameterMap {
    bindings: HashMap<String, i64>,
}

impl ParameterMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: impl Into<String>, value: i64) {
        self.bindings.insert(name.into(), value);
    }

    pub fn with(mut self, name: impl Into<String>, value: i64) -> Self {
        self.set(name, value);
        self
    }
}

impl WidthContext for ParameterMap {
    fn lookup_parameter(&self, name: &str) -> Option<i64> {
        self.bindings.get(name).copied()
    }
}
