// model.rs — Structural reactor model
//
// In-memory representation of reactor definitions as handed over by the
// frontend (or deserialized from a model document). Mirrors the declaration
// structure of the source: every list is in declaration order, and reaction
// order is significant — it fixes emitted operation order and, transitively,
// tie-breaking priority in the runtime scheduler.
//
// Preconditions: produced well-typed by the frontend.
// Postconditions: read-only during assembly; nothing here mutates.
// Failure modes: none (data-only module).
// Side effects: none.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::time::TimeValue;

// ── Model root ──

/// A set of reactor definitions compiled together. Instances reference
/// their class by name, so contained-port lookups go through the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Model {
    pub reactors: Vec<Reactor>,
}

impl Model {
    pub fn reactor(&self, name: &str) -> Option<&Reactor> {
        self.reactors.iter().find(|r| r.name == name)
    }
}

// ── Reactor ──

/// One reactor definition: ports, actions, timers, sub-reactor instances,
/// reactions, and connections, all in declaration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reactor {
    pub name: String,
    #[serde(default)]
    pub type_params: Vec<String>,
    #[serde(default)]
    pub ports: Vec<Port>,
    #[serde(default)]
    pub actions: Vec<Action>,
    #[serde(default)]
    pub timers: Vec<Timer>,
    #[serde(default)]
    pub instances: Vec<Instance>,
    #[serde(default)]
    pub reactions: Vec<Reaction>,
    #[serde(default)]
    pub connections: Vec<Connection>,
}

impl Reactor {
    pub fn new(name: impl Into<String>) -> Self {
        Reactor {
            name: name.into(),
            type_params: Vec::new(),
            ports: Vec::new(),
            actions: Vec::new(),
            timers: Vec::new(),
            instances: Vec::new(),
            reactions: Vec::new(),
            connections: Vec::new(),
        }
    }

    pub fn port(&self, name: &str) -> Option<&Port> {
        self.ports.iter().find(|p| p.name == name)
    }

    pub fn action(&self, name: &str) -> Option<&Action> {
        self.actions.iter().find(|a| a.name == name)
    }

    pub fn timer(&self, name: &str) -> Option<&Timer> {
        self.timers.iter().find(|t| t.name == name)
    }

    pub fn instance(&self, name: &str) -> Option<&Instance> {
        self.instances.iter().find(|i| i.name == name)
    }
}

// ── Ports ──

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortDirection {
    Input,
    Output,
}

/// A typed communication endpoint. A width spec makes it a multiport; its
/// absence means a scalar port.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Port {
    pub name: String,
    pub direction: PortDirection,
    /// Element type, opaque to the assembler (target-typed upstream).
    pub data_type: String,
    #[serde(default)]
    pub width: Option<WidthSpec>,
}

impl Port {
    pub fn input(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Port {
            name: name.into(),
            direction: PortDirection::Input,
            data_type: data_type.into(),
            width: None,
        }
    }

    pub fn output(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Port {
            name: name.into(),
            direction: PortDirection::Output,
            data_type: data_type.into(),
            width: None,
        }
    }

    pub fn with_width(mut self, width: WidthSpec) -> Self {
        self.width = Some(width);
        self
    }
}

// ── Actions ──

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionOrigin {
    Logical,
    Physical,
}

/// A schedulable event source. Always scalar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub name: String,
    pub origin: ActionOrigin,
    #[serde(default)]
    pub min_delay: Option<TimeValue>,
}

impl Action {
    pub fn logical(name: impl Into<String>) -> Self {
        Action {
            name: name.into(),
            origin: ActionOrigin::Logical,
            min_delay: None,
        }
    }

    pub fn physical(name: impl Into<String>) -> Self {
        Action {
            name: name.into(),
            origin: ActionOrigin::Physical,
            min_delay: None,
        }
    }

    pub fn with_min_delay(mut self, delay: TimeValue) -> Self {
        self.min_delay = Some(delay);
        self
    }
}

// ── Timers ──

/// A periodic trigger source: first fires at `offset`, then every `period`.
/// A zero period means the timer fires once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timer {
    pub name: String,
    pub offset: TimeValue,
    pub period: TimeValue,
}

impl Timer {
    pub fn new(name: impl Into<String>, offset: TimeValue, period: TimeValue) -> Self {
        Timer {
            name: name.into(),
            offset,
            period,
        }
    }
}

// ── Instances ──

/// A sub-reactor placement. A width spec makes it a bank of identical
/// instances; its absence means a single instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instance {
    pub name: String,
    /// Name of the referenced reactor definition.
    pub class: String,
    #[serde(default)]
    pub width: Option<WidthSpec>,
}

impl Instance {
    pub fn new(name: impl Into<String>, class: impl Into<String>) -> Self {
        Instance {
            name: name.into(),
            class: class.into(),
            width: None,
        }
    }

    pub fn with_width(mut self, width: WidthSpec) -> Self {
        self.width = Some(width);
        self
    }

    pub fn is_bank(&self) -> bool {
        self.width.is_some()
    }
}

// ── Width specification ──

/// Declared multiplicity of a multiport or bank. Resolved to a concrete
/// integer by `width::resolve_width` before any expansion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WidthSpec {
    /// Fixed literal width.
    Fixed(u32),
    /// Width given by a named parameter of the instantiation context.
    Param(String),
    /// Width left for the frontend to infer; must be materialized before
    /// assembly, otherwise resolution reports it.
    Inferred,
}

// ── Variable references ──

/// A reference to a port, action, or timer, optionally qualified by the
/// containing instance. Carries no indices — indices exist only on
/// expansion leaves.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VarRef {
    #[serde(default)]
    pub container: Option<String>,
    pub name: String,
}

impl VarRef {
    /// Reference to a variable of the declaring reactor itself.
    pub fn local(name: impl Into<String>) -> Self {
        VarRef {
            container: None,
            name: name.into(),
        }
    }

    /// Reference to a port of a contained instance.
    pub fn contained(container: impl Into<String>, name: impl Into<String>) -> Self {
        VarRef {
            container: Some(container.into()),
            name: name.into(),
        }
    }
}

impl fmt::Display for VarRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.container {
            Some(container) => write!(f, "{}.{}", container, self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

/// What starts a reaction: a lifecycle marker or a variable reference.
/// A `Var` resolving to a timer is emitted as a fixed timer-trigger
/// operation, not expanded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerRef {
    Startup,
    Shutdown,
    Var(VarRef),
}

// ── Reactions ──

/// A unit of behavior: triggers start it, sources are read-only
/// dependencies, effects are written ports or scheduled actions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reaction {
    pub name: String,
    #[serde(default)]
    pub triggers: Vec<TriggerRef>,
    #[serde(default)]
    pub sources: Vec<VarRef>,
    #[serde(default)]
    pub effects: Vec<VarRef>,
    #[serde(default)]
    pub deadline: Option<Deadline>,
}

impl Reaction {
    pub fn new(name: impl Into<String>) -> Self {
        Reaction {
            name: name.into(),
            triggers: Vec::new(),
            sources: Vec::new(),
            effects: Vec::new(),
            deadline: None,
        }
    }

    pub fn triggered_by(mut self, trigger: TriggerRef) -> Self {
        self.triggers.push(trigger);
        self
    }

    pub fn reads(mut self, source: VarRef) -> Self {
        self.sources.push(source);
        self
    }

    pub fn writes(mut self, effect: VarRef) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn with_deadline(mut self, delay: TimeValue, handler: impl Into<String>) -> Self {
        self.deadline = Some(Deadline {
            delay,
            handler: handler.into(),
        });
        self
    }
}

/// A deadline on a reaction: maximum lag between logical and physical time
/// before the handler runs instead of the reaction body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deadline {
    pub delay: TimeValue,
    pub handler: String,
}

// ── Connections ──

/// One or more output→input bindings between variable references.
/// With `iterated` set, the shorter expanded side is reused cyclically to
/// match the longer one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    pub left: Vec<VarRef>,
    pub right: Vec<VarRef>,
    #[serde(default)]
    pub iterated: bool,
}

impl Connection {
    pub fn new(left: Vec<VarRef>, right: Vec<VarRef>, iterated: bool) -> Self {
        Connection {
            left,
            right,
            iterated,
        }
    }
}
