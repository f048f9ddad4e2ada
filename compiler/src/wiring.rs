//! Wiring program — the target-agnostic assembly artifact.
//!
//! `WiringProgram` is a self-contained, pre-resolved description of one
//! reactor's startup wiring. Backend renderers read it and emit their own
//! syntax without consulting the structural model or any upstream phase;
//! the runtime binder pairs bind vectors with [`pair_bindings`].
//!
//! Immutable once built; operation order is load-bearing (reaction
//! declaration order, then connection declaration order).

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::expand::Leaf;
use crate::id::{ConnectionId, ReactionId};
use crate::time::TimeValue;

// ── Operations ───────────────────────────────────────────────────────────

/// One elementary wiring operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Op {
    DeclareTrigger {
        reaction: ReactionId,
        target: Leaf,
    },
    DeclareStartupTrigger {
        reaction: ReactionId,
    },
    DeclareShutdownTrigger {
        reaction: ReactionId,
    },
    DeclareTimerTrigger {
        reaction: ReactionId,
        timer: String,
    },
    DeclareDependency {
        reaction: ReactionId,
        target: Leaf,
    },
    DeclareAntidependency {
        reaction: ReactionId,
        target: Leaf,
    },
    DeclareSchedulableAction {
        reaction: ReactionId,
        action: Leaf,
    },
    SetDeadline {
        reaction: ReactionId,
        delay: TimeValue,
        handler: String,
    },
    BindPort {
        connection: ConnectionId,
        left: Leaf,
        right: Leaf,
    },
    BindPortVector {
        connection: ConnectionId,
        left: Vec<Leaf>,
        right: Vec<Leaf>,
        iterated: bool,
    },
}

impl Op {
    /// The reaction a declaration-scoped operation belongs to; `None` for
    /// connection bindings.
    pub fn reaction(&self) -> Option<ReactionId> {
        match self {
            Op::DeclareTrigger { reaction, .. }
            | Op::DeclareStartupTrigger { reaction }
            | Op::DeclareShutdownTrigger { reaction }
            | Op::DeclareTimerTrigger { reaction, .. }
            | Op::DeclareDependency { reaction, .. }
            | Op::DeclareAntidependency { reaction, .. }
            | Op::DeclareSchedulableAction { reaction, .. }
            | Op::SetDeadline { reaction, .. } => Some(*reaction),
            Op::BindPort { .. } | Op::BindPortVector { .. } => None,
        }
    }
}

// ── Program ──────────────────────────────────────────────────────────────

/// The ordered wiring program for one reactor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WiringProgram {
    pub reactor: String,
    pub type_params: Vec<String>,
    /// Reaction names in declaration order; `ReactionId` indexes into this.
    pub reactions: Vec<String>,
    pub connection_count: usize,
    pub ops: Vec<Op>,
}

impl WiringProgram {
    pub fn reaction_name(&self, id: ReactionId) -> &str {
        self.reactions
            .get(id.0 as usize)
            .map(String::as_str)
            .unwrap_or("?")
    }

    /// Pretty JSON rendering for tooling.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// SHA-256 over the canonical `Display` rendering. Structurally
    /// identical inputs produce identical fingerprints across runs.
    pub fn fingerprint(&self) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(self.to_string().as_bytes());
        let result = hasher.finalize();
        let mut hash = [0u8; 32];
        hash.copy_from_slice(&result);
        hash
    }

    /// Hex string of the fingerprint (64 characters).
    pub fn fingerprint_hex(&self) -> String {
        let mut s = String::with_capacity(64);
        for b in self.fingerprint() {
            use std::fmt::Write;
            let _ = write!(s, "{:02x}", b);
        }
        s
    }
}

// ── Bind pairing ─────────────────────────────────────────────────────────

/// The canonical pairing rule for a bind vector.
///
/// Non-iterated: positional pairing; the builder guarantees equal lengths,
/// and unequal inputs pair up to the shorter side. Iterated: the shorter
/// side is reused cyclically until the longer side is exhausted. Either
/// side empty pairs nothing.
pub fn pair_bindings<'a>(
    left: &'a [Leaf],
    right: &'a [Leaf],
    iterated: bool,
) -> Vec<(&'a Leaf, &'a Leaf)> {
    if left.is_empty() || right.is_empty() {
        return Vec::new();
    }
    let count = if iterated {
        left.len().max(right.len())
    } else {
        left.len().min(right.len())
    };
    (0..count)
        .map(|i| (&left[i % left.len()], &right[i % right.len()]))
        .collect()
}

// ── Verification ─────────────────────────────────────────────────────────

/// Machine-checkable evidence for a stage's postconditions.
pub trait StageCert {
    fn all_pass(&self) -> bool;
    fn obligations(&self) -> Vec<(&'static str, bool)>;
}

/// Evidence for wiring postconditions (W1-W3).
#[derive(Debug, Clone)]
pub struct WiringCert {
    /// W1: reaction-scoped operations are grouped in declaration order and
    /// precede all connection bindings.
    pub w1_reaction_order: bool,
    /// W2: each `SetDeadline` is the last operation of its reaction.
    pub w2_deadline_placement: bool,
    /// W3: every non-iterated bind vector has sides of equal length.
    pub w3_vector_lengths: bool,
}

impl StageCert for WiringCert {
    fn all_pass(&self) -> bool {
        self.w1_reaction_order && self.w2_deadline_placement && self.w3_vector_lengths
    }

    fn obligations(&self) -> Vec<(&'static str, bool)> {
        vec![
            ("W1_reaction_order", self.w1_reaction_order),
            ("W2_deadline_placement", self.w2_deadline_placement),
            ("W3_vector_lengths", self.w3_vector_lengths),
        ]
    }
}

/// Verify wiring postconditions.
pub fn verify_wiring(program: &WiringProgram) -> WiringCert {
    let mut w1 = true;
    let mut w3 = true;
    let mut last_reaction: Option<ReactionId> = None;
    let mut seen_bind = false;
    let mut deadline_at: HashMap<ReactionId, usize> = HashMap::new();
    let mut last_op_at: HashMap<ReactionId, usize> = HashMap::new();

    for (idx, op) in program.ops.iter().enumerate() {
        match op.reaction() {
            Some(reaction) => {
                if seen_bind {
                    w1 = false;
                }
                if last_reaction.is_some_and(|prev| reaction < prev) {
                    w1 = false;
                }
                last_reaction = Some(reaction);
                last_op_at.insert(reaction, idx);
                if matches!(op, Op::SetDeadline { .. }) {
                    deadline_at.insert(reaction, idx);
                }
            }
            None => {
                seen_bind = true;
                if let Op::BindPortVector {
                    left,
                    right,
                    iterated: false,
                    ..
                } = op
                {
                    if left.len() != right.len() {
                        w3 = false;
                    }
                }
            }
        }
    }

    let w2 = deadline_at
        .iter()
        .all(|(reaction, idx)| last_op_at.get(reaction) == Some(idx));

    WiringCert {
        w1_reaction_order: w1,
        w2_deadline_placement: w2,
        w3_vector_lengths: w3,
    }
}

// ── Display ──────────────────────────────────────────────────────────────

impl fmt::Display for WiringProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "wiring '{}'", self.reactor)?;
        if !self.type_params.is_empty() {
            write!(f, "<{}>", self.type_params.join(", "))?;
        }
        writeln!(
            f,
            " ({} reactions, {} connections)",
            self.reactions.len(),
            self.connection_count
        )?;

        let mut current: Option<ReactionId> = None;
        let mut in_connections = false;
        for op in &self.ops {
            match op.reaction() {
                Some(reaction) => {
                    if current != Some(reaction) {
                        writeln!(f, "  {} '{}':", reaction, self.reaction_name(reaction))?;
                        current = Some(reaction);
                    }
                    write!(f, "    ")?;
                    fmt_reaction_op(f, op)?;
                }
                None => {
                    if !in_connections {
                        writeln!(f, "  connections:")?;
                        in_connections = true;
                    }
                    write!(f, "    ")?;
                    fmt_bind_op(f, op)?;
                }
            }
        }
        Ok(())
    }
}

fn fmt_reaction_op(f: &mut fmt::Formatter<'_>, op: &Op) -> fmt::Result {
    match op {
        Op::DeclareTrigger { target, .. } => writeln!(f, "declare_trigger {}", target),
        Op::DeclareStartupTrigger { .. } => writeln!(f, "declare_trigger startup"),
        Op::DeclareShutdownTrigger { .. } => writeln!(f, "declare_trigger shutdown"),
        Op::DeclareTimerTrigger { timer, .. } => writeln!(f, "declare_trigger timer {}", timer),
        Op::DeclareDependency { target, .. } => writeln!(f, "declare_dependency {}", target),
        Op::DeclareAntidependency { target, .. } => {
            writeln!(f, "declare_antidependency {}", target)
        }
        Op::DeclareSchedulableAction { action, .. } => {
            writeln!(f, "declare_schedulable_action {}", action)
        }
        Op::SetDeadline { delay, handler, .. } => {
            writeln!(f, "set_deadline {} -> {}", delay, handler)
        }
        Op::BindPort { .. } | Op::BindPortVector { .. } => unreachable!("not a reaction op"),
    }
}

fn fmt_bind_op(f: &mut fmt::Formatter<'_>, op: &Op) -> fmt::Result {
    match op {
        Op::BindPort {
            connection,
            left,
            right,
        } => writeln!(f, "{}: bind {} -> {}", connection, left, right),
        Op::BindPortVector {
            connection,
            left,
            right,
            iterated,
        } => {
            write!(f, "{}: bind_vector", connection)?;
            if *iterated {
                write!(f, " iterated")?;
            }
            writeln!(f, " [{}] -> [{}]", join_leaves(left), join_leaves(right))
        }
        _ => unreachable!("not a bind op"),
    }
}

fn join_leaves(leaves: &[Leaf]) -> String {
    leaves
        .iter()
        .map(Leaf::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(name: &str, port_index: Option<u32>) -> Leaf {
        Leaf {
            instance: None,
            instance_index: None,
            name: name.into(),
            port_index,
        }
    }

    fn indexed(name: &str, indices: &[u32]) -> Vec<Leaf> {
        indices.iter().map(|&i| leaf(name, Some(i))).collect()
    }

    // ── Pairing ─────────────────────────────────────────────────────────

    #[test]
    fn pairing_equal_lengths_is_positional() {
        let left = indexed("out", &[0, 1, 2]);
        let right = indexed("in", &[0, 1, 2]);
        let pairs = pair_bindings(&left, &right, false);
        assert_eq!(pairs.len(), 3);
        for (i, (l, r)) in pairs.iter().enumerate() {
            assert_eq!(l.port_index, Some(i as u32));
            assert_eq!(r.port_index, Some(i as u32));
        }
    }

    #[test]
    fn iterated_pairing_wraps_the_shorter_side() {
        let left = indexed("out", &[0, 1, 2, 3, 4]);
        let right = indexed("in", &[0, 1]);
        let pairs = pair_bindings(&left, &right, true);
        let rights: Vec<u32> = pairs.iter().map(|(_, r)| r.port_index.unwrap()).collect();
        assert_eq!(rights, [0, 1, 0, 1, 0]);
        let lefts: Vec<u32> = pairs.iter().map(|(l, _)| l.port_index.unwrap()).collect();
        assert_eq!(lefts, [0, 1, 2, 3, 4]);
    }

    #[test]
    fn iterated_pairing_wraps_left_when_right_is_longer() {
        let left = indexed("out", &[0, 1]);
        let right = indexed("in", &[0, 1, 2]);
        let pairs = pair_bindings(&left, &right, true);
        let lefts: Vec<u32> = pairs.iter().map(|(l, _)| l.port_index.unwrap()).collect();
        assert_eq!(lefts, [0, 1, 0]);
    }

    #[test]
    fn empty_side_pairs_nothing() {
        let left = indexed("out", &[0, 1]);
        assert!(pair_bindings(&left, &[], true).is_empty());
        assert!(pair_bindings(&[], &left, false).is_empty());
    }

    // ── Verification ────────────────────────────────────────────────────

    fn program(ops: Vec<Op>) -> WiringProgram {
        WiringProgram {
            reactor: "Main".into(),
            type_params: Vec::new(),
            reactions: vec!["first".into(), "second".into()],
            connection_count: 1,
            ops,
        }
    }

    #[test]
    fn cert_passes_for_well_ordered_program() {
        let p = program(vec![
            Op::DeclareTrigger {
                reaction: ReactionId(0),
                target: leaf("in", None),
            },
            Op::SetDeadline {
                reaction: ReactionId(0),
                delay: TimeValue::ms(1),
                handler: "late".into(),
            },
            Op::DeclareStartupTrigger {
                reaction: ReactionId(1),
            },
            Op::BindPort {
                connection: ConnectionId(0),
                left: leaf("out", None),
                right: leaf("in", None),
            },
        ]);
        let cert = verify_wiring(&p);
        assert!(cert.all_pass(), "{:?}", cert.obligations());
    }

    #[test]
    fn cert_flags_reaction_order_violation() {
        let p = program(vec![
            Op::DeclareStartupTrigger {
                reaction: ReactionId(1),
            },
            Op::DeclareStartupTrigger {
                reaction: ReactionId(0),
            },
        ]);
        assert!(!verify_wiring(&p).w1_reaction_order);
    }

    #[test]
    fn cert_flags_declaration_after_bind() {
        let p = program(vec![
            Op::BindPort {
                connection: ConnectionId(0),
                left: leaf("out", None),
                right: leaf("in", None),
            },
            Op::DeclareStartupTrigger {
                reaction: ReactionId(0),
            },
        ]);
        assert!(!verify_wiring(&p).w1_reaction_order);
    }

    #[test]
    fn cert_flags_misplaced_deadline() {
        let p = program(vec![
            Op::SetDeadline {
                reaction: ReactionId(0),
                delay: TimeValue::ms(1),
                handler: "late".into(),
            },
            Op::DeclareTrigger {
                reaction: ReactionId(0),
                target: leaf("in", None),
            },
        ]);
        assert!(!verify_wiring(&p).w2_deadline_placement);
    }

    #[test]
    fn cert_flags_unbalanced_vector() {
        let p = program(vec![Op::BindPortVector {
            connection: ConnectionId(0),
            left: indexed("out", &[0, 1, 2]),
            right: indexed("in", &[0, 1]),
            iterated: false,
        }]);
        assert!(!verify_wiring(&p).w3_vector_lengths);
    }

    #[test]
    fn iterated_vector_tolerates_unequal_lengths() {
        let p = program(vec![Op::BindPortVector {
            connection: ConnectionId(0),
            left: indexed("out", &[0, 1, 2]),
            right: indexed("in", &[0, 1]),
            iterated: true,
        }]);
        assert!(verify_wiring(&p).w3_vector_lengths);
    }

    // ── Display and fingerprint ─────────────────────────────────────────

    #[test]
    fn display_groups_by_reaction_then_connections() {
        let p = program(vec![
            Op::DeclareTrigger {
                reaction: ReactionId(0),
                target: leaf("in", None),
            },
            Op::DeclareAntidependency {
                reaction: ReactionId(0),
                target: leaf("out", None),
            },
            Op::DeclareTimerTrigger {
                reaction: ReactionId(1),
                timer: "tick".into(),
            },
            Op::BindPort {
                connection: ConnectionId(0),
                left: leaf("out", None),
                right: leaf("in", None),
            },
        ]);
        let expected = "\
wiring 'Main' (2 reactions, 1 connections)
  r0 'first':
    declare_trigger in
    declare_antidependency out
  r1 'second':
    declare_trigger timer tick
  connections:
    c0: bind out -> in
";
        assert_eq!(p.to_string(), expected);
    }

    #[test]
    fn display_renders_type_params() {
        let mut p = program(vec![]);
        p.type_params = vec!["T".into(), "U".into()];
        assert!(p
            .to_string()
            .starts_with("wiring 'Main'<T, U> (2 reactions, 1 connections)"));
    }

    #[test]
    fn fingerprint_tracks_content() {
        let a = program(vec![Op::DeclareStartupTrigger {
            reaction: ReactionId(0),
        }]);
        let b = program(vec![Op::DeclareStartupTrigger {
            reaction: ReactionId(0),
        }]);
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_eq!(a.fingerprint_hex().len(), 64);

        let c = program(vec![Op::DeclareShutdownTrigger {
            reaction: ReactionId(0),
        }]);
        assert_ne!(a.fingerprint(), c.fingerprint());
    }
}
