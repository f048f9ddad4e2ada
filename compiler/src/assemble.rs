// assemble.rs — Wiring graph construction
//
// Walks one reactor's reactions and connections in declaration order and
// emits the elementary operations that establish its dependency graph:
// trigger/dependency/antidependency/schedulable-action declarations,
// deadline registration, and port bindings. Errors go to the diagnostics
// sink and processing continues past them, so a single pass surfaces every
// problem; a reactor with any error yields no wiring program.
//
// Preconditions: `reactor` is a member of `model`.
// Postconditions: a returned program satisfies `wiring::verify_wiring`.
// Failure modes: unresolved widths, undeclared references, invalid effect
//                targets, replication length mismatches, empty sides.
// Side effects: reports to the diagnostics sink.

use crate::classify::{classify, ConnectionShape};
use crate::diag::{codes, DiagCode, DiagLevel, DiagSink, Diagnostic, Location};
use crate::expand::{expand_resolved, expand_var, ExpandError, Leaf};
use crate::id::{ConnectionId, ReactionId};
use crate::model::{Connection, Model, Reaction, Reactor, TriggerRef, VarRef};
use crate::resolve::{resolve_var, VarTarget};
use crate::width::WidthContext;
use crate::wiring::{Op, WiringProgram};

// ── Public entry points ──────────────────────────────────────────────────

/// Assemble the wiring program for one reactor. Returns `None` if any
/// error was reported; the partial operation sequence is discarded.
pub fn assemble(
    model: &Model,
    reactor: &Reactor,
    ctx: &dyn WidthContext,
    sink: &dyn DiagSink,
) -> Option<WiringProgram> {
    let mut asm = Assembler {
        model,
        reactor,
        ctx,
        sink,
        ops: Vec::new(),
        errors: 0,
    };
    asm.assemble_reactions();
    asm.assemble_connections();
    asm.finish()
}

/// Assemble every reactor of a model. Reactors are independent; an errored
/// reactor is skipped in the result and its diagnostics stay in the sink.
pub fn assemble_model(
    model: &Model,
    ctx: &dyn WidthContext,
    sink: &dyn DiagSink,
) -> Vec<WiringProgram> {
    model
        .reactors
        .iter()
        .filter_map(|reactor| assemble(model, reactor, ctx, sink))
        .collect()
}

// ── Assembler ────────────────────────────────────────────────────────────

struct Assembler<'a> {
    model: &'a Model,
    reactor: &'a Reactor,
    ctx: &'a dyn WidthContext,
    sink: &'a dyn DiagSink,
    ops: Vec<Op>,
    errors: usize,
}

impl<'a> Assembler<'a> {
    fn error(&mut self, code: DiagCode, message: String, location: Location) {
        self.errors += 1;
        self.sink.report(
            Diagnostic::new(DiagLevel::Error, message)
                .with_code(code)
                .at(location),
        );
    }

    fn expand_error(&mut self, location: Location, err: ExpandError) {
        let code = match &err {
            ExpandError::Resolve(_) => codes::UNDECLARED_REFERENCE,
            ExpandError::Width { .. } => codes::UNRESOLVED_WIDTH,
        };
        self.error(code, err.to_string(), location);
    }

    fn at_reaction(&self, id: ReactionId) -> Location {
        Location::Reaction(self.reactor.name.clone(), id)
    }

    fn at_connection(&self, id: ConnectionId) -> Location {
        Location::Connection(self.reactor.name.clone(), id)
    }

    // ── Reactions ───────────────────────────────────────────────────────

    fn assemble_reactions(&mut self) {
        for (index, reaction) in self.reactor.reactions.iter().enumerate() {
            self.assemble_reaction(ReactionId(index as u32), reaction);
        }
    }

    fn assemble_reaction(&mut self, id: ReactionId, reaction: &Reaction) {
        for trigger in &reaction.triggers {
            self.declare_trigger(id, trigger);
        }
        for source in &reaction.sources {
            self.declare_dependency(id, source);
        }
        for effect in &reaction.effects {
            self.declare_effect(id, effect);
        }
        if let Some(deadline) = &reaction.deadline {
            self.ops.push(Op::SetDeadline {
                reaction: id,
                delay: deadline.delay,
                handler: deadline.handler.clone(),
            });
        }
    }

    fn declare_trigger(&mut self, id: ReactionId, trigger: &TriggerRef) {
        match trigger {
            TriggerRef::Startup => self.ops.push(Op::DeclareStartupTrigger { reaction: id }),
            TriggerRef::Shutdown => self.ops.push(Op::DeclareShutdownTrigger { reaction: id }),
            TriggerRef::Var(var) => {
                let resolved = match resolve_var(self.model, self.reactor, var) {
                    Ok(resolved) => resolved,
                    Err(err) => {
                        let location = self.at_reaction(id);
                        self.error(codes::UNDECLARED_REFERENCE, err.to_string(), location);
                        return;
                    }
                };
                // Timers are fixed markers, never expanded.
                if let VarTarget::Timer(timer) = &resolved.target {
                    self.ops.push(Op::DeclareTimerTrigger {
                        reaction: id,
                        timer: timer.name.clone(),
                    });
                    return;
                }
                match expand_resolved(&resolved, var, self.ctx) {
                    Ok(leaves) => {
                        for target in leaves {
                            self.ops.push(Op::DeclareTrigger {
                                reaction: id,
                                target,
                            });
                        }
                    }
                    Err(err) => {
                        let location = self.at_reaction(id);
                        self.expand_error(location, err);
                    }
                }
            }
        }
    }

    fn declare_dependency(&mut self, id: ReactionId, source: &VarRef) {
        match expand_var(self.model, self.reactor, source, self.ctx) {
            Ok(leaves) => {
                for target in leaves {
                    self.ops.push(Op::DeclareDependency {
                        reaction: id,
                        target,
                    });
                }
            }
            Err(err) => {
                let location = self.at_reaction(id);
                self.expand_error(location, err);
            }
        }
    }

    fn declare_effect(&mut self, id: ReactionId, effect: &VarRef) {
        let resolved = match resolve_var(self.model, self.reactor, effect) {
            Ok(resolved) => resolved,
            Err(err) => {
                let location = self.at_reaction(id);
                self.error(codes::UNDECLARED_REFERENCE, err.to_string(), location);
                return;
            }
        };
        // An effect is classified exactly once, by the kind of the variable
        // it ultimately names.
        match &resolved.target {
            VarTarget::Action(_) => self.ops.push(Op::DeclareSchedulableAction {
                reaction: id,
                action: Leaf::scalar(effect),
            }),
            VarTarget::Port(_) => match expand_resolved(&resolved, effect, self.ctx) {
                Ok(leaves) => {
                    for target in leaves {
                        self.ops.push(Op::DeclareAntidependency {
                            reaction: id,
                            target,
                        });
                    }
                }
                Err(err) => {
                    let location = self.at_reaction(id);
                    self.expand_error(location, err);
                }
            },
            VarTarget::Timer(_) => {
                let location = self.at_reaction(id);
                self.error(
                    codes::INVALID_EFFECT_TARGET,
                    format!(
                        "effect '{}' names a timer; only ports and actions can be effects",
                        effect
                    ),
                    location,
                );
            }
        }
    }

    // ── Connections ─────────────────────────────────────────────────────

    fn assemble_connections(&mut self) {
        for (index, connection) in self.reactor.connections.iter().enumerate() {
            self.assemble_connection(ConnectionId(index as u32), connection);
        }
    }

    fn assemble_connection(&mut self, id: ConnectionId, connection: &Connection) {
        // Reference lists are non-empty by model invariant; report instead
        // of indexing blind if a malformed model slips through.
        if connection.left.is_empty() || connection.right.is_empty() {
            let location = self.at_connection(id);
            self.error(
                codes::EMPTY_REPLICATION_SIDE,
                "connection has a side with no references".into(),
                location,
            );
            return;
        }
        match classify(self.model, self.reactor, connection) {
            ConnectionShape::Simple => self.bind_simple(id, connection),
            ConnectionShape::Replicated => self.bind_vector(id, connection),
        }
    }

    fn bind_simple(&mut self, id: ConnectionId, connection: &Connection) {
        let mut ok = true;
        for var in connection.left.iter().chain(connection.right.iter()) {
            if let Err(err) = resolve_var(self.model, self.reactor, var) {
                let location = self.at_connection(id);
                self.error(codes::UNDECLARED_REFERENCE, err.to_string(), location);
                ok = false;
            }
        }
        if !ok {
            return;
        }
        self.ops.push(Op::BindPort {
            connection: id,
            left: Leaf::scalar(&connection.left[0]),
            right: Leaf::scalar(&connection.right[0]),
        });
    }

    fn expand_side(&mut self, id: ConnectionId, vars: &[VarRef]) -> Option<Vec<Leaf>> {
        let mut leaves = Vec::new();
        let mut ok = true;
        for var in vars {
            match expand_var(self.model, self.reactor, var, self.ctx) {
                Ok(mut expanded) => leaves.append(&mut expanded),
                Err(err) => {
                    let location = self.at_connection(id);
                    self.expand_error(location, err);
                    ok = false;
                }
            }
        }
        ok.then_some(leaves)
    }

    fn bind_vector(&mut self, id: ConnectionId, connection: &Connection) {
        let left = self.expand_side(id, &connection.left);
        let right = self.expand_side(id, &connection.right);
        let (Some(left), Some(right)) = (left, right) else {
            return;
        };

        // Both sides width zero: nothing to bind, nothing to report.
        if left.is_empty() && right.is_empty() {
            return;
        }
        if left.is_empty() || right.is_empty() {
            let (empty, occupied, count) = if left.is_empty() {
                ("left", "right", right.len())
            } else {
                ("right", "left", left.len())
            };
            let location = self.at_connection(id);
            self.error(
                codes::EMPTY_REPLICATION_SIDE,
                format!(
                    "{} side of the connection expands to zero ports while the {} side has {}",
                    empty, occupied, count
                ),
                location,
            );
            return;
        }
        if !connection.iterated && left.len() != right.len() {
            let location = self.at_connection(id);
            self.error(
                codes::REPLICATION_LENGTH_MISMATCH,
                format!(
                    "connection joins {} ports on the left to {} on the right; \
                     sides of a non-iterated connection must have equal width",
                    left.len(),
                    right.len()
                ),
                location,
            );
            return;
        }
        self.ops.push(Op::BindPortVector {
            connection: id,
            left,
            right,
            iterated: connection.iterated,
        });
    }

    // ── Result ──────────────────────────────────────────────────────────

    fn finish(self) -> Option<WiringProgram> {
        if self.errors > 0 {
            return None;
        }
        Some(WiringProgram {
            reactor: self.reactor.name.clone(),
            type_params: self.reactor.type_params.clone(),
            reactions: self
                .reactor
                .reactions
                .iter()
                .map(|r| r.name.clone())
                .collect(),
            connection_count: self.reactor.connections.len(),
            ops: self.ops,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diag::DiagnosticBag;
    use crate::model::{Action, Instance, Port, Timer, WidthSpec};
    use crate::time::TimeValue;
    use crate::width::ParameterMap;
    use crate::wiring::{verify_wiring, StageCert};

    fn assemble_ok(model: &Model, reactor: &str) -> WiringProgram {
        let bag = DiagnosticBag::new();
        let reactor = model.reactor(reactor).unwrap();
        let program = assemble(model, reactor, &ParameterMap::new(), &bag);
        assert!(
            !bag.has_errors(),
            "unexpected diagnostics: {:#?}",
            bag.snapshot()
        );
        program.expect("no wiring program produced")
    }

    fn assemble_err(model: &Model, reactor: &str) -> Vec<Diagnostic> {
        let bag = DiagnosticBag::new();
        let reactor = model.reactor(reactor).unwrap();
        let program = assemble(model, reactor, &ParameterMap::new(), &bag);
        assert!(program.is_none(), "expected an invalid wiring program");
        bag.snapshot()
    }

    /// Reactor pair from the end-to-end scenario: Main has a scalar relay
    /// reaction, a timer reaction, and one scalar connection into a child.
    fn scenario_model() -> Model {
        let mut child = Reactor::new("Child");
        child.ports.push(Port::input("in2", "int"));

        let mut main = Reactor::new("Main");
        main.ports.push(Port::input("in", "int"));
        main.ports.push(Port::output("out", "int"));
        main.timers
            .push(Timer::new("t", TimeValue::ZERO, TimeValue::sec(1)));
        main.instances.push(Instance::new("sink", "Child"));
        main.reactions.push(
            Reaction::new("relay")
                .triggered_by(TriggerRef::Var(VarRef::local("in")))
                .writes(VarRef::local("out")),
        );
        main.reactions
            .push(Reaction::new("tick").triggered_by(TriggerRef::Var(VarRef::local("t"))));
        main.connections.push(Connection::new(
            vec![VarRef::local("out")],
            vec![VarRef::contained("sink", "in2")],
            false,
        ));
        Model {
            reactors: vec![main, child],
        }
    }

    // ── End-to-end scenario ─────────────────────────────────────────────

    #[test]
    fn end_to_end_scenario_op_sequence() {
        let model = scenario_model();
        let program = assemble_ok(&model, "Main");
        assert_eq!(
            program.ops,
            vec![
                Op::DeclareTrigger {
                    reaction: ReactionId(0),
                    target: Leaf::scalar(&VarRef::local("in")),
                },
                Op::DeclareAntidependency {
                    reaction: ReactionId(0),
                    target: Leaf::scalar(&VarRef::local("out")),
                },
                Op::DeclareTimerTrigger {
                    reaction: ReactionId(1),
                    timer: "t".into(),
                },
                Op::BindPort {
                    connection: ConnectionId(0),
                    left: Leaf::scalar(&VarRef::local("out")),
                    right: Leaf::scalar(&VarRef::contained("sink", "in2")),
                },
            ]
        );
        assert!(verify_wiring(&program).all_pass());
    }

    #[test]
    fn determinism_byte_for_byte() {
        let model = scenario_model();
        let a = assemble_ok(&model, "Main");
        let b = assemble_ok(&model, "Main");
        assert_eq!(a, b);
        assert_eq!(a.to_string(), b.to_string());
        assert_eq!(a.fingerprint(), b.fingerprint());
    }

    // ── Trigger variants ────────────────────────────────────────────────

    #[test]
    fn startup_and_shutdown_markers() {
        let mut main = Reactor::new("Main");
        main.reactions.push(
            Reaction::new("boot")
                .triggered_by(TriggerRef::Startup)
                .triggered_by(TriggerRef::Shutdown),
        );
        let model = Model {
            reactors: vec![main],
        };
        let program = assemble_ok(&model, "Main");
        assert_eq!(
            program.ops,
            vec![
                Op::DeclareStartupTrigger {
                    reaction: ReactionId(0)
                },
                Op::DeclareShutdownTrigger {
                    reaction: ReactionId(0)
                },
            ]
        );
    }

    #[test]
    fn multiport_trigger_expands_with_port_indices() {
        let mut main = Reactor::new("Main");
        main.ports
            .push(Port::input("in", "int").with_width(WidthSpec::Fixed(3)));
        main.reactions
            .push(Reaction::new("consume").triggered_by(TriggerRef::Var(VarRef::local("in"))));
        let model = Model {
            reactors: vec![main],
        };
        let program = assemble_ok(&model, "Main");
        assert_eq!(program.ops.len(), 3);
        for (i, op) in program.ops.iter().enumerate() {
            let Op::DeclareTrigger { target, .. } = op else {
                panic!("expected DeclareTrigger, got {:?}", op);
            };
            assert_eq!(target.port_index, Some(i as u32));
        }
    }

    #[test]
    fn action_trigger_stays_scalar() {
        let mut main = Reactor::new("Main");
        main.actions.push(Action::logical("notify"));
        main.reactions
            .push(Reaction::new("react").triggered_by(TriggerRef::Var(VarRef::local("notify"))));
        let model = Model {
            reactors: vec![main],
        };
        let program = assemble_ok(&model, "Main");
        assert_eq!(
            program.ops,
            vec![Op::DeclareTrigger {
                reaction: ReactionId(0),
                target: Leaf::scalar(&VarRef::local("notify")),
            }]
        );
    }

    // ── Sources and effects ─────────────────────────────────────────────

    #[test]
    fn effect_classification_action_vs_port() {
        let mut main = Reactor::new("Main");
        main.ports.push(Port::output("out", "int"));
        main.actions.push(Action::logical("sched"));
        main.reactions.push(
            Reaction::new("act")
                .triggered_by(TriggerRef::Startup)
                .writes(VarRef::local("sched"))
                .writes(VarRef::local("out")),
        );
        let model = Model {
            reactors: vec![main],
        };
        let program = assemble_ok(&model, "Main");

        let schedulable = program
            .ops
            .iter()
            .filter(|op| matches!(op, Op::DeclareSchedulableAction { .. }))
            .count();
        let antidep = program
            .ops
            .iter()
            .filter(|op| matches!(op, Op::DeclareAntidependency { .. }))
            .count();
        assert_eq!(schedulable, 1);
        assert_eq!(antidep, 1);
    }

    #[test]
    fn timer_effect_is_invalid() {
        let mut main = Reactor::new("Main");
        main.timers
            .push(Timer::new("t", TimeValue::ZERO, TimeValue::sec(1)));
        main.reactions.push(
            Reaction::new("bad")
                .triggered_by(TriggerRef::Startup)
                .writes(VarRef::local("t")),
        );
        let model = Model {
            reactors: vec![main],
        };
        let diags = assemble_err(&model, "Main");
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code, Some(codes::INVALID_EFFECT_TARGET));
    }

    #[test]
    fn sources_expand_like_triggers() {
        let mut child = Reactor::new("Child");
        child
            .ports
            .push(Port::output("out", "int").with_width(WidthSpec::Fixed(2)));
        let mut main = Reactor::new("Main");
        main.instances
            .push(Instance::new("bank", "Child").with_width(WidthSpec::Fixed(2)));
        main.reactions.push(
            Reaction::new("observe")
                .triggered_by(TriggerRef::Startup)
                .reads(VarRef::contained("bank", "out")),
        );
        let model = Model {
            reactors: vec![main, child],
        };
        let program = assemble_ok(&model, "Main");
        let deps: Vec<String> = program
            .ops
            .iter()
            .filter_map(|op| match op {
                Op::DeclareDependency { target, .. } => Some(target.to_string()),
                _ => None,
            })
            .collect();
        assert_eq!(
            deps,
            [
                "bank[0].out[0]",
                "bank[0].out[1]",
                "bank[1].out[0]",
                "bank[1].out[1]",
            ]
        );
    }

    // ── Deadlines ───────────────────────────────────────────────────────

    #[test]
    fn deadline_comes_after_all_declarations_of_its_reaction() {
        let mut main = Reactor::new("Main");
        main.ports.push(Port::input("in", "int"));
        main.ports.push(Port::output("out", "int"));
        main.reactions.push(
            Reaction::new("guarded")
                .triggered_by(TriggerRef::Var(VarRef::local("in")))
                .writes(VarRef::local("out"))
                .with_deadline(TimeValue::ms(10), "on_late"),
        );
        main.reactions
            .push(Reaction::new("after").triggered_by(TriggerRef::Startup));
        let model = Model {
            reactors: vec![main],
        };
        let program = assemble_ok(&model, "Main");

        let deadline_idx = program
            .ops
            .iter()
            .position(|op| matches!(op, Op::SetDeadline { .. }))
            .unwrap();
        assert_eq!(deadline_idx, 2);
        assert!(matches!(
            program.ops[3],
            Op::DeclareStartupTrigger {
                reaction: ReactionId(1)
            }
        ));
        assert!(verify_wiring(&program).w2_deadline_placement);
    }

    // ── Connections ─────────────────────────────────────────────────────

    #[test]
    fn replicated_connection_equal_widths() {
        let mut child = Reactor::new("Child");
        child.ports.push(Port::input("in", "int"));
        let mut main = Reactor::new("Main");
        main.ports
            .push(Port::output("out", "int").with_width(WidthSpec::Fixed(2)));
        main.instances
            .push(Instance::new("sinks", "Child").with_width(WidthSpec::Fixed(2)));
        main.connections.push(Connection::new(
            vec![VarRef::local("out")],
            vec![VarRef::contained("sinks", "in")],
            false,
        ));
        let model = Model {
            reactors: vec![main, child],
        };
        let program = assemble_ok(&model, "Main");

        let Op::BindPortVector {
            left,
            right,
            iterated,
            ..
        } = &program.ops[0]
        else {
            panic!("expected BindPortVector, got {:?}", program.ops[0]);
        };
        assert!(!iterated);
        assert_eq!(left.len(), 2);
        assert_eq!(right.len(), 2);
        assert_eq!(right[0].to_string(), "sinks[0].in");
        assert_eq!(right[1].to_string(), "sinks[1].in");
    }

    #[test]
    fn length_mismatch_reports_one_error_per_connection() {
        let mut main = Reactor::new("Main");
        main.ports
            .push(Port::output("out", "int").with_width(WidthSpec::Fixed(3)));
        main.ports
            .push(Port::input("in", "int").with_width(WidthSpec::Fixed(4)));
        main.connections.push(Connection::new(
            vec![VarRef::local("out")],
            vec![VarRef::local("in")],
            false,
        ));
        let model = Model {
            reactors: vec![main],
        };
        let diags = assemble_err(&model, "Main");
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code, Some(codes::REPLICATION_LENGTH_MISMATCH));
        assert_eq!(
            diags[0].location,
            Some(Location::Connection("Main".into(), ConnectionId(0)))
        );
    }

    #[test]
    fn iterated_connection_tolerates_unequal_widths() {
        let mut main = Reactor::new("Main");
        main.ports
            .push(Port::output("out", "int").with_width(WidthSpec::Fixed(2)));
        main.ports
            .push(Port::input("in", "int").with_width(WidthSpec::Fixed(5)));
        main.connections.push(Connection::new(
            vec![VarRef::local("out")],
            vec![VarRef::local("in")],
            true,
        ));
        let model = Model {
            reactors: vec![main],
        };
        let program = assemble_ok(&model, "Main");
        assert!(matches!(
            &program.ops[0],
            Op::BindPortVector { iterated: true, left, right, .. }
                if left.len() == 2 && right.len() == 5
        ));
    }

    #[test]
    fn one_empty_side_is_an_error_even_when_iterated() {
        for iterated in [false, true] {
            let mut main = Reactor::new("Main");
            main.ports
                .push(Port::output("out", "int").with_width(WidthSpec::Fixed(0)));
            main.ports
                .push(Port::input("in", "int").with_width(WidthSpec::Fixed(2)));
            main.connections.push(Connection::new(
                vec![VarRef::local("out")],
                vec![VarRef::local("in")],
                iterated,
            ));
            let model = Model {
                reactors: vec![main],
            };
            let diags = assemble_err(&model, "Main");
            assert_eq!(diags.len(), 1, "iterated={}", iterated);
            assert_eq!(diags[0].code, Some(codes::EMPTY_REPLICATION_SIDE));
        }
    }

    #[test]
    fn both_sides_empty_binds_nothing() {
        let mut main = Reactor::new("Main");
        main.ports
            .push(Port::output("out", "int").with_width(WidthSpec::Fixed(0)));
        main.ports
            .push(Port::input("in", "int").with_width(WidthSpec::Fixed(0)));
        main.connections.push(Connection::new(
            vec![VarRef::local("out")],
            vec![VarRef::local("in")],
            false,
        ));
        let model = Model {
            reactors: vec![main],
        };
        let program = assemble_ok(&model, "Main");
        assert!(program.ops.is_empty());
        assert_eq!(program.connection_count, 1);
    }

    #[test]
    fn connection_ids_number_by_declaration_position() {
        let mut child = Reactor::new("Child");
        child.ports.push(Port::input("a", "int"));
        child.ports.push(Port::input("b", "int"));
        let mut main = Reactor::new("Main");
        main.ports.push(Port::output("x", "int"));
        main.ports.push(Port::output("y", "int"));
        main.instances.push(Instance::new("sink", "Child"));
        main.connections.push(Connection::new(
            vec![VarRef::local("x")],
            vec![VarRef::contained("sink", "a")],
            false,
        ));
        main.connections.push(Connection::new(
            vec![VarRef::local("y")],
            vec![VarRef::contained("sink", "b")],
            false,
        ));
        let model = Model {
            reactors: vec![main, child],
        };
        let program = assemble_ok(&model, "Main");
        let ids: Vec<ConnectionId> = program
            .ops
            .iter()
            .filter_map(|op| match op {
                Op::BindPort { connection, .. } => Some(*connection),
                _ => None,
            })
            .collect();
        assert_eq!(ids, [ConnectionId(0), ConnectionId(1)]);
    }

    // ── Batch error collection ──────────────────────────────────────────

    #[test]
    fn all_errors_surface_in_one_pass() {
        let mut main = Reactor::new("Main");
        main.ports
            .push(Port::output("out", "int").with_width(WidthSpec::Fixed(3)));
        main.ports
            .push(Port::input("in", "int").with_width(WidthSpec::Fixed(4)));
        // ghost trigger, unbound width parameter, and a length mismatch
        main.ports
            .push(Port::input("p", "int").with_width(WidthSpec::Param("N".into())));
        main.reactions.push(
            Reaction::new("broken")
                .triggered_by(TriggerRef::Var(VarRef::local("ghost")))
                .reads(VarRef::local("p")),
        );
        main.connections.push(Connection::new(
            vec![VarRef::local("out")],
            vec![VarRef::local("in")],
            false,
        ));
        let model = Model {
            reactors: vec![main],
        };
        let diags = assemble_err(&model, "Main");
        let codes_seen: Vec<_> = diags.iter().filter_map(|d| d.code).collect();
        assert_eq!(
            codes_seen,
            [
                codes::UNDECLARED_REFERENCE,
                codes::UNRESOLVED_WIDTH,
                codes::REPLICATION_LENGTH_MISMATCH,
            ]
        );
    }

    #[test]
    fn errored_reactor_does_not_block_others() {
        let mut good = Reactor::new("Good");
        good.reactions
            .push(Reaction::new("go").triggered_by(TriggerRef::Startup));
        let mut bad = Reactor::new("Bad");
        bad.reactions
            .push(Reaction::new("no").triggered_by(TriggerRef::Var(VarRef::local("ghost"))));
        let model = Model {
            reactors: vec![bad, good],
        };
        let bag = DiagnosticBag::new();
        let programs = assemble_model(&model, &ParameterMap::new(), &bag);
        assert_eq!(programs.len(), 1);
        assert_eq!(programs[0].reactor, "Good");
        assert_eq!(bag.error_count(), 1);
    }

    // ── Width parameters ────────────────────────────────────────────────

    #[test]
    fn parameterized_bank_resolves_through_context() {
        let mut child = Reactor::new("Child");
        child.ports.push(Port::input("in", "int"));
        let mut main = Reactor::new("Main");
        main.ports
            .push(Port::output("out", "int").with_width(WidthSpec::Param("N".into())));
        main.instances
            .push(Instance::new("sinks", "Child").with_width(WidthSpec::Param("N".into())));
        main.connections.push(Connection::new(
            vec![VarRef::local("out")],
            vec![VarRef::contained("sinks", "in")],
            false,
        ));
        let model = Model {
            reactors: vec![main, child],
        };
        let ctx = ParameterMap::new().with("N", 3);
        let bag = DiagnosticBag::new();
        let program = assemble(&model, model.reactor("Main").unwrap(), &ctx, &bag)
            .expect("wiring program");
        assert!(!bag.has_errors());
        assert!(matches!(
            &program.ops[0],
            Op::BindPortVector { left, right, .. } if left.len() == 3 && right.len() == 3
        ));
    }
}
