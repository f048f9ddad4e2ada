// dot.rs — Graphviz DOT output for wiring programs
//
// Renders the dependency graph a wiring program encodes — triggers and
// dependencies into reactions, effects out of them, and port bindings —
// in DOT format suitable for `dot`, `neato`, or other layout engines.
//
// Preconditions: `program` is a fully constructed WiringProgram.
// Postconditions: returns a valid DOT string; output is deterministic.
// Failure modes: none (pure string formatting).
// Side effects: none.

use std::collections::HashSet;
use std::fmt::Write;

use crate::expand::Leaf;
use crate::id::ReactionId;
use crate::wiring::{pair_bindings, Op, WiringProgram};

/// Emit the wiring program as a Graphviz DOT string.
pub fn emit_dot(program: &WiringProgram) -> String {
    let mut b = DotBuilder {
        nodes: String::new(),
        edges: String::new(),
        declared: HashSet::new(),
    };

    for op in &program.ops {
        match op {
            Op::DeclareTrigger { reaction, target } => {
                let v = b.var(target);
                let r = b.reaction(program, *reaction);
                b.edge(&v, &r, "");
            }
            Op::DeclareStartupTrigger { reaction } => {
                let m = b.marker("startup");
                let r = b.reaction(program, *reaction);
                b.edge(&m, &r, "");
            }
            Op::DeclareShutdownTrigger { reaction } => {
                let m = b.marker("shutdown");
                let r = b.reaction(program, *reaction);
                b.edge(&m, &r, "");
            }
            Op::DeclareTimerTrigger { reaction, timer } => {
                let m = b.marker(&format!("timer {}", timer));
                let r = b.reaction(program, *reaction);
                b.edge(&m, &r, "");
            }
            Op::DeclareDependency { reaction, target } => {
                let v = b.var(target);
                let r = b.reaction(program, *reaction);
                b.edge(&v, &r, " [style=dashed]");
            }
            Op::DeclareAntidependency { reaction, target } => {
                let r = b.reaction(program, *reaction);
                let v = b.var(target);
                b.edge(&r, &v, "");
            }
            Op::DeclareSchedulableAction { reaction, action } => {
                let r = b.reaction(program, *reaction);
                let v = b.var(action);
                b.edge(&r, &v, " [style=dotted]");
            }
            // Deadlines are reaction-local; they add no graph edge.
            Op::SetDeadline { .. } => {}
            Op::BindPort { left, right, .. } => {
                let l = b.var(left);
                let r = b.var(right);
                b.edge(&l, &r, " [color=gray50]");
            }
            Op::BindPortVector {
                left,
                right,
                iterated,
                ..
            } => {
                for (lhs, rhs) in pair_bindings(left, right, *iterated) {
                    let l = b.var(lhs);
                    let r = b.var(rhs);
                    b.edge(&l, &r, " [color=gray50]");
                }
            }
        }
    }

    let mut buf = String::new();
    writeln!(buf, "digraph wiring {{").unwrap();
    writeln!(buf, "    rankdir=LR;").unwrap();
    writeln!(buf, "    label=\"{}\";", program.reactor).unwrap();
    writeln!(buf, "    node [fontname=\"Helvetica\", fontsize=10];").unwrap();
    writeln!(buf, "    edge [fontname=\"Helvetica\", fontsize=9];").unwrap();
    buf.push_str(&b.nodes);
    buf.push_str(&b.edges);
    writeln!(buf, "}}").unwrap();
    buf
}

// ── Helpers ─────────────────────────────────────────────────────────────────

struct DotBuilder {
    nodes: String,
    edges: String,
    declared: HashSet<String>,
}

impl DotBuilder {
    fn node(&mut self, id: String, label: &str, attrs: &str) -> String {
        if self.declared.insert(id.clone()) {
            writeln!(self.nodes, "    {} [label=\"{}\"{}];", id, label, attrs).unwrap();
        }
        id
    }

    fn reaction(&mut self, program: &WiringProgram, id: ReactionId) -> String {
        let label = format!("{} '{}'", id, program.reaction_name(id));
        self.node(id.to_string(), &label, ", shape=box")
    }

    fn var(&mut self, leaf: &Leaf) -> String {
        let label = leaf.to_string();
        let id = format!("v_{}", sanitize(&label));
        self.node(id, &label, ", shape=ellipse")
    }

    fn marker(&mut self, label: &str) -> String {
        let id = format!("m_{}", sanitize(label));
        self.node(id, label, ", shape=diamond")
    }

    fn edge(&mut self, from: &str, to: &str, attrs: &str) {
        writeln!(self.edges, "    {} -> {}{};", from, to, attrs).unwrap();
    }
}

fn sanitize(s: &str) -> String {
    s.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}
