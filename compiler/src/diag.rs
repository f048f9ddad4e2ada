// diag.rs — Diagnostics model and sink contract
//
// Shared diagnostic types for all assembly phases, the sink interface the
// graph builder reports through, and a thread-safe collecting sink for
// callers that batch diagnostics per compilation pass.
//
// Preconditions: none.
// Postconditions: none.
// Failure modes: none.
// Side effects: `DiagnosticBag::report` appends under a mutex.

use std::fmt;
use std::sync::Mutex;

use crate::id::{ConnectionId, ReactionId};

// ── Diagnostic code ──────────────────────────────────────────────────────

/// A stable diagnostic code (e.g., `E0101`).
///
/// Codes are `&'static str` constants defined in the `codes` module. Once
/// assigned, a code must never be reassigned to a different semantic
/// meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DiagCode(pub &'static str);

impl fmt::Display for DiagCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub mod codes {
    use super::DiagCode;

    pub const UNRESOLVED_WIDTH: DiagCode = DiagCode("E0101");
    pub const UNDECLARED_REFERENCE: DiagCode = DiagCode("E0102");
    pub const INVALID_EFFECT_TARGET: DiagCode = DiagCode("E0103");
    pub const REPLICATION_LENGTH_MISMATCH: DiagCode = DiagCode("E0201");
    pub const EMPTY_REPLICATION_SIDE: DiagCode = DiagCode("E0202");
}

// ── Severity level ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagLevel {
    Error,
    Warning,
}

// ── Location ─────────────────────────────────────────────────────────────

/// Where a diagnostic is attributed: a reactor, or a reaction/connection
/// within it (by declaration index).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    Reactor(String),
    Reaction(String, ReactionId),
    Connection(String, ConnectionId),
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Reactor(name) => write!(f, "reactor {}", name),
            Location::Reaction(name, id) => write!(f, "{} reaction {}", name, id),
            Location::Connection(name, id) => write!(f, "{} connection {}", name, id),
        }
    }
}

// ── Diagnostic ───────────────────────────────────────────────────────────

/// A diagnostic emitted by any assembly phase.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub code: Option<DiagCode>,
    pub level: DiagLevel,
    pub message: String,
    pub location: Option<Location>,
    pub hint: Option<String>,
}

impl Diagnostic {
    /// Create a new diagnostic with no code, location, or hint.
    pub fn new(level: DiagLevel, message: impl Into<String>) -> Self {
        Self {
            code: None,
            level,
            message: message.into(),
            location: None,
            hint: None,
        }
    }

    /// Attach a stable diagnostic code.
    pub fn with_code(mut self, code: DiagCode) -> Self {
        self.code = Some(code);
        self
    }

    /// Attach the location the diagnostic is attributed to.
    pub fn at(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    /// Attach a remediation hint.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.level {
            DiagLevel::Error => "error",
            DiagLevel::Warning => "warning",
        };
        if let Some(code) = &self.code {
            write!(f, "{}[{}]: {}", level, code, self.message)?;
        } else {
            write!(f, "{}: {}", level, self.message)?;
        }
        if let Some(location) = &self.location {
            write!(f, " ({})", location)?;
        }
        if let Some(hint) = &self.hint {
            write!(f, "\n  hint: {}", hint)?;
        }
        Ok(())
    }
}

// ── Sink contract ────────────────────────────────────────────────────────

/// The sink the graph builder reports through. Fire-and-forget: the
/// builder never consults a return value. Implementations must accept
/// concurrent reports, since independent reactors may be assembled in
/// parallel against one sink.
pub trait DiagSink {
    fn report(&self, diag: Diagnostic);
}

/// A collecting sink scoped to one compilation pass. Append-only; order
/// across concurrent reporters is unspecified (consumers sort or group
/// downstream).
#[derive(Debug, Default)]
pub struct DiagnosticBag {
    entries: Mutex<Vec<Diagnostic>>,
}

impl DiagnosticBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything reported so far.
    pub fn snapshot(&self) -> Vec<Diagnostic> {
        self.entries.lock().unwrap().clone()
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.entries.into_inner().unwrap()
    }

    pub fn error_count(&self) -> usize {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .filter(|d| d.level == DiagLevel::Error)
            .count()
    }

    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }
}

impl DiagSink for DiagnosticBag {
    fn report(&self, diag: Diagnostic) {
        self.entries.lock().unwrap().push(diag);
    }
}
