use std::fmt::Display;

use thiserror::Error;

use crate::Location;

/// Everything the semantic passes can complain about.
///
/// The messages reproduce the compiler's diagnostic texts; tests match
/// on them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SemanticError {
    #[error("Unknown identifier: {name}")]
    UnknownIdentifier { name: String },
    #[error("Unknown parameter: {name}")]
    UnknownParameterScope { name: String },
    #[error("Invalid conversion to {to}")]
    InvalidConversion { to: String },
    #[error("{left} != {right}")]
    TypeMismatch { left: String, right: String },
    #[error("Must be [int]")]
    InvalidIndexType,
    #[error("Must be [int]")]
    InvalidUnaryOperandType,
    #[error("Must be (bool)")]
    ConditionNotBoolean,
    #[error("{signature} is not a function")]
    NotAFunctionSignature { signature: String },
    #[error("expected {expected} arguments, received {received}")]
    CallArityMismatch { expected: usize, received: usize },
    #[error("Could not find surrounding function")]
    NoSurroundingFunction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

/// A reported problem: what went wrong and where.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub error: SemanticError,
    pub location: Location,
    pub severity: Severity,
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.location.line, self.error)
    }
}

/// Append-only collector carried down the traversals.
///
/// Checks report here and keep going with the unknown sentinel, so one
/// mistake surfaces every problem it causes downstream rather than
/// stopping the pass.
#[derive(Debug, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Diagnostics {
            entries: Vec::new(),
        }
    }

    pub fn report(&mut self, error: SemanticError, location: Location) {
        log::debug!("{}: {}", location.line, error);
        self.entries.push(Diagnostic {
            error,
            location,
            severity: Severity::Error,
        });
    }

    pub fn warn(&mut self, error: SemanticError, location: Location) {
        log::debug!("warning: {}: {}", location.line, error);
        self.entries.push(Diagnostic {
            error,
            location,
            severity: Severity::Warning,
        });
    }

    /// The "compilation failed" flag: true once any error (not warning)
    /// has been reported. Code generation must not run when this is set.
    pub fn has_errors(&self) -> bool {
        self.entries
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    pub fn error_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
