//! Error types for evaluation.
//!
//! Everything after parsing is fatal-on-raise: the first [`EvalError`] stops
//! the run. Each error carries a kind, a message, and where it came from so
//! the host can place a diagnostic on the offending command or helper.
//!
//! Factory functions (`invalid()`, `not_found()`, ...) are the public API and
//! populate both `kind` and `message`.

use std::fmt;

use crisp_diagnostic::{Diagnostic, ErrorCode};
use crisp_ir::{LineIndex, Location, Span};

use crate::bindings::BindingError;

/// Result of evaluation.
pub type EvalResult<T> = Result<T, EvalError>;

/// Error category.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, thiserror::Error)]
pub enum EvalErrorKind {
    /// Malformed input or argument.
    #[error("invalid")]
    Invalid,
    /// Missing module, command, helper, identifier or binding.
    #[error("not found")]
    NotFound,
    /// A capability call failed.
    #[error("connection failure")]
    Connection,
    /// A capability call returned something unusable.
    #[error("unexpected result")]
    UnexpectedResult,
    /// The capability is unavailable in the current mode.
    #[error("missing capability")]
    MissingCapability,
    /// A newer eager request superseded this one.
    #[error("cancelled")]
    Cancelled,
}

impl EvalErrorKind {
    pub fn code(self) -> ErrorCode {
        match self {
            EvalErrorKind::Invalid => ErrorCode::E2001,
            EvalErrorKind::NotFound => ErrorCode::E2002,
            EvalErrorKind::Connection => ErrorCode::E2003,
            EvalErrorKind::UnexpectedResult => ErrorCode::E2004,
            EvalErrorKind::MissingCapability => ErrorCode::E2005,
            EvalErrorKind::Cancelled => ErrorCode::E2006,
        }
    }
}

/// The construct an error was raised in.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorOrigin {
    /// A command, by qualified name.
    Command { name: String },
    /// A helper, by name without `@`.
    Helper { name: String },
    /// Any other node.
    Node {
        kind: &'static str,
        name: Option<String>,
    },
}

impl fmt::Display for ErrorOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorOrigin::Command { name } => write!(f, "command `{name}`"),
            ErrorOrigin::Helper { name } => write!(f, "helper `@{name}`"),
            ErrorOrigin::Node {
                kind,
                name: Some(name),
            } => write!(f, "{kind} `{name}`"),
            ErrorOrigin::Node { kind, name: None } => write!(f, "{kind}"),
        }
    }
}

/// Evaluation error.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct EvalError {
    pub kind: EvalErrorKind,
    pub message: String,
    pub loc: Option<Location>,
    pub origin: Option<ErrorOrigin>,
    pub notes: Vec<String>,
}

impl EvalError {
    #[cold]
    pub fn new(kind: EvalErrorKind, message: impl Into<String>) -> Self {
        EvalError {
            kind,
            message: message.into(),
            loc: None,
            origin: None,
            notes: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_loc(mut self, loc: Option<Location>) -> Self {
        if self.loc.is_none() {
            self.loc = loc;
        }
        self
    }

    #[must_use]
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// Tag with `origin` and `loc` unless an inner node already did.
    ///
    /// The innermost construct wins, so a failing helper inside a command
    /// argument is reported on the helper.
    #[must_use]
    pub fn with_origin_if_unset(mut self, origin: ErrorOrigin, loc: Option<Location>) -> Self {
        if self.origin.is_none() {
            self.origin = Some(origin);
            self.loc = self.loc.or(loc);
        }
        self
    }

    #[must_use]
    pub fn in_command(self, name: &str, loc: Option<Location>) -> Self {
        self.with_origin_if_unset(
            ErrorOrigin::Command {
                name: name.to_string(),
            },
            loc,
        )
    }

    #[must_use]
    pub fn in_helper(self, name: &str, loc: Option<Location>) -> Self {
        self.with_origin_if_unset(
            ErrorOrigin::Helper {
                name: name.to_string(),
            },
            loc,
        )
    }

    #[must_use]
    pub fn in_node(self, kind: &'static str, name: Option<&str>, loc: Option<Location>) -> Self {
        self.with_origin_if_unset(
            ErrorOrigin::Node {
                kind,
                name: name.map(str::to_string),
            },
            loc,
        )
    }

    pub fn is_cancelled(&self) -> bool {
        self.kind == EvalErrorKind::Cancelled
    }

    /// Convert into a diagnostic; `index` maps the location back to bytes.
    pub fn to_diagnostic(&self, index: &LineIndex) -> Diagnostic {
        let mut diag = Diagnostic::error(self.kind.code()).with_message(self.to_string());
        let span = self
            .loc
            .and_then(|loc| Some(Span::new(index.offset(loc.start)?, index.offset(loc.end)?)));
        if let Some(span) = span {
            let label = match &self.origin {
                Some(origin) => format!("in {origin}"),
                None => self.kind.to_string(),
            };
            diag = diag.with_label(span, label);
        }
        for note in &self.notes {
            diag = diag.with_note(note.clone());
        }
        diag
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.origin {
            Some(ErrorOrigin::Command { name }) => write!(f, "{name}: {}", self.message),
            Some(ErrorOrigin::Helper { name }) => write!(f, "@{name}: {}", self.message),
            _ => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for EvalError {}

impl From<BindingError> for EvalError {
    fn from(err: BindingError) -> Self {
        invalid(err.to_string())
    }
}

// Factories

#[cold]
pub fn invalid(message: impl Into<String>) -> EvalError {
    EvalError::new(EvalErrorKind::Invalid, message)
}

#[cold]
pub fn not_found(message: impl Into<String>) -> EvalError {
    EvalError::new(EvalErrorKind::NotFound, message)
}

#[cold]
pub fn connection(message: impl Into<String>) -> EvalError {
    EvalError::new(EvalErrorKind::Connection, message)
}

#[cold]
pub fn unexpected_result(message: impl Into<String>) -> EvalError {
    EvalError::new(EvalErrorKind::UnexpectedResult, message)
}

#[cold]
pub fn missing_capability(what: &str) -> EvalError {
    EvalError::new(
        EvalErrorKind::MissingCapability,
        format!("{what} is not available during eager evaluation"),
    )
}

#[cold]
pub fn cancelled() -> EvalError {
    EvalError::new(
        EvalErrorKind::Cancelled,
        "evaluation superseded by a newer request",
    )
}

#[cold]
pub fn undefined_variable(name: &str) -> EvalError {
    not_found(format!("undefined variable `{name}`"))
}

#[cold]
pub fn type_mismatch(arg: &str, expected: &str, found: &str) -> EvalError {
    invalid(format!(
        "argument `{arg}` expects {expected}, found {found}"
    ))
}

#[cfg(test)]
mod tests;
