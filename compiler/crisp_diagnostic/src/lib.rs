//! Diagnostics for crisp scripts.
//!
//! Lex, parse and evaluation failures are all lowered into [`Diagnostic`],
//! so the CLI and editor hosts render them through the same
//! [`emitter`]s. Each carries a stable [`ErrorCode`], a message, labelled
//! byte spans, notes and help lines.

mod diagnostic;
pub mod emitter;
mod error_code;

pub use diagnostic::{count_by_severity, Diagnostic, Label, Severity};
pub use error_code::ErrorCode;
