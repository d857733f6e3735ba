//! Emitters.
//!
//! - Terminal: human-readable reports rendered with `ariadne`
//! - JSON: machine-readable output for editor hosts and tooling

mod json;
mod terminal;

pub use json::JsonEmitter;
pub use terminal::{ColorMode, TerminalEmitter};

use crate::Diagnostic;

/// Output sink for diagnostics.
pub trait DiagnosticEmitter {
    fn emit(&mut self, diagnostic: &Diagnostic);

    fn emit_all(&mut self, diagnostics: &[Diagnostic]) {
        for diag in diagnostics {
            self.emit(diag);
        }
    }

    fn flush(&mut self);

    /// Closing line with the error and warning counts.
    fn emit_summary(&mut self, error_count: usize, warning_count: usize);
}
