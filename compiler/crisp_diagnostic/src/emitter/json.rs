//! JSON Emitter
//!
//! One JSON object per line; editor hosts read them as a stream.

use std::io::Write;

use serde_json::json;

use crate::Diagnostic;

use super::DiagnosticEmitter;

pub struct JsonEmitter<W: Write> {
    writer: W,
}

impl<W: Write> JsonEmitter<W> {
    pub fn new(writer: W) -> Self {
        JsonEmitter { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// JSON form of one diagnostic.
pub(crate) fn to_json(diagnostic: &Diagnostic) -> serde_json::Value {
    let labels: Vec<_> = diagnostic
        .labels
        .iter()
        .map(|label| {
            json!({
                "start": label.span.start,
                "end": label.span.end,
                "message": label.message,
            })
        })
        .collect();
    json!({
        "code": diagnostic.code.as_str(),
        "severity": diagnostic.severity.to_string(),
        "message": diagnostic.message,
        "labels": labels,
        "notes": diagnostic.notes,
        "help": diagnostic.help,
    })
}

impl<W: Write> DiagnosticEmitter for JsonEmitter<W> {
    fn emit(&mut self, diagnostic: &Diagnostic) {
        let _ = writeln!(self.writer, "{}", to_json(diagnostic));
    }

    fn flush(&mut self) {
        let _ = self.writer.flush();
    }

    fn emit_summary(&mut self, error_count: usize, warning_count: usize) {
        let summary = json!({ "errors": error_count, "warnings": warning_count });
        let _ = writeln!(self.writer, "{summary}");
    }
}
