//! Terminal Emitter
//!
//! Renders diagnostics against the script source with `ariadne`.

use std::io::{self, Write};

use ariadne::{Color, Config, Label, Report, ReportKind, Source};

use crate::{Diagnostic, Severity};

use super::DiagnosticEmitter;

/// When to color terminal output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColorMode {
    /// Color when writing to a terminal.
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorMode {
    /// Resolve to a boolean; `is_tty` only matters for `Auto`.
    pub fn should_use_colors(self, is_tty: bool) -> bool {
        match self {
            ColorMode::Auto => is_tty,
            ColorMode::Always => true,
            ColorMode::Never => false,
        }
    }
}

#[inline]
fn plural_s(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

/// Terminal emitter bound to one script's source text.
pub struct TerminalEmitter<'src, W: Write> {
    writer: W,
    source: &'src str,
    name: String,
    colors: bool,
}

impl<'src, W: Write> TerminalEmitter<'src, W> {
    pub fn new(
        writer: W,
        source: &'src str,
        name: impl Into<String>,
        mode: ColorMode,
        is_tty: bool,
    ) -> Self {
        TerminalEmitter {
            writer,
            source,
            name: name.into(),
            colors: mode.should_use_colors(is_tty),
        }
    }

    /// Consume the emitter, returning the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }

    /// Byte offset to char offset; ariadne indexes by character.
    fn char_offset(&self, byte: u32) -> usize {
        let byte = (byte as usize).min(self.source.len());
        let mut boundary = byte;
        while !self.source.is_char_boundary(boundary) {
            boundary -= 1;
        }
        self.source[..boundary].chars().count()
    }

    fn report(&self, diagnostic: &Diagnostic) -> Report<'static, (String, std::ops::Range<usize>)> {
        let kind = match diagnostic.severity {
            Severity::Error => ReportKind::Error,
            Severity::Warning => ReportKind::Warning,
        };
        let offset = diagnostic
            .primary_span()
            .map_or(0, |span| self.char_offset(span.start));

        let mut builder = Report::build(kind, self.name.clone(), offset)
            .with_config(Config::default().with_color(self.colors))
            .with_code(diagnostic.code.as_str())
            .with_message(&diagnostic.message);

        for (i, label) in diagnostic.labels.iter().enumerate() {
            let start = self.char_offset(label.span.start);
            let end = self.char_offset(label.span.end).max(start);
            let color = if i == 0 { Color::Red } else { Color::Blue };
            builder = builder.with_label(
                Label::new((self.name.clone(), start..end))
                    .with_message(&label.message)
                    .with_color(color),
            );
        }
        for note in &diagnostic.notes {
            builder = builder.with_note(note);
        }
        for help in &diagnostic.help {
            builder = builder.with_help(help);
        }
        builder.finish()
    }
}

impl<'src> TerminalEmitter<'src, io::Stderr> {
    pub fn stderr(
        source: &'src str,
        name: impl Into<String>,
        mode: ColorMode,
        is_tty: bool,
    ) -> Self {
        TerminalEmitter::new(io::stderr(), source, name, mode, is_tty)
    }
}

impl<W: Write> DiagnosticEmitter for TerminalEmitter<'_, W> {
    fn emit(&mut self, diagnostic: &Diagnostic) {
        let report = self.report(diagnostic);
        let cache = (self.name.clone(), Source::from(self.source));
        let _ = report.write(cache, &mut self.writer);
    }

    fn flush(&mut self) {
        let _ = self.writer.flush();
    }

    fn emit_summary(&mut self, error_count: usize, warning_count: usize) {
        if error_count == 0 && warning_count == 0 {
            return;
        }
        let mut parts = Vec::new();
        if error_count > 0 {
            parts.push(format!("{error_count} error{}", plural_s(error_count)));
        }
        if warning_count > 0 {
            parts.push(format!("{warning_count} warning{}", plural_s(warning_count)));
        }
        let _ = writeln!(self.writer, "{} emitted", parts.join(", "));
    }
}
