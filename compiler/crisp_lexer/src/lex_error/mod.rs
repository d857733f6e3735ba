//! Lexer error types.

use crisp_diagnostic::{Diagnostic, ErrorCode};
use crisp_ir::Span;

/// A lexer error; lexing always continues past it.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct LexError {
    pub span: Span,
    pub kind: LexErrorKind,
}

/// What kind of lexer error occurred.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum LexErrorKind {
    /// Character that starts no token.
    InvalidCharacter { found: char },
    /// Missing closing quote.
    UnterminatedString,
    /// Unknown escape such as `\q`.
    InvalidEscape { escape_char: char },
    /// Exponent of a number literal does not fit in `u32`.
    ExponentOverflow,
    /// `0x` literal with a non-hex character, e.g. an address followed by
    /// letters.
    InvalidHexLiteral { literal: String },
}

impl LexError {
    #[cold]
    pub fn new(span: Span, kind: LexErrorKind) -> Self {
        LexError { span, kind }
    }

    pub fn code(&self) -> ErrorCode {
        match self.kind {
            LexErrorKind::InvalidCharacter { .. } | LexErrorKind::InvalidHexLiteral { .. } => {
                ErrorCode::E0001
            }
            LexErrorKind::UnterminatedString | LexErrorKind::InvalidEscape { .. } => {
                ErrorCode::E0002
            }
            LexErrorKind::ExponentOverflow => ErrorCode::E0003,
        }
    }

    pub fn message(&self) -> String {
        match &self.kind {
            LexErrorKind::InvalidCharacter { found } => format!("unexpected character `{found}`"),
            LexErrorKind::UnterminatedString => "unterminated string literal".to_string(),
            LexErrorKind::InvalidEscape { escape_char } => {
                format!("unknown escape sequence `\\{escape_char}`")
            }
            LexErrorKind::ExponentOverflow => "number exponent is too large".to_string(),
            LexErrorKind::InvalidHexLiteral { literal } => {
                format!("`{literal}` is not a valid hex literal")
            }
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        let label = match self.kind {
            LexErrorKind::InvalidCharacter { .. } => "not valid here",
            LexErrorKind::UnterminatedString => "string starts here",
            LexErrorKind::InvalidEscape { .. } => "invalid escape",
            LexErrorKind::ExponentOverflow => "exponent out of range",
            LexErrorKind::InvalidHexLiteral { .. } => "non-hex character in literal",
        };
        let diag = Diagnostic::error(self.code())
            .with_message(self.message())
            .with_label(self.span, label);
        match self.kind {
            LexErrorKind::InvalidEscape { .. } => {
                diag.with_note("valid escapes are \\n \\t \\r \\\\ \\\" \\'")
            }
            LexErrorKind::UnterminatedString => diag.with_note("strings cannot span lines"),
            _ => diag,
        }
    }
}

#[cfg(test)]
mod tests;
