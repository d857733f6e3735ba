//! Parse error types.
//!
//! Recoverable problems become [`ParseError`]s collected next to a
//! best-effort AST. [`FatalParseError`] aborts the parse: no AST can be
//! built when the input cannot be addressed or a block never closes.

use std::fmt;

use crisp_diagnostic::{Diagnostic, ErrorCode};
use crisp_ir::{Location, Span, SpanError, TokenKind};
use crisp_lexer::LexError;

/// A recoverable parse error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseError {
    pub code: ErrorCode,
    pub message: String,
    pub span: Span,
    /// Line/column form of `span`, filled in by the parser.
    pub loc: Location,
    pub help: Vec<String>,
}

impl ParseError {
    #[cold]
    pub fn new(code: ErrorCode, message: impl Into<String>, span: Span) -> Self {
        ParseError {
            code,
            message: message.into(),
            span,
            loc: Location::default(),
            help: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help.push(help.into());
        self
    }

    #[cold]
    pub fn unexpected(found: &TokenKind, span: Span, expected: &str) -> Self {
        ParseError::new(
            ErrorCode::E1001,
            format!("expected {expected}, found {}", found.display_name()),
            span,
        )
    }

    #[cold]
    pub fn expected_command(found: &TokenKind, span: Span) -> Self {
        ParseError::new(
            ErrorCode::E1004,
            format!("expected command name, found {}", found.display_name()),
            span,
        )
        .with_help("each line starts with a command such as `set` or `exec`")
    }

    #[cold]
    pub fn block_not_last(span: Span) -> Self {
        ParseError::new(
            ErrorCode::E1005,
            "block expression must be the last argument",
            span,
        )
    }

    #[cold]
    pub fn option_without_value(name: &str, span: Span) -> Self {
        ParseError::new(
            ErrorCode::E1006,
            format!("option `--{name}` expects a value"),
            span,
        )
    }

    #[cold]
    pub fn unclosed_signature(span: Span) -> Self {
        ParseError::new(ErrorCode::E1003, "unclosed function signature", span)
            .with_help("signatures look like `transfer(address,uint256)`")
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        let mut diag = Diagnostic::error(self.code)
            .with_message(&self.message)
            .with_label(self.span, "here");
        for help in &self.help {
            diag = diag.with_help(help);
        }
        diag
    }
}

impl From<&LexError> for ParseError {
    fn from(err: &LexError) -> Self {
        ParseError::new(err.code(), err.message(), err.span)
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.message, self.loc.start)
    }
}

/// Which delimiter was left open.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Unclosed {
    Block,
    Group,
}

impl fmt::Display for Unclosed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unclosed::Block => write!(f, "block"),
            Unclosed::Group => write!(f, "parenthesized expression"),
        }
    }
}

/// An unrecoverable parse failure.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FatalParseError {
    /// Source exceeds `u32::MAX` bytes.
    InputTooLarge(SpanError),
    /// End of input inside a block or group; `span` is the opening `(`.
    Unclosed {
        what: Unclosed,
        span: Span,
        loc: Location,
    },
}

impl FatalParseError {
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            FatalParseError::InputTooLarge(err) => Diagnostic::error(ErrorCode::E1001)
                .with_message(format!("script too large: {err}")),
            FatalParseError::Unclosed { what, span, .. } => Diagnostic::error(ErrorCode::E1003)
                .with_message(format!("unclosed {what}"))
                .with_label(*span, "opened here")
                .with_help("add a matching `)`"),
        }
    }
}

impl fmt::Display for FatalParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FatalParseError::InputTooLarge(err) => write!(f, "script too large: {err}"),
            FatalParseError::Unclosed { what, loc, .. } => {
                write!(f, "unclosed {what} opened at {}", loc.start)
            }
        }
    }
}

impl std::error::Error for FatalParseError {}

/// Internal control flow of grammar functions.
#[derive(Debug)]
pub(crate) enum Failure {
    /// Record the error, then resynchronize.
    Syntax(ParseError),
    /// Already reported (by the lexer); only resynchronize.
    Reported,
    Fatal(FatalParseError),
}

impl From<ParseError> for Failure {
    fn from(err: ParseError) -> Self {
        Failure::Syntax(err)
    }
}

impl From<FatalParseError> for Failure {
    fn from(err: FatalParseError) -> Self {
        Failure::Fatal(err)
    }
}
