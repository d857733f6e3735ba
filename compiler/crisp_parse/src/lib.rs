//! Recursive descent parser for crisp.
//!
//! Produces an [`Ast`] plus every recoverable error found on the way. A bad
//! line keeps the command parsed so far (completion still needs it) and the
//! parser resumes at the next line.

mod cursor;
mod error;
mod grammar;
mod recovery;
mod stack;

pub use cursor::Cursor;
pub use error::{FatalParseError, ParseError, Unclosed};

use crisp_ir::{Ast, LineIndex, Location, Span, TokenList};
use tracing::debug;

/// Result of parsing a script.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ParseOutput {
    pub ast: Ast,
    /// Lexer and parser errors in source order.
    pub errors: Vec<ParseError>,
}

impl ParseOutput {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Lex and parse `source`.
pub fn parse(source: &str) -> Result<ParseOutput, FatalParseError> {
    let lexed = crisp_lexer::lex(source).map_err(FatalParseError::InputTooLarge)?;
    let index = LineIndex::new(source);

    let mut parser = Parser::new(source, &lexed.tokens, &index);
    let body = parser.parse_script()?;

    let mut errors: Vec<ParseError> = lexed.errors.iter().map(ParseError::from).collect();
    errors.append(&mut parser.errors);
    for err in &mut errors {
        err.loc = index.location(err.span);
    }
    errors.sort_by_key(|e| e.span.start);

    debug!(
        commands = body.len(),
        errors = errors.len(),
        "parsed script"
    );
    Ok(ParseOutput {
        ast: Ast::new(body),
        errors,
    })
}

/// Parser state.
pub struct Parser<'a> {
    source: &'a str,
    cursor: Cursor<'a>,
    index: &'a LineIndex,
    errors: Vec<ParseError>,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str, tokens: &'a TokenList, index: &'a LineIndex) -> Self {
        Parser {
            source,
            cursor: Cursor::new(tokens),
            index,
            errors: Vec::new(),
        }
    }

    #[inline]
    fn loc(&self, span: Span) -> Location {
        self.index.location(span)
    }

    /// Span from `start` through the last consumed token.
    #[inline]
    fn span_from(&self, start: Span) -> Span {
        start.merge(self.cursor.previous_span())
    }

    /// Source text covered by `span`.
    fn text(&self, span: Span) -> &'a str {
        self.source.get(span.to_range()).unwrap_or_default()
    }
}
