//! Lexer for crisp using logos.
//!
//! Produces a [`TokenList`] terminated by `Eof`. Comments and horizontal
//! whitespace are dropped; newlines are kept because they separate commands.
//! Lexing never stops at a bad character: it is reported and replaced with an
//! `Error` token so the parser can keep going.

mod convert;
mod cook_escape;
mod lex_error;
mod raw_token;

pub use lex_error::{LexError, LexErrorKind};

use crisp_ir::{Span, SpanError, Token, TokenKind, TokenList};
use logos::Logos;

use raw_token::RawToken;

/// Tokens plus every error found along the way.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LexOutput {
    pub tokens: TokenList,
    pub errors: Vec<LexError>,
}

impl LexOutput {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Lex `source`.
///
/// Fails only if the source is too large to be addressed by a [`Span`].
pub fn lex(source: &str) -> Result<LexOutput, SpanError> {
    let len = u32::try_from(source.len()).map_err(|_| SpanError { offset: source.len() })?;

    let mut output = LexOutput::default();
    let mut logos = RawToken::lexer(source);

    while let Some(result) = logos.next() {
        let span = Span::try_from_range(logos.span())?;
        let slice = logos.slice();
        match result {
            Ok(RawToken::Comment) => {}
            Ok(raw) => {
                let kind = convert::convert(raw, slice, span, &mut output.errors);
                output.tokens.push(Token::new(kind, span));
            }
            Err(()) => {
                let found = slice.chars().next().unwrap_or('\u{FFFD}');
                output
                    .errors
                    .push(LexError::new(span, LexErrorKind::InvalidCharacter { found }));
                output.tokens.push(Token::new(TokenKind::Error, span));
            }
        }
    }

    output.tokens.push(Token::new(TokenKind::Eof, Span::new(len, len)));
    Ok(output)
}

#[cfg(test)]
mod tests;
