//! Raw token to `TokenKind` conversion.

use crisp_ir::{NumberParts, Span, TimeUnit, TokenKind};

use crate::cook_escape::unescape;
use crate::lex_error::{LexError, LexErrorKind};
use crate::raw_token::RawToken;

pub(crate) fn convert(
    raw: RawToken,
    slice: &str,
    span: Span,
    errors: &mut Vec<LexError>,
) -> TokenKind {
    match raw {
        RawToken::Newline => TokenKind::Newline,
        RawToken::True => TokenKind::True,
        RawToken::False => TokenKind::False,
        RawToken::LParen => TokenKind::LParen,
        RawToken::RParen => TokenKind::RParen,
        RawToken::Comma => TokenKind::Comma,
        RawToken::ColonColon => TokenKind::ColonColon,
        RawToken::Plus => TokenKind::Plus,
        RawToken::Minus => TokenKind::Minus,
        RawToken::Star => TokenKind::Star,
        RawToken::Slash => TokenKind::Slash,
        RawToken::Caret => TokenKind::Caret,
        RawToken::Address => TokenKind::Address(slice.to_string()),
        RawToken::Bytes => TokenKind::Bytes(slice.to_string()),
        RawToken::BadHex => {
            errors.push(LexError::new(
                span,
                LexErrorKind::InvalidHexLiteral {
                    literal: slice.to_string(),
                },
            ));
            TokenKind::Error
        }
        RawToken::Number => match split_number(slice) {
            Some(parts) => TokenKind::Number(parts),
            None => {
                errors.push(LexError::new(span, LexErrorKind::ExponentOverflow));
                TokenKind::Error
            }
        },
        RawToken::String => {
            let content = &slice[1..slice.len() - 1];
            TokenKind::String(unescape(content, span.start + 1, errors))
        }
        RawToken::UnterminatedString => {
            errors.push(LexError::new(span, LexErrorKind::UnterminatedString));
            TokenKind::Error
        }
        RawToken::Variable => TokenKind::Variable(slice.to_string()),
        RawToken::Helper => TokenKind::Helper(slice[1..].to_string()),
        RawToken::Option => TokenKind::Option(slice[2..].to_string()),
        RawToken::Word => TokenKind::Word(slice.to_string()),
        // Filtered by the caller.
        RawToken::Comment => TokenKind::Error,
    }
}

/// Split `<mantissa>[e<power>][<unit>]`. `None` if the power overflows.
pub(crate) fn split_number(slice: &str) -> Option<NumberParts> {
    let (rest, time_unit) = if let Some(rest) = slice.strip_suffix("mo") {
        (rest, Some(TimeUnit::Month))
    } else {
        match slice.char_indices().last() {
            Some((i, c)) if c.is_ascii_alphabetic() && c != 'e' => {
                (&slice[..i], TimeUnit::from_suffix(&slice[i..]))
            }
            _ => (slice, None),
        }
    };

    let (mantissa, power) = match rest.split_once('e') {
        Some((m, p)) => (m, Some(p.parse::<u32>().ok()?)),
        None => (rest, None),
    };

    Some(NumberParts {
        mantissa: mantissa.to_string(),
        power,
        time_unit,
    })
}
