//! Escape processing for string literals.

use crate::lex_error::{LexError, LexErrorKind};
use crisp_ir::Span;

/// Unescape a string literal's content (between the quotes).
///
/// Valid escapes: `\n` `\t` `\r` `\\` `\"` `\'`. Unknown escapes push an error
/// and are kept verbatim. `base_offset` is the byte offset of `content`.
#[allow(
    clippy::cast_possible_truncation,
    reason = "source offsets bounded by u32; lex() rejects larger input"
)]
pub(crate) fn unescape(content: &str, base_offset: u32, errors: &mut Vec<LexError>) -> String {
    if !content.contains('\\') {
        return content.to_string();
    }

    let mut result = String::with_capacity(content.len());
    let mut chars = content.char_indices();
    while let Some((i, c)) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        match chars.next() {
            Some((_, 'n')) => result.push('\n'),
            Some((_, 't')) => result.push('\t'),
            Some((_, 'r')) => result.push('\r'),
            Some((_, '\\')) => result.push('\\'),
            Some((_, '"')) => result.push('"'),
            Some((_, '\'')) => result.push('\''),
            Some((j, other)) => {
                let start = base_offset + i as u32;
                let end = base_offset + (j + other.len_utf8()) as u32;
                errors.push(LexError::new(
                    Span::new(start, end),
                    LexErrorKind::InvalidEscape { escape_char: other },
                ));
                result.push('\\');
                result.push(other);
            }
            None => result.push('\\'),
        }
    }
    result
}
