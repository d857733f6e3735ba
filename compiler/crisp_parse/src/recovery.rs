//! Error recovery for the parser.

use crisp_ir::TokenKind;

use crate::cursor::Cursor;

/// Skip to the end of the current command.
///
/// Stops before a newline or end of input at nesting depth 0, and before a
/// `)` that closes an enclosing block, so the block stays intact. Returns the
/// number of skipped tokens.
pub(crate) fn synchronize(cursor: &mut Cursor<'_>) -> usize {
    let mut depth = 0usize;
    let mut skipped = 0;
    loop {
        match cursor.current_kind() {
            TokenKind::Eof => break,
            TokenKind::Newline if depth == 0 => break,
            TokenKind::RParen if depth == 0 => break,
            TokenKind::LParen => depth += 1,
            TokenKind::RParen => depth -= 1,
            _ => {}
        }
        cursor.advance();
        skipped += 1;
    }
    skipped
}
