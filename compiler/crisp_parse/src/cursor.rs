//! Token cursor for navigating the token stream.

use crisp_ir::{Span, Token, TokenKind, TokenList};
use tracing::trace;

static EOF_TOKEN: Token = Token {
    kind: TokenKind::Eof,
    span: Span::EMPTY,
};

/// Cursor over a `TokenList`. The last token is always `Eof`.
pub struct Cursor<'a> {
    tokens: &'a TokenList,
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(tokens: &'a TokenList) -> Self {
        debug_assert!(
            matches!(tokens.iter().last().map(|t| &t.kind), Some(TokenKind::Eof)),
            "token list must end with Eof"
        );
        Cursor { tokens, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    /// Token at `pos + offset`, clamped to the trailing `Eof`.
    #[inline]
    pub fn peek(&self, offset: usize) -> &'a Token {
        let last = self.tokens.len().saturating_sub(1);
        let idx = (self.pos + offset).min(last);
        self.tokens.get(idx).unwrap_or(&EOF_TOKEN)
    }

    #[inline]
    pub fn current(&self) -> &'a Token {
        self.peek(0)
    }

    #[inline]
    pub fn current_kind(&self) -> &'a TokenKind {
        &self.current().kind
    }

    #[inline]
    pub fn current_span(&self) -> Span {
        self.current().span
    }

    #[inline]
    pub fn previous_span(&self) -> Span {
        match self.pos.checked_sub(1).and_then(|i| self.tokens.get(i)) {
            Some(token) => token.span,
            None => Span::EMPTY,
        }
    }

    #[inline]
    pub fn is_at_end(&self) -> bool {
        matches!(self.current_kind(), TokenKind::Eof)
    }

    #[inline]
    pub fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(self.current_kind()) == std::mem::discriminant(kind)
    }

    /// Whether the current token ends a command: newline, `)` or end of input.
    #[inline]
    pub fn at_command_end(&self) -> bool {
        matches!(
            self.current_kind(),
            TokenKind::Newline | TokenKind::RParen | TokenKind::Eof
        )
    }

    /// Whether the token after the current one starts right where it ends.
    #[inline]
    pub fn next_is_adjacent_lparen(&self) -> bool {
        let next = self.peek(1);
        matches!(next.kind, TokenKind::LParen) && self.current_span().is_adjacent_to(next.span)
    }

    pub fn advance(&mut self) -> &'a Token {
        let token = self.current();
        if !self.is_at_end() {
            self.pos += 1;
        }
        trace!(token = ?token.kind, "advance");
        token
    }

    pub fn skip_newlines(&mut self) {
        while matches!(self.current_kind(), TokenKind::Newline) {
            self.pos += 1;
        }
    }
}
