//! Argument and arithmetic grammar.
//!
//! ```text
//! argument  := atom ("as" atom)?
//! atom      := literal | VARIABLE | helper | call | signature | WORD | group
//! helper    := HELPER ("(" arguments ")")?      -- "(" must touch the name
//! call      := (WORD | VARIABLE | ADDRESS) "::" WORD "(" arguments ")"
//! signature := WORD "(" ... ")"                 -- "(" must touch the name
//! group     := block | "(" binary ")"
//! binary    := operand (OP operand)*            -- precedence climbing
//! ```

use crisp_diagnostic::ErrorCode;
use crisp_ir::{
    AsExpression, BinaryExpression, BinaryOp, CallExpression, HelperFunctionExpression, Node,
    NodeKind, Span, TokenKind,
};
use tracing::trace;

use crate::error::{Failure, FatalParseError, ParseError, Unclosed};
use crate::stack::ensure_sufficient_stack;
use crate::Parser;

fn binary_op(kind: &TokenKind) -> Option<BinaryOp> {
    Some(match kind {
        TokenKind::Plus => BinaryOp::Add,
        TokenKind::Minus => BinaryOp::Sub,
        TokenKind::Star => BinaryOp::Mul,
        TokenKind::Slash => BinaryOp::Div,
        TokenKind::Caret => BinaryOp::Pow,
        _ => return None,
    })
}

impl Parser<'_> {
    /// Parse one positional argument or option value.
    pub(crate) fn parse_argument(&mut self) -> Result<Node, Failure> {
        let start = self.cursor.current_span();
        let left = self.parse_atom()?;
        if !matches!(self.cursor.current_kind(), TokenKind::Word(w) if w == "as") {
            return Ok(left);
        }
        self.cursor.advance();
        if self.cursor.at_command_end() {
            return Err(ParseError::new(
                ErrorCode::E1002,
                "expected a name after `as`",
                self.cursor.previous_span(),
            )
            .into());
        }
        let right = self.parse_atom()?;
        let span = self.span_from(start);
        Ok(Node::new(
            NodeKind::AsExpression(AsExpression {
                left: Box::new(left),
                right: Box::new(right),
            }),
            self.loc(span),
        ))
    }

    fn parse_atom(&mut self) -> Result<Node, Failure> {
        let token = self.cursor.current();
        let span = token.span;
        let kind = match &token.kind {
            TokenKind::Address(a) => NodeKind::AddressLiteral(a.clone()),
            TokenKind::Bytes(b) => NodeKind::BytesLiteral(b.clone()),
            TokenKind::Number(n) => NodeKind::NumberLiteral(n.clone()),
            TokenKind::String(s) => NodeKind::StringLiteral(s.clone()),
            TokenKind::True => NodeKind::BoolLiteral(true),
            TokenKind::False => NodeKind::BoolLiteral(false),
            TokenKind::Variable(v) => NodeKind::VariableIdentifier(v.clone()),
            TokenKind::Helper(_) => return self.parse_helper(),
            TokenKind::Word(_) if self.cursor.next_is_adjacent_lparen() => {
                return self.parse_signature();
            }
            TokenKind::Word(w) => NodeKind::ProbableIdentifier(w.clone()),
            TokenKind::LParen => return self.parse_group(),
            TokenKind::Error => return Err(Failure::Reported),
            other => return Err(ParseError::unexpected(other, span, "an argument").into()),
        };
        self.cursor.advance();
        let node = Node::new(kind, self.loc(span));
        self.maybe_call(node, span)
    }

    /// `target::method(args)` if a `::` follows an address, variable or word.
    fn maybe_call(&mut self, target: Node, start: Span) -> Result<Node, Failure> {
        let callable = matches!(
            target.kind,
            NodeKind::AddressLiteral(_)
                | NodeKind::VariableIdentifier(_)
                | NodeKind::ProbableIdentifier(_)
        );
        if !callable || !self.cursor.check(&TokenKind::ColonColon) {
            return Ok(target);
        }
        self.cursor.advance();

        let method = match self.cursor.current_kind() {
            TokenKind::Word(m) => m.clone(),
            other => {
                return Err(ParseError::unexpected(
                    other,
                    self.cursor.current_span(),
                    "a method name after `::`",
                )
                .into())
            }
        };
        self.cursor.advance();
        if !self.cursor.check(&TokenKind::LParen) {
            return Err(ParseError::unexpected(
                self.cursor.current_kind(),
                self.cursor.current_span(),
                "`(` after the method name",
            )
            .into());
        }
        let args = self.parse_arg_list()?;
        let span = self.span_from(start);
        Ok(Node::new(
            NodeKind::CallExpression(CallExpression {
                target: Box::new(target),
                method,
                args,
            }),
            self.loc(span),
        ))
    }

    /// `@name` or `@name(args)`.
    fn parse_helper(&mut self) -> Result<Node, Failure> {
        let start = self.cursor.current_span();
        let with_args = self.cursor.next_is_adjacent_lparen();
        let TokenKind::Helper(name) = self.cursor.advance().kind.clone() else {
            return Err(Failure::Reported);
        };
        let args = if with_args {
            self.parse_arg_list()?
        } else {
            Vec::new()
        };
        let span = self.span_from(start);
        Ok(Node::new(
            NodeKind::HelperFunctionExpression(HelperFunctionExpression { name, args }),
            self.loc(span),
        ))
    }

    /// A word touching `(`, kept verbatim up to the balancing `)`.
    ///
    /// A second group touching the first declares return types:
    /// `balanceOf(address)(uint256)`.
    fn parse_signature(&mut self) -> Result<Node, Failure> {
        let start = self.cursor.advance().span;
        loop {
            self.skip_balanced_group(start)?;
            let touching = self.cursor.check(&TokenKind::LParen)
                && self
                    .cursor
                    .previous_span()
                    .is_adjacent_to(self.cursor.current_span());
            if !touching {
                break;
            }
        }
        let span = self.span_from(start);
        let text = self.text(span).to_string();
        trace!(signature = %text, "bareword");
        Ok(Node::new(NodeKind::Bareword(text), self.loc(span)))
    }

    /// Consume one `( ... )` group of a signature, nested parens included.
    fn skip_balanced_group(&mut self, start: Span) -> Result<(), Failure> {
        let mut depth = 0usize;
        loop {
            match self.cursor.current_kind() {
                TokenKind::Newline | TokenKind::Eof => {
                    return Err(ParseError::unclosed_signature(self.span_from(start)).into());
                }
                TokenKind::LParen => depth += 1,
                TokenKind::RParen => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        self.cursor.advance();
                        return Ok(());
                    }
                }
                _ => {}
            }
            self.cursor.advance();
        }
    }

    /// `( argument (, argument)* )`; the cursor is on the `(`.
    fn parse_arg_list(&mut self) -> Result<Vec<Node>, Failure> {
        let open = self.cursor.advance().span;
        self.within_group(open, |p| {
            let mut args = Vec::new();
            if p.cursor.check(&TokenKind::RParen) {
                p.cursor.advance();
                return Ok(args);
            }
            loop {
                args.push(p.parse_argument()?);
                match p.cursor.current_kind() {
                    TokenKind::Comma => {
                        p.cursor.advance();
                    }
                    TokenKind::RParen => {
                        p.cursor.advance();
                        return Ok(args);
                    }
                    TokenKind::Eof => return Err(p.unclosed_group(open)),
                    other => {
                        return Err(ParseError::unexpected(
                            other,
                            p.cursor.current_span(),
                            "`,` or `)`",
                        )
                        .into())
                    }
                }
            }
        })
    }

    /// Block or arithmetic; the cursor is on the `(`.
    ///
    /// It is a block when the `(` ends the line, or when a word follows that
    /// is not the left operand of an operator or a `::` call. `(print)` is a
    /// one-command block.
    fn parse_group(&mut self) -> Result<Node, Failure> {
        let is_block = match &self.cursor.peek(1).kind {
            TokenKind::Newline | TokenKind::RParen => true,
            TokenKind::Word(_) => {
                let after = &self.cursor.peek(2).kind;
                !(after.is_operator() || matches!(after, TokenKind::ColonColon))
            }
            _ => false,
        };
        if is_block {
            self.parse_block()
        } else {
            self.parse_arith_group()
        }
    }

    fn parse_arith_group(&mut self) -> Result<Node, Failure> {
        ensure_sufficient_stack(|| {
            let open = self.cursor.advance().span;
            self.within_group(open, |p| {
                let mut expr = p.parse_binary(0)?;
                match p.cursor.current_kind() {
                    TokenKind::RParen => {
                        p.cursor.advance();
                    }
                    TokenKind::Eof => return Err(p.unclosed_group(open)),
                    other => {
                        return Err(ParseError::unexpected(
                            other,
                            p.cursor.current_span(),
                            "an operator or `)`",
                        )
                        .into())
                    }
                }
                expr.loc = Some(p.loc(p.span_from(open)));
                Ok(expr)
            })
        })
    }

    /// Precedence climbing. Operators of equal precedence loop instead of
    /// recursing, so long left-associative chains use constant stack.
    fn parse_binary(&mut self, min_prec: u8) -> Result<Node, Failure> {
        let start = self.cursor.current_span();
        let mut left = self.parse_operand()?;
        while let Some(op) = binary_op(self.cursor.current_kind()) {
            if op.precedence() < min_prec {
                break;
            }
            self.cursor.advance();
            let next_min = if op.is_right_associative() {
                op.precedence()
            } else {
                op.precedence() + 1
            };
            let right = ensure_sufficient_stack(|| self.parse_binary(next_min))?;
            let span = self.span_from(start);
            left = Node::new(
                NodeKind::BinaryExpression(BinaryExpression {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                }),
                self.loc(span),
            );
        }
        Ok(left)
    }

    fn parse_operand(&mut self) -> Result<Node, Failure> {
        match self.cursor.current_kind() {
            TokenKind::LParen => self.parse_arith_group(),
            TokenKind::Number(_)
            | TokenKind::Variable(_)
            | TokenKind::Helper(_)
            | TokenKind::Word(_)
            | TokenKind::Address(_) => self.parse_atom(),
            TokenKind::Error => Err(Failure::Reported),
            other => Err(ParseError::unexpected(
                other,
                self.cursor.current_span(),
                "a number, variable or helper",
            )
            .into()),
        }
    }

    fn unclosed_group(&self, open: Span) -> Failure {
        FatalParseError::Unclosed {
            what: Unclosed::Group,
            span: open,
            loc: self.loc(open),
        }
        .into()
    }

    /// Run `f` inside a parenthesized group opened at `open`.
    ///
    /// On a recoverable failure the rest of the group is skipped, through its
    /// closing `)` if that is on the same line, so the enclosing command does
    /// not mistake it for the end of a block.
    fn within_group<T>(
        &mut self,
        open: Span,
        f: impl FnOnce(&mut Self) -> Result<T, Failure>,
    ) -> Result<T, Failure> {
        let result = f(self);
        if matches!(result, Err(Failure::Syntax(_) | Failure::Reported)) {
            self.close_group_after_error();
            trace!(%open, "skipped rest of group");
        }
        result
    }

    fn close_group_after_error(&mut self) {
        let mut depth = 0usize;
        loop {
            match self.cursor.current_kind() {
                TokenKind::Newline | TokenKind::Eof => return,
                TokenKind::LParen => depth += 1,
                TokenKind::RParen if depth == 0 => {
                    self.cursor.advance();
                    return;
                }
                TokenKind::RParen => depth -= 1,
                _ => {}
            }
            self.cursor.advance();
        }
    }
}
