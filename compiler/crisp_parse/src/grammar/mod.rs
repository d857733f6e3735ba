//! Script, command and block grammar.
//!
//! ```text
//! script  := (command? NEWLINE)*
//! command := WORD argument* (OPTION argument)*
//! block   := "(" (command? NEWLINE)* ")"
//! ```

mod expr;

use crisp_diagnostic::ErrorCode;
use crisp_ir::{BlockExpression, CommandExpression, CommandOpt, Node, NodeKind, Span, TokenKind};
use tracing::trace;

use crate::error::{Failure, FatalParseError, ParseError, Unclosed};
use crate::recovery::synchronize;
use crate::stack::ensure_sufficient_stack;
use crate::Parser;

impl Parser<'_> {
    pub(crate) fn parse_script(&mut self) -> Result<Vec<Node>, FatalParseError> {
        let mut body = Vec::new();
        loop {
            self.cursor.skip_newlines();
            match self.cursor.current_kind() {
                TokenKind::Eof => break,
                TokenKind::RParen => {
                    let span = self.cursor.current_span();
                    self.errors.push(ParseError::new(
                        ErrorCode::E1001,
                        "unexpected `)` with no open block",
                        span,
                    ));
                    self.cursor.advance();
                }
                _ => {
                    if let Some(command) = self.parse_command()? {
                        body.push(command);
                    }
                }
            }
        }
        Ok(body)
    }

    /// Record a recoverable failure and skip to the end of the command.
    pub(crate) fn recover(&mut self, failure: Failure) -> Result<(), FatalParseError> {
        match failure {
            Failure::Syntax(err) => self.errors.push(err),
            Failure::Reported => {}
            Failure::Fatal(err) => return Err(err),
        }
        let skipped = synchronize(&mut self.cursor);
        trace!(skipped, "resynchronized");
        Ok(())
    }

    /// Parse one command. `None` when the line does not start with a name.
    ///
    /// A command that fails part-way is still returned with the arguments
    /// parsed before the error.
    pub(crate) fn parse_command(&mut self) -> Result<Option<Node>, FatalParseError> {
        let start = self.cursor.current_span();
        let word = match self.cursor.current_kind() {
            TokenKind::Word(word) => word,
            TokenKind::Error => {
                self.recover(Failure::Reported)?;
                return Ok(None);
            }
            other => {
                let err = ParseError::expected_command(other, start);
                self.recover(err.into())?;
                return Ok(None);
            }
        };
        self.cursor.advance();

        let (module, name) = match word.split_once(':') {
            Some((module, name)) => (Some(module.to_string()), name.to_string()),
            None => (None, word.clone()),
        };

        let mut args = Vec::new();
        let mut opts = Vec::new();
        if let Err(failure) = self.parse_command_tail(&mut args, &mut opts) {
            self.recover(failure)?;
        }

        let span = self.span_from(start);
        let command = CommandExpression {
            name,
            module,
            args,
            opts,
        };
        Ok(Some(Node::new(
            NodeKind::CommandExpression(command),
            self.loc(span),
        )))
    }

    fn parse_command_tail(
        &mut self,
        args: &mut Vec<Node>,
        opts: &mut Vec<CommandOpt>,
    ) -> Result<(), Failure> {
        let mut seen_block = false;
        while !self.cursor.at_command_end() {
            if let TokenKind::Option(name) = self.cursor.current_kind() {
                let start = self.cursor.current_span();
                self.cursor.advance();
                if self.cursor.at_command_end()
                    || matches!(self.cursor.current_kind(), TokenKind::Option(_))
                {
                    self.errors
                        .push(ParseError::option_without_value(name, start));
                    continue;
                }
                let value = self.parse_argument()?;
                let span = self.span_from(start);
                opts.push(CommandOpt {
                    name: name.clone(),
                    value,
                    loc: Some(self.loc(span)),
                });
                continue;
            }

            let start = self.cursor.current_span();
            let arg = self.parse_argument()?;
            if seen_block {
                return Err(ParseError::block_not_last(self.span_from(start)).into());
            }
            seen_block = matches!(arg.kind, NodeKind::BlockExpression(_));
            args.push(arg);
        }
        Ok(())
    }

    /// Parse `( command* )`; the cursor is on the `(`.
    pub(crate) fn parse_block(&mut self) -> Result<Node, Failure> {
        ensure_sufficient_stack(|| self.parse_block_inner())
    }

    fn parse_block_inner(&mut self) -> Result<Node, Failure> {
        let open: Span = self.cursor.advance().span;
        let mut body = Vec::new();
        loop {
            self.cursor.skip_newlines();
            match self.cursor.current_kind() {
                TokenKind::RParen => {
                    self.cursor.advance();
                    break;
                }
                TokenKind::Eof => {
                    return Err(FatalParseError::Unclosed {
                        what: Unclosed::Block,
                        span: open,
                        loc: self.loc(open),
                    }
                    .into());
                }
                _ => {
                    if let Some(command) = self.parse_command()? {
                        body.push(command);
                    }
                }
            }
        }
        let span = self.span_from(open);
        Ok(Node::new(
            NodeKind::BlockExpression(BlockExpression { body }),
            self.loc(span),
        ))
    }
}
