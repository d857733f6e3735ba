//! Crisp IR - core data structures shared by the crisp toolchain.
//!
//! - Spans, line/column locations and the line index
//! - Tokens and `TokenList` for lexer output
//! - AST nodes and the line-indexed [`Ast`]

pub mod ast;
mod span;
mod token;

pub use ast::{
    AsExpression, Ast, BinaryExpression, BinaryOp, BlockExpression, CallExpression,
    CommandExpression, CommandOpt, HelperFunctionExpression, Node, NodeKind,
};
pub use span::{LineCol, LineIndex, Location, Span, SpanError};
pub use token::{NumberParts, TimeUnit, Token, TokenKind, TokenList};
