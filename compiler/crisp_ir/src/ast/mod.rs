//! AST for crisp scripts.
//!
//! The tree is immutable once parsed: nodes are built by the parser and only
//! ever handed out by shared reference. A node's [`Location`] is fixed at
//! construction time.
//!
//! # Module Structure
//!
//! - `mod.rs`: node types
//! - `query.rs`: [`Ast`] with line-indexed command lookup used by completion

mod query;

pub use query::Ast;

use crate::{Location, NumberParts};
use std::fmt;

/// A node with its optional source location.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Node {
    pub kind: NodeKind,
    pub loc: Option<Location>,
}

impl Node {
    #[inline]
    pub fn new(kind: NodeKind, loc: Location) -> Self {
        Node {
            kind,
            loc: Some(loc),
        }
    }

    /// Node without a location, for synthesized trees in tests and hosts.
    #[inline]
    pub fn synthetic(kind: NodeKind) -> Self {
        Node { kind, loc: None }
    }

    #[inline]
    pub fn as_command(&self) -> Option<&CommandExpression> {
        match &self.kind {
            NodeKind::CommandExpression(c) => Some(c),
            _ => None,
        }
    }

    #[inline]
    pub fn as_block(&self) -> Option<&BlockExpression> {
        match &self.kind {
            NodeKind::BlockExpression(b) => Some(b),
            _ => None,
        }
    }

    /// Stable name of the node's variant, used in error origins.
    pub fn kind_name(&self) -> &'static str {
        match &self.kind {
            NodeKind::AddressLiteral(_) => "AddressLiteral",
            NodeKind::BoolLiteral(_) => "BoolLiteral",
            NodeKind::BytesLiteral(_) => "BytesLiteral",
            NodeKind::NumberLiteral(_) => "NumberLiteral",
            NodeKind::StringLiteral(_) => "StringLiteral",
            NodeKind::VariableIdentifier(_) => "VariableIdentifier",
            NodeKind::ProbableIdentifier(_) => "ProbableIdentifier",
            NodeKind::Bareword(_) => "Bareword",
            NodeKind::CallExpression(_) => "CallExpression",
            NodeKind::HelperFunctionExpression(_) => "HelperFunctionExpression",
            NodeKind::CommandExpression(_) => "CommandExpression",
            NodeKind::BlockExpression(_) => "BlockExpression",
            NodeKind::BinaryExpression(_) => "BinaryExpression",
            NodeKind::AsExpression(_) => "AsExpression",
        }
    }

    /// Name-like payload of the node, if it has one.
    pub fn name(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::VariableIdentifier(s)
            | NodeKind::ProbableIdentifier(s)
            | NodeKind::Bareword(s) => Some(s),
            NodeKind::HelperFunctionExpression(h) => Some(&h.name),
            NodeKind::CommandExpression(c) => Some(&c.name),
            NodeKind::CallExpression(c) => Some(&c.method),
            _ => None,
        }
    }
}

/// Node variants.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeKind {
    AddressLiteral(String),
    BoolLiteral(bool),
    BytesLiteral(String),
    NumberLiteral(NumberParts),
    StringLiteral(String),
    /// `$name`, stored with the sigil.
    VariableIdentifier(String),
    /// Identifier resolved against the binding store, falling back to text.
    ProbableIdentifier(String),
    /// Verbatim text never looked up, e.g. `transfer(address,uint256)`.
    Bareword(String),
    CallExpression(CallExpression),
    HelperFunctionExpression(HelperFunctionExpression),
    CommandExpression(CommandExpression),
    BlockExpression(BlockExpression),
    BinaryExpression(BinaryExpression),
    AsExpression(AsExpression),
}

/// `target::method(args)`: a contract read.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallExpression {
    pub target: Box<Node>,
    pub method: String,
    pub args: Vec<Node>,
}

/// `@name` or `@name(args)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HelperFunctionExpression {
    pub name: String,
    pub args: Vec<Node>,
}

/// `[module:]name arg* (--opt value)*`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandExpression {
    pub name: String,
    pub module: Option<String>,
    pub args: Vec<Node>,
    pub opts: Vec<CommandOpt>,
}

impl CommandExpression {
    /// Name as written, including the module qualifier.
    pub fn qualified_name(&self) -> String {
        match &self.module {
            Some(m) => format!("{m}:{}", self.name),
            None => self.name.clone(),
        }
    }

    /// The trailing block argument, if any.
    pub fn block(&self) -> Option<&Node> {
        self.args
            .last()
            .filter(|n| matches!(n.kind, NodeKind::BlockExpression(_)))
    }
}

/// `--name value`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandOpt {
    pub name: String,
    pub value: Node,
    pub loc: Option<Location>,
}

/// `( command* )`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockExpression {
    pub body: Vec<Node>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BinaryExpression {
    pub op: BinaryOp,
    pub left: Box<Node>,
    pub right: Box<Node>,
}

/// `left as right`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AsExpression {
    pub left: Box<Node>,
    pub right: Box<Node>,
}

/// Arithmetic operators.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

impl BinaryOp {
    /// Binding power: higher binds tighter.
    pub const fn precedence(self) -> u8 {
        match self {
            BinaryOp::Add | BinaryOp::Sub => 1,
            BinaryOp::Mul | BinaryOp::Div => 2,
            BinaryOp::Pow => 3,
        }
    }

    pub const fn is_right_associative(self) -> bool {
        matches!(self, BinaryOp::Pow)
    }

    pub const fn as_symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Pow => "^",
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_symbol())
    }
}
