//! Schema-driven argument processing.
//!
//! Steps, in order: block check, arity check, option names, evaluation of
//! value arguments, capture of variable and raw nodes, then type
//! validation. Nothing reaches `run` unless every step passed.

use futures::future::try_join_all;
use rustc_hash::FxHashMap;

use crisp_ir::{CommandExpression, Node, NodeKind};

use super::{ArgDef, ArgType, Command, Evaluation, Helper, Module};
use crate::errors::{invalid, EvalResult};
use crate::interpreter::Interpreter;
use crate::value::{Address, Value};

/// A processed argument.
#[derive(Clone, Debug, PartialEq)]
pub enum ArgValue<'n> {
    Value(Value),
    Rest(Vec<Value>),
    Block(&'n Node),
    /// Name of a `$variable` argument, sigil included.
    Variable(String),
    Node(&'n Node),
    /// An optional argument that was not given.
    Missing,
}

/// Arguments and options after processing.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ResolvedArgs<'n> {
    args: Vec<(&'static str, ArgValue<'n>)>,
    opts: FxHashMap<&'static str, Value>,
}

impl<'n> ResolvedArgs<'n> {
    pub fn get(&self, name: &str) -> Option<&ArgValue<'n>> {
        self.args.iter().find(|(n, _)| *n == name).map(|(_, v)| v)
    }

    pub fn value(&self, name: &str) -> Option<&Value> {
        match self.get(name)? {
            ArgValue::Value(v) => Some(v),
            _ => None,
        }
    }

    /// The value of a required argument.
    pub fn require(&self, name: &str) -> EvalResult<&Value> {
        self.value(name)
            .ok_or_else(|| invalid(format!("missing argument `{name}`")))
    }

    /// An address argument; `None` for a placeholder.
    pub fn address(&self, name: &str) -> EvalResult<Option<Address>> {
        match self.require(name)? {
            Value::Address(a) => Ok(Some(*a)),
            Value::Placeholder => Ok(None),
            other => Err(invalid(format!(
                "argument `{name}` is not an address: {other}"
            ))),
        }
    }

    pub fn rest(&self, name: &str) -> &[Value] {
        match self.get(name) {
            Some(ArgValue::Rest(values)) => values,
            _ => &[],
        }
    }

    pub fn block(&self, name: &str) -> Option<&'n Node> {
        match self.get(name)? {
            ArgValue::Block(node) => Some(node),
            _ => None,
        }
    }

    pub fn variable(&self, name: &str) -> Option<&str> {
        match self.get(name)? {
            ArgValue::Variable(v) => Some(v),
            _ => None,
        }
    }

    pub fn node(&self, name: &str) -> Option<&'n Node> {
        match self.get(name)? {
            ArgValue::Node(node) => Some(node),
            _ => None,
        }
    }

    pub fn opt(&self, name: &str) -> Option<&Value> {
        self.opts.get(name)
    }
}

/// Check the argument count against a schema.
pub(crate) fn check_arity(name: &str, defs: &[ArgDef], found: usize) -> EvalResult<()> {
    let required = defs.iter().filter(|d| !d.optional && !d.rest).count();
    let optional = defs.iter().filter(|d| d.optional).count();
    let has_rest = defs.iter().any(|d| d.rest);

    let ok = if has_rest {
        found >= required
    } else {
        (required..=required + optional).contains(&found)
    };
    if ok {
        return Ok(());
    }
    let expected = if has_rest {
        format!("at least {required}")
    } else if optional == 0 {
        required.to_string()
    } else {
        format!("between {required} and {}", required + optional)
    };
    Err(invalid(format!(
        "`{name}` expects {expected} argument(s), found {found}"
    )))
}

async fn evaluate_all(
    interp: &Interpreter,
    nodes: &[&Node],
    evaluation: Evaluation,
) -> EvalResult<Vec<Value>> {
    match evaluation {
        Evaluation::Sequential => {
            let mut values = Vec::with_capacity(nodes.len());
            for node in nodes {
                values.push(interp.interpret_node(node).await?);
            }
            Ok(values)
        }
        Evaluation::Concurrent => {
            try_join_all(nodes.iter().map(|node| interp.interpret_node(node))).await
        }
    }
}

enum Slot<'n> {
    Ready(ArgValue<'n>),
    One,
    Many(usize),
}

/// Process a command's arguments and options against its schema.
pub(crate) async fn process_command_args<'n>(
    interp: &Interpreter,
    module: &Module,
    command: &dyn Command,
    expr: &'n CommandExpression,
) -> EvalResult<ResolvedArgs<'n>> {
    let defs = command.args();
    let mut nodes: &'n [Node] = &expr.args;

    let mut block = None;
    if let Some(def) = defs.last().filter(|d| d.ty == ArgType::Block) {
        match nodes.split_last() {
            Some((last, rest)) if matches!(last.kind, NodeKind::BlockExpression(_)) => {
                block = Some((def.name, last));
                nodes = rest;
            }
            _ => return Err(invalid(format!("{} must be a block expression", def.name))),
        }
    }
    let positional = if block.is_some() {
        &defs[..defs.len() - 1]
    } else {
        defs
    };
    check_arity(&expr.name, positional, nodes.len())?;

    for opt in &expr.opts {
        if !command.opts().iter().any(|d| d.name == opt.name) {
            return Err(invalid(format!(
                "unknown option `--{}` for `{}`",
                opt.name, expr.name
            ))
            .with_loc(opt.loc));
        }
    }

    let mut slots = Vec::with_capacity(defs.len());
    let mut to_eval: Vec<&'n Node> = Vec::new();
    let mut next = 0;
    for def in positional {
        if def.rest {
            let rest = &nodes[next.min(nodes.len())..];
            to_eval.extend(rest);
            slots.push((def, Slot::Many(rest.len())));
            next = nodes.len();
            continue;
        }
        let Some(node) = nodes.get(next) else {
            slots.push((def, Slot::Ready(ArgValue::Missing)));
            continue;
        };
        next += 1;
        let slot = match def.ty {
            ArgType::Variable => match &node.kind {
                NodeKind::VariableIdentifier(name) => Slot::Ready(ArgValue::Variable(name.clone())),
                _ => {
                    return Err(invalid(format!("{} must be a variable", def.name))
                        .with_loc(node.loc))
                }
            },
            ArgType::Raw => Slot::Ready(ArgValue::Node(node)),
            _ => {
                to_eval.push(node);
                Slot::One
            }
        };
        slots.push((def, slot));
    }

    let mut values = evaluate_all(interp, &to_eval, command.evaluation())
        .await?
        .into_iter();

    let mut args = Vec::with_capacity(defs.len());
    for (def, slot) in slots {
        let value = match slot {
            Slot::Ready(v) => v,
            Slot::One => {
                let value = values.next().unwrap_or(Value::Placeholder);
                module.types.validate(def.name, def.ty, &value)?;
                ArgValue::Value(value)
            }
            Slot::Many(count) => {
                let rest: Vec<Value> = values.by_ref().take(count).collect();
                for value in &rest {
                    module.types.validate(def.name, def.ty, value)?;
                }
                ArgValue::Rest(rest)
            }
        };
        args.push((def.name, value));
    }
    if let Some((name, node)) = block {
        args.push((name, ArgValue::Block(node)));
    }

    let mut opts = FxHashMap::default();
    for opt in &expr.opts {
        let Some(def) = command.opts().iter().find(|d| d.name == opt.name) else {
            continue;
        };
        let value = interp.interpret_node(&opt.value).await?;
        module.types.validate(def.name, def.ty, &value)?;
        opts.insert(def.name, value);
    }

    Ok(ResolvedArgs { args, opts })
}

/// Process a helper's arguments into positional values.
pub(crate) async fn process_helper_args(
    interp: &Interpreter,
    module: &Module,
    name: &str,
    helper: &dyn Helper,
    nodes: &[Node],
) -> EvalResult<Vec<Value>> {
    let defs = helper.args();
    check_arity(name, defs, nodes.len())?;
    let nodes: Vec<&Node> = nodes.iter().collect();
    let values = evaluate_all(interp, &nodes, Evaluation::Sequential).await?;
    for (i, value) in values.iter().enumerate() {
        let def = defs.get(i).filter(|d| !d.rest).or_else(|| defs.last().filter(|d| d.rest));
        if let Some(def) = def {
            module.types.validate(def.name, def.ty, value)?;
        }
    }
    Ok(values)
}
