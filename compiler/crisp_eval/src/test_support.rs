//! Modules and a chain client for unit tests.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use num_bigint::BigInt;

use crisp_ir::{Ast, Node, NodeKind};

use crate::actions::{Action, TerminalAction, TransactionAction};
use crate::bindings::{Binding, BindingValue, Namespace};
use crate::context::{ChainClient, EvalMode, ModuleContext, ModuleRegistry};
use crate::errors::{invalid, EvalResult};
use crate::interpreter::Interpreter;
use crate::module::{
    ArgDef, ArgType, BlockScope, CallContext, Command, Helper, Module, OptDef, ResolvedArgs,
};
use crate::value::{Address, Value};

pub(crate) const SIGNER: u64 = 0x5157;
pub(crate) const BURN: u64 = 0xdead;

/// Answers every read with the word `42` and counts reads.
#[derive(Default)]
pub(crate) struct MockClient {
    pub calls: AtomicUsize,
}

#[async_trait]
impl ChainClient for MockClient {
    async fn chain_id(&self) -> EvalResult<u64> {
        Ok(4)
    }

    async fn signer(&self) -> EvalResult<Address> {
        Ok(Address::from_low_u64(SIGNER))
    }

    async fn call(&self, _to: Address, _data: &[u8]) -> EvalResult<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut word = vec![0u8; 32];
        word[31] = 42;
        Ok(word)
    }

    async fn send_transaction(&self, _tx: &TransactionAction) -> EvalResult<String> {
        Ok("0x01".to_string())
    }
}

/// `load <name> [as alias]`
struct Load;

fn word(node: &Node) -> EvalResult<String> {
    match &node.kind {
        NodeKind::ProbableIdentifier(w) | NodeKind::StringLiteral(w) => Ok(w.clone()),
        _ => Err(invalid("expected a module name")),
    }
}

#[async_trait]
impl Command for Load {
    fn args(&self) -> &[ArgDef] {
        const ARGS: &[ArgDef] = &[ArgDef::new("module", ArgType::Raw)];
        ARGS
    }

    async fn run(
        &self,
        _module: &Module,
        args: ResolvedArgs<'_>,
        ctx: &CallContext<'_>,
    ) -> EvalResult<Vec<Action>> {
        let node = args.node("module").ok_or_else(|| invalid("missing module"))?;
        let (name, alias) = match &node.kind {
            NodeKind::AsExpression(e) => (word(&e.left)?, Some(word(&e.right)?)),
            _ => (word(node)?, None),
        };
        ctx.load_module(&name, alias.as_deref())?;
        Ok(Vec::new())
    }
}

struct Set;

#[async_trait]
impl Command for Set {
    fn args(&self) -> &[ArgDef] {
        const ARGS: &[ArgDef] = &[
            ArgDef::new("variable", ArgType::Variable),
            ArgDef::new("value", ArgType::Any),
        ];
        ARGS
    }

    async fn run(
        &self,
        _module: &Module,
        args: ResolvedArgs<'_>,
        ctx: &CallContext<'_>,
    ) -> EvalResult<Vec<Action>> {
        let name = args.variable("variable").unwrap_or_default().to_string();
        let value = args.require("value")?.clone();
        ctx.bindings().write().set_binding(
            &name,
            Some(BindingValue::Value(value)),
            Namespace::User,
            false,
            true,
        )?;
        Ok(Vec::new())
    }
}

struct Emit;

#[async_trait]
impl Command for Emit {
    fn args(&self) -> &[ArgDef] {
        const ARGS: &[ArgDef] = &[ArgDef::new("values", ArgType::Any).rest()];
        ARGS
    }

    async fn run(
        &self,
        _module: &Module,
        args: ResolvedArgs<'_>,
        _ctx: &CallContext<'_>,
    ) -> EvalResult<Vec<Action>> {
        Ok(args
            .rest("values")
            .iter()
            .map(|v| {
                Action::Terminal(TerminalAction {
                    message: v.to_string(),
                })
            })
            .collect())
    }
}

/// `scope <name> ( ... )` binds `$scoped` inside its block.
struct Scope;

#[async_trait]
impl Command for Scope {
    fn args(&self) -> &[ArgDef] {
        const ARGS: &[ArgDef] = &[
            ArgDef::new("name", ArgType::String),
            ArgDef::new("body", ArgType::Block),
        ];
        ARGS
    }

    fn block_scope(
        &self,
        _module: &Module,
        args: &ResolvedArgs<'_>,
        _ctx: &CallContext<'_>,
    ) -> EvalResult<BlockScope> {
        let name = args.require("name")?.clone();
        Ok(BlockScope {
            module: Some("extra".to_string()).filter(|_| name == Value::from("extra")),
            bindings: vec![Binding::new(
                "$scoped",
                Namespace::User,
                Some(BindingValue::Value(name)),
            )],
        })
    }

    async fn run(
        &self,
        module: &Module,
        args: ResolvedArgs<'_>,
        ctx: &CallContext<'_>,
    ) -> EvalResult<Vec<Action>> {
        let scope = self.block_scope(module, &args, ctx)?;
        let body = args
            .block("body")
            .ok_or_else(|| invalid("missing block"))?;
        ctx.interpret_block(body, scope).await
    }
}

/// `pair <a> [b]`
struct Pair;

#[async_trait]
impl Command for Pair {
    fn args(&self) -> &[ArgDef] {
        const ARGS: &[ArgDef] = &[
            ArgDef::new("a", ArgType::Number),
            ArgDef::new("b", ArgType::Number).optional(),
        ];
        ARGS
    }

    async fn run(
        &self,
        _module: &Module,
        args: ResolvedArgs<'_>,
        _ctx: &CallContext<'_>,
    ) -> EvalResult<Vec<Action>> {
        let b = args.value("b").map_or("-".to_string(), ToString::to_string);
        Ok(vec![Action::Terminal(TerminalAction {
            message: format!("{} {b}", args.require("a")?),
        })])
    }
}

/// `send <to> <amount> [--gas n]`
struct Transfer;

#[async_trait]
impl Command for Transfer {
    fn args(&self) -> &[ArgDef] {
        const ARGS: &[ArgDef] = &[
            ArgDef::new("to", ArgType::Address),
            ArgDef::new("amount", ArgType::Number),
        ];
        ARGS
    }

    fn opts(&self) -> &[OptDef] {
        const OPTS: &[OptDef] = &[OptDef::new("gas", ArgType::Number)];
        OPTS
    }

    async fn run(
        &self,
        _module: &Module,
        args: ResolvedArgs<'_>,
        ctx: &CallContext<'_>,
    ) -> EvalResult<Vec<Action>> {
        let to = args.address("to")?.unwrap_or_default();
        let mut tx = TransactionAction::new(to, Vec::new());
        tx.value = args.require("amount")?.as_number().cloned().unwrap_or_default();
        tx.chain_id = ctx.chain_id().await?;
        tx.from = ctx.signer().await?;
        tx.gas = args.opt("gas").and_then(Value::as_number).cloned();
        Ok(vec![Action::Transaction(tx)])
    }
}

struct Double;

#[async_trait]
impl Helper for Double {
    fn args(&self) -> &[ArgDef] {
        const ARGS: &[ArgDef] = &[ArgDef::new("n", ArgType::Number)];
        ARGS
    }

    async fn run(
        &self,
        _module: &Module,
        args: Vec<Value>,
        _ctx: &CallContext<'_>,
    ) -> EvalResult<Value> {
        match &args[0] {
            Value::Number(n) => Ok(Value::Number(n * 2u32)),
            other => Ok(other.clone()),
        }
    }
}

/// Reads from the chain, so eager runs get a placeholder.
struct Balance;

#[async_trait]
impl Helper for Balance {
    fn args(&self) -> &[ArgDef] {
        const ARGS: &[ArgDef] = &[ArgDef::new("who", ArgType::Address)];
        ARGS
    }

    fn is_pure(&self) -> bool {
        false
    }

    async fn run(
        &self,
        _module: &Module,
        args: Vec<Value>,
        ctx: &CallContext<'_>,
    ) -> EvalResult<Value> {
        let who = args[0].as_address().unwrap_or_default();
        let word = ctx.client()?.call(who, &[]).await?;
        Ok(Value::Number(BigInt::from_bytes_be(
            num_bigint::Sign::Plus,
            &word,
        )))
    }
}

struct Ping;

#[async_trait]
impl Command for Ping {
    fn args(&self) -> &[ArgDef] {
        &[]
    }

    async fn run(
        &self,
        module: &Module,
        _args: ResolvedArgs<'_>,
        _ctx: &CallContext<'_>,
    ) -> EvalResult<Vec<Action>> {
        Ok(vec![Action::Terminal(TerminalAction {
            message: format!("pong from {}", module.display_name()),
        })])
    }
}

pub(crate) fn registry() -> ModuleRegistry {
    let mut registry = ModuleRegistry::new();
    registry
        .register("std", |ctx| {
            Module::new("std", ctx)
                .with_command("load", Load)
                .with_command("set", Set)
                .with_command("emit", Emit)
                .with_command("scope", Scope)
                .with_command("pair", Pair)
                .with_command("send", Transfer)
                .with_helper("double", Double)
                .with_helper("balance", Balance)
        })
        .register("extra", |ctx| {
            Module::new("extra", ctx)
                .with_command("ping", Ping)
                .with_lazy_command("late", || async {
                    let command: Arc<dyn Command> = Arc::new(Ping);
                    command
                })
                .with_constant("BURN", Value::Address(Address::from_low_u64(BURN)))
                .with_type("even", |v| {
                    v.as_number().is_some_and(|n| (n % 2u32) == BigInt::default())
                })
        });
    registry
}

pub(crate) fn context(client: Option<Arc<MockClient>>, mode: EvalMode) -> ModuleContext {
    let client = client.map(|c| -> Arc<dyn ChainClient> { c });
    ModuleContext::new(client, Arc::new(registry())).with_mode(mode)
}

pub(crate) fn interpreter() -> Interpreter {
    Interpreter::new(context(Some(Arc::new(MockClient::default())), EvalMode::Run))
}

pub(crate) fn parse(source: &str) -> Ast {
    let output = crisp_parse::parse(source).unwrap();
    assert!(output.errors.is_empty(), "{:?}", output.errors);
    output.ast
}

pub(crate) fn messages(actions: &[Action]) -> Vec<String> {
    actions
        .iter()
        .filter_map(|a| match a {
            Action::Terminal(t) => Some(t.message.clone()),
            _ => None,
        })
        .collect()
}
