use async_trait::async_trait;
use tracing::debug;

use crisp_eval::{
    Action, Address, ArgDef, ArgType, BindingFilter, BindingStore, CallContext, Command,
    CompletionItem, CompletionKind, EvalResult, Module, Namespace, OptDef, ResolvedArgs, Value,
};

use crate::tx;

/// `exec <target> <signature> [param]... [--value n] [--from addr] [--gas n]`
pub(super) struct Exec;

#[async_trait]
impl Command for Exec {
    fn args(&self) -> &[ArgDef] {
        const ARGS: &[ArgDef] = &[
            ArgDef::new("target", ArgType::Address),
            ArgDef::new("signature", ArgType::String),
            ArgDef::new("params", ArgType::Any).rest(),
        ];
        ARGS
    }

    fn opts(&self) -> &[OptDef] {
        tx::TX_OPTS
    }

    async fn run(
        &self,
        _module: &Module,
        args: ResolvedArgs<'_>,
        ctx: &CallContext<'_>,
    ) -> EvalResult<Vec<Action>> {
        let target = args.address("target")?.unwrap_or_default();
        let signature = tx::signature(&args, "signature")?;
        let fragment = ctx.fragment(signature)?;
        let data = fragment.encode_call(args.rest("params"))?;
        debug!(%target, signature = %fragment.canonical(), "exec");
        let tx = tx::build(target, data, &args, ctx).await?;
        Ok(vec![Action::Transaction(tx)])
    }

    /// Signatures already used in the script.
    fn complete(&self, arg: &str, cache: &BindingStore) -> Option<Vec<CompletionItem>> {
        (arg == "signature").then(|| {
            cache
                .get_all_bindings(&BindingFilter::namespace(Namespace::Abi))
                .into_iter()
                .map(|b| CompletionItem::new(&b.identifier, CompletionKind::Value))
                .collect()
        })
    }
}

/// `raw <target> <data> [--value n] [--from addr] [--gas n]`
pub(super) struct Raw;

#[async_trait]
impl Command for Raw {
    fn args(&self) -> &[ArgDef] {
        const ARGS: &[ArgDef] = &[
            ArgDef::new("target", ArgType::Address),
            ArgDef::new("data", ArgType::Bytes),
        ];
        ARGS
    }

    fn opts(&self) -> &[OptDef] {
        tx::TX_OPTS
    }

    async fn run(
        &self,
        _module: &Module,
        args: ResolvedArgs<'_>,
        ctx: &CallContext<'_>,
    ) -> EvalResult<Vec<Action>> {
        let target: Address = args.address("target")?.unwrap_or_default();
        let data = match args.require("data")? {
            Value::Bytes(b) => b.clone(),
            _ => Vec::new(),
        };
        let tx = tx::build(target, data, &args, ctx).await?;
        Ok(vec![Action::Transaction(tx)])
    }
}
