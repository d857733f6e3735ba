use async_trait::async_trait;
use tracing::debug;

use crisp_eval::{
    Action, ArgDef, ArgType, CallContext, Command, EvalResult, Module, OptDef, ResolvedArgs, Value,
};

use crate::tx;

/// What an Aragon agent exposes for arbitrary calls.
const EXECUTE: &str = "execute(address,uint256,bytes)";

/// `act <agent> <target> <signature> [param]... [--value n] [--from addr] [--gas n]`
///
/// The agent performs the call, forwarding `--value` from its own balance.
pub(super) struct Act;

#[async_trait]
impl Command for Act {
    fn args(&self) -> &[ArgDef] {
        const ARGS: &[ArgDef] = &[
            ArgDef::new("agent", ArgType::Address),
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
        let agent = args.address("agent")?.unwrap_or_default();
        let target = args.address("target")?.unwrap_or_default();
        let inner = ctx.fragment(tx::signature(&args, "signature")?)?;
        let call = inner.encode_call(args.rest("params"))?;

        let mut tx = tx::build(agent, Vec::new(), &args, ctx).await?;
        let forwarded = std::mem::take(&mut tx.value);
        tx.data = ctx.fragment(EXECUTE)?.encode_call(&[
            Value::Address(target),
            Value::Number(forwarded),
            Value::Bytes(call),
        ])?;
        debug!(%agent, %target, signature = %inner.canonical(), "act");
        Ok(vec![Action::Transaction(tx)])
    }
}
