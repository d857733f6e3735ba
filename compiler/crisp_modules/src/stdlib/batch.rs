use async_trait::async_trait;
use tracing::debug;

use crisp_eval::errors::invalid;
use crisp_eval::{
    Action, ArgDef, ArgType, BatchedAction, BlockScope, CallContext, Command, EvalResult, Module,
    ResolvedArgs,
};

/// `batch ( commands )` bundles the block's transactions into one action.
pub(super) struct Batch;

#[async_trait]
impl Command for Batch {
    fn args(&self) -> &[ArgDef] {
        const ARGS: &[ArgDef] = &[ArgDef::new("body", ArgType::Block)];
        ARGS
    }

    async fn run(
        &self,
        _module: &Module,
        args: ResolvedArgs<'_>,
        ctx: &CallContext<'_>,
    ) -> EvalResult<Vec<Action>> {
        let body = args.block("body").ok_or_else(|| invalid("missing block"))?;
        let actions = ctx.interpret_block(body, BlockScope::default()).await?;

        let mut txs = Vec::with_capacity(actions.len());
        for action in actions {
            match action {
                Action::Transaction(tx) => txs.push(tx),
                other => {
                    return Err(invalid(format!(
                        "batch can only contain transactions, found a {} action",
                        other.kind()
                    )))
                }
            }
        }
        let Some(first) = txs.first() else {
            return Err(invalid("batch contains no transactions"));
        };
        let (chain_id, from) = (first.chain_id, first.from);
        if txs.iter().any(|tx| tx.chain_id != chain_id) {
            return Err(invalid("batched transactions must target the same chain"));
        }
        if txs.iter().any(|tx| tx.from != from) {
            return Err(invalid("batched transactions must share a sender"));
        }
        debug!(transactions = txs.len(), "batch");
        Ok(vec![Action::Batched(BatchedAction {
            chain_id,
            from,
            actions: txs,
        })])
    }
}
