use async_trait::async_trait;
use num_traits::ToPrimitive;
use serde_json::json;

use crisp_eval::errors::invalid;
use crisp_eval::{
    Action, ArgDef, ArgType, BindingStore, CallContext, Command, CompletionItem, CompletionKind,
    EvalResult, Module, ResolvedArgs, Value, WalletAction,
};

/// Network names `switch` accepts, with their chain ids.
pub(super) const NETWORKS: &[(&str, u64)] = &[
    ("arbitrum", 42161),
    ("gnosis", 100),
    ("goerli", 5),
    ("mainnet", 1),
    ("optimism", 10),
    ("polygon", 137),
    ("sepolia", 11_155_111),
];

/// `switch <chain>` asks the wallet to change network.
pub(super) struct Switch;

fn chain_id(value: &Value) -> EvalResult<Option<u64>> {
    match value {
        Value::Number(n) => n
            .to_u64()
            .filter(|id| *id > 0)
            .map(Some)
            .ok_or_else(|| invalid(format!("`{n}` is not a valid chain id"))),
        Value::String(name) => NETWORKS
            .iter()
            .find(|(network, _)| network.eq_ignore_ascii_case(name))
            .map(|(_, id)| Some(*id))
            .ok_or_else(|| {
                invalid(format!("unknown network `{name}`")).with_note(format!(
                    "known networks: {}",
                    NETWORKS.iter().map(|(n, _)| *n).collect::<Vec<_>>().join(", ")
                ))
            }),
        Value::Placeholder => Ok(None),
        other => Err(invalid(format!("expected a chain id or network name, found {other}"))),
    }
}

#[async_trait]
impl Command for Switch {
    fn args(&self) -> &[ArgDef] {
        const ARGS: &[ArgDef] = &[ArgDef::new("chain", ArgType::Any)];
        ARGS
    }

    async fn run(
        &self,
        _module: &Module,
        args: ResolvedArgs<'_>,
        _ctx: &CallContext<'_>,
    ) -> EvalResult<Vec<Action>> {
        let Some(id) = chain_id(args.require("chain")?)? else {
            return Ok(Vec::new());
        };
        Ok(vec![Action::Wallet(WalletAction {
            method: "wallet_switchEthereumChain".to_string(),
            params: json!([{ "chainId": format!("{id:#x}") }]),
        })])
    }

    fn complete(&self, arg: &str, _cache: &BindingStore) -> Option<Vec<CompletionItem>> {
        (arg == "chain").then(|| {
            NETWORKS
                .iter()
                .map(|(name, _)| CompletionItem::new(*name, CompletionKind::Value))
                .collect()
        })
    }
}
