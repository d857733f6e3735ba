//! Transaction building shared by commands that produce transactions.

use num_bigint::{BigInt, Sign};

use crisp_eval::errors::invalid;
use crisp_eval::{
    Address, ArgType, CallContext, EvalResult, OptDef, ResolvedArgs, TransactionAction, Value,
};

/// `--value`, `--from` and `--gas`.
pub(crate) const TX_OPTS: &[OptDef] = &[
    OptDef::new("value", ArgType::Number),
    OptDef::new("from", ArgType::Address),
    OptDef::new("gas", ArgType::Number),
];

/// A transaction to `to` carrying `data`, with chain and sender taken from
/// the client and the common options applied.
///
/// During eager evaluation the chain id and sender stay unset.
pub(crate) async fn build(
    to: Address,
    data: Vec<u8>,
    args: &ResolvedArgs<'_>,
    ctx: &CallContext<'_>,
) -> EvalResult<TransactionAction> {
    let mut tx = TransactionAction::new(to, data);
    if let Some(value) = args.opt("value") {
        tx.value = non_negative("value", value)?;
    }
    if let Some(gas) = args.opt("gas") {
        tx.gas = Some(non_negative("gas", gas)?);
    }
    tx.chain_id = ctx.chain_id().await?;
    tx.from = match args.opt("from") {
        Some(Value::Address(from)) => Some(*from),
        _ => ctx.signer().await?,
    };
    Ok(tx)
}

fn non_negative(opt: &str, value: &Value) -> EvalResult<BigInt> {
    match value {
        Value::Number(n) if n.sign() == Sign::Minus => {
            Err(invalid(format!("--{opt} cannot be negative")))
        }
        Value::Number(n) => Ok(n.clone()),
        _ => Ok(BigInt::default()),
    }
}

/// A function signature argument such as `transfer(address,uint256)`.
pub(crate) fn signature<'a>(args: &'a ResolvedArgs<'_>, name: &str) -> EvalResult<&'a str> {
    match args.require(name)? {
        Value::String(s) => Ok(s),
        other => Err(invalid(format!(
            "expected a function signature, found {other}"
        ))),
    }
}
