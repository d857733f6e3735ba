use async_trait::async_trait;

use crisp_eval::errors::{invalid, missing_capability};
use crisp_eval::value::keccak256;
use crisp_eval::{ArgDef, ArgType, CallContext, EvalResult, Helper, Module, Value};

/// `@me`: the sending account.
pub(super) struct Me;

#[async_trait]
impl Helper for Me {
    fn args(&self) -> &[ArgDef] {
        &[]
    }

    fn is_pure(&self) -> bool {
        false
    }

    async fn run(
        &self,
        _module: &Module,
        _args: Vec<Value>,
        ctx: &CallContext<'_>,
    ) -> EvalResult<Value> {
        ctx.signer()
            .await?
            .map(Value::Address)
            .ok_or_else(|| missing_capability("signer"))
    }
}

/// `@id(text)`: keccak-256 of the UTF-8 text, as used for role identifiers.
pub(super) struct Id;

#[async_trait]
impl Helper for Id {
    fn args(&self) -> &[ArgDef] {
        const ARGS: &[ArgDef] = &[ArgDef::new("text", ArgType::String)];
        ARGS
    }

    async fn run(
        &self,
        _module: &Module,
        args: Vec<Value>,
        _ctx: &CallContext<'_>,
    ) -> EvalResult<Value> {
        match args.first() {
            Some(Value::String(text)) => Ok(Value::Bytes(keccak256(text.as_bytes()).to_vec())),
            _ => Ok(Value::Placeholder),
        }
    }
}

/// `@get(target, signature, param...)`: a contract read.
///
/// Return types come from a second group in the signature,
/// `balanceOf(address)(uint256)`, defaulting to one `uint256`.
pub(super) struct Get;

#[async_trait]
impl Helper for Get {
    fn args(&self) -> &[ArgDef] {
        const ARGS: &[ArgDef] = &[
            ArgDef::new("target", ArgType::Address),
            ArgDef::new("signature", ArgType::String),
            ArgDef::new("params", ArgType::Any).rest(),
        ];
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
        let (target, signature, params) = match args.as_slice() {
            [Value::Address(target), Value::String(signature), params @ ..] => {
                (*target, signature, params)
            }
            _ => return Err(invalid("@get expects an address and a signature")),
        };
        let fragment = ctx.fragment(signature)?;
        let data = fragment.encode_call(params)?;
        let output = ctx.client()?.call(target, &data).await?;
        fragment.decode_output(&output)
    }
}
