use async_trait::async_trait;

use crisp_eval::errors::invalid;
use crisp_eval::{
    Action, ArgDef, ArgType, BindingValue, CallContext, Command, EvalResult, Module, Namespace,
    ResolvedArgs,
};

/// `set <$variable> <value>`
///
/// Rebinding a variable in the same scope overwrites it; in an inner scope
/// it shadows the outer binding until the scope ends.
pub(super) struct Set;

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
        let name = args
            .variable("variable")
            .ok_or_else(|| invalid("missing variable"))?
            .to_string();
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
