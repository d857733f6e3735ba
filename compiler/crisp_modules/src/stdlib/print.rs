use async_trait::async_trait;

use crisp_eval::{
    Action, ArgDef, ArgType, CallContext, Command, EvalResult, Module, ResolvedArgs,
    TerminalAction,
};

/// `print <value>...`, joined by spaces.
pub(super) struct Print;

#[async_trait]
impl Command for Print {
    fn args(&self) -> &[ArgDef] {
        const ARGS: &[ArgDef] = &[ArgDef::new("values", ArgType::Any).rest()];
        ARGS
    }

    async fn run(
        &self,
        module: &Module,
        args: ResolvedArgs<'_>,
        ctx: &CallContext<'_>,
    ) -> EvalResult<Vec<Action>> {
        let message = args
            .rest("values")
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" ");
        ctx.logger().info(&module.name, message.clone());
        Ok(vec![Action::Terminal(TerminalAction { message })])
    }
}
