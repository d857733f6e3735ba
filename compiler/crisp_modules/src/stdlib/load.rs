use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crisp_eval::errors::invalid;
use crisp_eval::{
    Action, ArgDef, ArgType, BindingStore, CallContext, Command, CompletionItem, CompletionKind,
    EvalResult, Module, ModuleContext, ModuleRegistry, Namespace, ResolvedArgs,
};
use crisp_ir::{Node, NodeKind};

/// `load <module> [as <alias>]`
pub(super) struct Load {
    registry: Arc<ModuleRegistry>,
}

impl Load {
    pub(super) fn new(context: &ModuleContext) -> Self {
        Load {
            registry: Arc::clone(&context.registry),
        }
    }
}

fn module_name(node: &Node) -> EvalResult<&str> {
    match &node.kind {
        NodeKind::ProbableIdentifier(name) | NodeKind::StringLiteral(name) => Ok(name),
        _ => Err(invalid(format!(
            "expected a module name, found {}",
            node.kind_name()
        ))),
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
        let node = args
            .node("module")
            .ok_or_else(|| invalid("missing module name"))?;
        let (name, alias) = match &node.kind {
            NodeKind::AsExpression(expr) => {
                (module_name(&expr.left)?, Some(module_name(&expr.right)?))
            }
            _ => (module_name(node)?, None),
        };
        let module = ctx.load_module(name, alias)?;
        debug!(module = %module.name, "load");
        Ok(Vec::new())
    }

    fn complete(&self, arg: &str, cache: &BindingStore) -> Option<Vec<CompletionItem>> {
        (arg == "module").then(|| {
            self.registry
                .available()
                .into_iter()
                .filter(|name| !cache.has_binding(name, Namespace::Module))
                .map(|name| CompletionItem::new(name, CompletionKind::Module))
                .collect()
        })
    }
}
