//! The node interpreter.
//!
//! One node-interpretation core serves two entry points:
//!
//! - [`Interpreter::run`] interprets a whole script and returns its actions.
//! - [`Interpreter::run_eager`] interprets everything before a cursor line,
//!   against a disposable store and without the chain client, so completion
//!   sees the bindings a real run would have made.
//!
//! Recursive entry points return [`BoxFuture`] so nested blocks and helper
//! arguments can await each other.

mod arith;
mod node;

use std::sync::Arc;

use tracing::{debug, debug_span, trace, Instrument};

use crisp_ir::{Ast, CommandExpression, Node};

use crate::abi::FunctionFragment;
use crate::actions::Action;
use crate::bindings::{BindingFilter, BindingValue, Namespace, SharedBindings};
use crate::completion::EagerToken;
use crate::context::{EvalMode, ModuleContext};
use crate::errors::{cancelled, invalid, not_found, EvalError, EvalResult};
use crate::module::{
    process_command_args, BlockScope, CallContext, Command, Helper, Module,
};
use crate::value::Value;
use crate::BoxFuture;

/// Name of the module every interpreter starts with.
pub const STD: &str = "std";

/// Interprets parsed scripts against a binding store.
pub struct Interpreter {
    bindings: SharedBindings,
    context: ModuleContext,
    token: Option<EagerToken>,
}

impl Interpreter {
    /// A fresh interpreter with `std` loaded.
    pub fn new(context: ModuleContext) -> Self {
        Self::with_bindings(context, SharedBindings::default())
    }

    pub fn with_bindings(context: ModuleContext, bindings: SharedBindings) -> Self {
        let interp = Interpreter {
            bindings,
            context,
            token: None,
        };
        let std = interp
            .context
            .registry
            .instantiate(STD, interp.context.clone())
            .unwrap_or_else(|| Module::new(STD, interp.context.clone()));
        interp.register_module(&Arc::new(std));
        interp
    }

    /// Stop with `Cancelled` once `token` goes stale.
    #[must_use]
    pub fn with_token(mut self, token: EagerToken) -> Self {
        self.token = Some(token);
        self
    }

    pub fn bindings(&self) -> &SharedBindings {
        &self.bindings
    }

    pub fn context(&self) -> &ModuleContext {
        &self.context
    }

    pub fn mode(&self) -> EvalMode {
        self.context.mode
    }

    /// Interpret every top-level command, in order.
    #[tracing::instrument(level = "debug", skip_all, fields(commands = ast.body().len()))]
    pub async fn run(&self, ast: &Ast) -> EvalResult<Vec<Action>> {
        let actions = self.interpret_commands(ast.body()).await?;
        debug!(actions = actions.len(), "run finished");
        Ok(actions)
    }

    /// Interpret everything strictly before `line` (1-based).
    ///
    /// Top-level commands ending before `line` run as usual. For each
    /// command whose block encloses `line`, the block's scope is entered
    /// (and left open) and its body commands before `line` run too, so the
    /// store ends up as it would be at the cursor.
    #[tracing::instrument(level = "debug", skip(self, ast))]
    pub async fn run_eager(&self, ast: &Ast, line: u32) -> EvalResult<()> {
        for node in ast.commands_until_line(line) {
            self.interpret_command(node).await?;
        }
        for node in ast.command_path_at_line(line) {
            let Some(expr) = node.as_command() else {
                break;
            };
            let Some((block, body)) = expr.block().and_then(|b| Some((b, b.as_block()?))) else {
                break;
            };
            if block.loc.map_or(true, |l| l.start.line >= line) {
                break;
            }
            self.enter_command_scope(node, expr).await?;
            for inner in &body.body {
                if inner.loc.is_some_and(|l| l.end.line < line) {
                    self.interpret_command(inner).await?;
                }
            }
        }
        Ok(())
    }

    /// Open the scope `expr` would open around its block, without running it.
    async fn enter_command_scope(&self, node: &Node, expr: &CommandExpression) -> EvalResult<()> {
        let name = expr.qualified_name();
        async {
            let (module, command) = self.find_command(expr).await?;
            let args = process_command_args(self, &module, command.as_ref(), expr).await?;
            let ctx = CallContext {
                interpreter: self,
                module: &module,
                name: &name,
                loc: node.loc,
            };
            let scope = command.block_scope(&module, &args, &ctx)?;
            self.enter_block_scope(scope)
        }
        .await
        .map_err(|e| e.in_command(&name, node.loc))
    }

    /// Interpret commands in order, concatenating their actions.
    pub fn interpret_commands<'a>(
        &'a self,
        nodes: &'a [Node],
    ) -> BoxFuture<'a, EvalResult<Vec<Action>>> {
        Box::pin(async move {
            let mut actions = Vec::new();
            for node in nodes {
                actions.extend(self.interpret_command(node).await?);
            }
            Ok(actions)
        })
    }

    /// Resolve, process and run one command.
    pub fn interpret_command<'a>(
        &'a self,
        node: &'a Node,
    ) -> BoxFuture<'a, EvalResult<Vec<Action>>> {
        Box::pin(async move {
            self.check_token()?;
            let Some(expr) = node.as_command() else {
                return Err(invalid(format!("expected a command, found {}", node.kind_name()))
                    .in_node(node.kind_name(), node.name(), node.loc));
            };
            let name = expr.qualified_name();
            let span = debug_span!("command", name = %name);
            async {
                let (module, command) = self.find_command(expr).await?;
                let args = process_command_args(self, &module, command.as_ref(), expr).await?;
                let ctx = CallContext {
                    interpreter: self,
                    module: &module,
                    name: &name,
                    loc: node.loc,
                };
                let actions = command.run(&module, args, &ctx).await?;
                trace!(actions = actions.len(), "command finished");
                Ok::<_, EvalError>(actions)
            }
            .instrument(span)
            .await
            .map_err(|e| e.in_command(&name, node.loc))
        })
    }

    /// Interpret `block`'s body inside a new scope. The scope is popped even
    /// when a body command fails.
    pub fn interpret_block<'a>(
        &'a self,
        block: &'a Node,
        scope: BlockScope,
    ) -> BoxFuture<'a, EvalResult<Vec<Action>>> {
        Box::pin(async move {
            let Some(body) = block.as_block() else {
                return Err(invalid(format!(
                    "expected a block expression, found {}",
                    block.kind_name()
                )));
            };
            self.enter_block_scope(scope)?;
            let result = self.interpret_commands(&body.body).await;
            self.bindings.write().exit_scope();
            result
        })
    }

    fn enter_block_scope(&self, scope: BlockScope) -> EvalResult<()> {
        let mut store = self.bindings.write();
        store.enter_scope(scope.module.as_deref());
        for binding in scope.bindings {
            store.set_binding_entry(binding, false, true)?;
        }
        Ok(())
    }

    fn check_token(&self) -> EvalResult<()> {
        if self.token.as_ref().is_some_and(EagerToken::is_stale) {
            return Err(cancelled());
        }
        Ok(())
    }

    /// Instantiate `name` through the registry and bind it globally under
    /// its name and `alias`.
    pub fn load_module(&self, name: &str, alias: Option<&str>) -> EvalResult<Arc<Module>> {
        let registry = &self.context.registry;
        if !registry.contains(name) {
            return Err(not_found(format!("module `{name}` not found"))
                .with_note(format!("available modules: {}", registry.available().join(", "))));
        }
        {
            let store = self.bindings.read();
            if store.has_binding(name, Namespace::Module) {
                return Err(invalid(format!("module `{name}` is already loaded")));
            }
            if let Some(alias) = alias.filter(|a| store.has_binding(a, Namespace::Module)) {
                return Err(invalid(format!("alias `{alias}` is already in use")));
            }
        }
        let mut module = registry
            .instantiate(name, self.context.clone())
            .ok_or_else(|| not_found(format!("module `{name}` not found")))?;
        module.alias = alias.map(str::to_string);
        let module = Arc::new(module);
        self.register_module(&module)?;
        debug!(module = name, alias = ?alias, "loaded module");
        Ok(module)
    }

    /// Bind a module globally. Address constants go to `ADDR`; one that
    /// clashes with an existing global address fails the load.
    fn register_module(&self, module: &Arc<Module>) -> EvalResult<()> {
        let mut store = self.bindings.write();
        let value = BindingValue::Module(Arc::clone(module));
        let names = std::iter::once(&module.name).chain(module.alias.as_ref());
        for name in names {
            store.set_binding(name, Some(value.clone()), Namespace::Module, true, false)?;
        }
        for (name, constant) in module.constants() {
            if let Value::Address(_) = constant {
                store.set_binding(
                    name,
                    Some(BindingValue::Value(constant.clone())),
                    Namespace::Addr,
                    true,
                    false,
                )?;
            }
        }
        Ok(())
    }

    /// A loaded module by name or alias.
    pub fn loaded_module(&self, name: &str) -> Option<Arc<Module>> {
        self.bindings
            .read()
            .get_binding_value(name, Namespace::Module)
            .and_then(BindingValue::as_module)
            .cloned()
    }

    /// Every loaded module once, sorted by name.
    pub fn loaded_modules(&self) -> Vec<Arc<Module>> {
        let store = self.bindings.read();
        let mut modules: Vec<Arc<Module>> = Vec::new();
        for binding in store.get_all_bindings(&BindingFilter::namespace(Namespace::Module)) {
            let Some(module) = binding.value.as_ref().and_then(BindingValue::as_module) else {
                continue;
            };
            if !modules.iter().any(|m| Arc::ptr_eq(m, module)) {
                modules.push(Arc::clone(module));
            }
        }
        modules.sort_by(|a, b| a.name.cmp(&b.name));
        modules
    }

    /// Module whose commands unqualified names resolve to first.
    fn current_module(&self) -> Option<Arc<Module>> {
        let current = self.bindings.read().current_module().map(str::to_string);
        current.and_then(|m| self.loaded_module(&m))
    }

    /// `q:name` looks in the module named or aliased `q`; a bare name tries
    /// the current module, then `std`.
    pub async fn find_command(
        &self,
        expr: &CommandExpression,
    ) -> EvalResult<(Arc<Module>, Arc<dyn Command>)> {
        let candidates: Vec<Arc<Module>> = match &expr.module {
            Some(q) => vec![self
                .loaded_module(q)
                .ok_or_else(|| not_found(format!("module `{q}` is not loaded")))?],
            None => self
                .current_module()
                .into_iter()
                .chain(self.loaded_module(STD))
                .collect(),
        };
        for module in &candidates {
            if let Some(command) = module.command(&expr.name).await {
                return Ok((Arc::clone(module), command));
            }
        }
        Err(match candidates.first().filter(|_| expr.module.is_some()) {
            Some(module) => not_found(format!(
                "command `{}` not found in module `{}`",
                expr.name, module.name
            )),
            None => not_found(format!("unknown command `{}`", expr.name)),
        })
    }

    /// Helpers resolve in the current module, then `std`, then any loaded
    /// module.
    pub async fn find_helper(&self, name: &str) -> EvalResult<(Arc<Module>, Arc<dyn Helper>)> {
        let candidates = self
            .current_module()
            .into_iter()
            .chain(self.loaded_module(STD))
            .chain(self.loaded_modules());
        for module in candidates {
            if let Some(helper) = module.helper(name).await {
                return Ok((module, helper));
            }
        }
        Err(not_found(format!("unknown helper `@{name}`")))
    }

    /// Parse `signature`, cached in the `ABI` namespace.
    pub fn fragment(&self, signature: &str) -> EvalResult<Arc<FunctionFragment>> {
        let cached = self
            .bindings
            .read()
            .get_binding_value(signature, Namespace::Abi)
            .and_then(BindingValue::as_abi)
            .cloned();
        if let Some(fragment) = cached {
            return Ok(fragment);
        }
        let fragment = Arc::new(FunctionFragment::parse(signature)?);
        self.bindings.write().set_binding(
            signature,
            Some(BindingValue::Abi(Arc::clone(&fragment))),
            Namespace::Abi,
            true,
            true,
        )?;
        Ok(fragment)
    }
}
