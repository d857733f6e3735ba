//! Module, command and helper contracts.
//!
//! A [`Module`] is a named bundle of commands and helpers sharing one
//! [`ModuleContext`]. Each entry is a [`Definition`]: either the
//! implementation itself or an async loader resolved once on first use.
//!
//! # Module Structure
//!
//! - `mod.rs`: definitions, traits and the module type
//! - `args.rs`: schema-driven argument processing
//! - `call.rs`: the context handed to `run`
//! - `types.rs`: argument types and validators

mod args;
mod call;
mod types;

pub(crate) use args::{process_command_args, process_helper_args};
pub use args::{ArgValue, ResolvedArgs};
pub use call::{CallContext, CommandContext, HelperContext};
pub use types::{ArgType, TypeRegistry, Validator};

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use rustc_hash::FxHashMap;
use tokio::sync::OnceCell;

use crate::actions::Action;
use crate::bindings::{Binding, BindingStore};
use crate::completion::CompletionItem;
use crate::context::ModuleContext;
use crate::errors::EvalResult;
use crate::value::Value;
use crate::BoxFuture;

/// Async zero-argument loader of a lazy definition.
pub type Loader<T> = Box<dyn Fn() -> BoxFuture<'static, Arc<T>> + Send + Sync>;

/// A command or helper implementation, available now or on first use.
pub enum Definition<T: ?Sized> {
    Eager(Arc<T>),
    Lazy {
        loader: Loader<T>,
        cell: OnceCell<Arc<T>>,
    },
}

impl<T: ?Sized + Send + Sync> Definition<T> {
    pub fn lazy<F, Fut>(loader: F) -> Self
    where
        T: 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Arc<T>> + Send + 'static,
    {
        Definition::Lazy {
            loader: Box::new(move || -> BoxFuture<'static, Arc<T>> { Box::pin(loader()) }),
            cell: OnceCell::new(),
        }
    }

    /// The implementation, running the loader at most once.
    pub async fn resolve(&self) -> Arc<T> {
        match self {
            Definition::Eager(imp) => Arc::clone(imp),
            Definition::Lazy { loader, cell } => Arc::clone(cell.get_or_init(|| loader()).await),
        }
    }

    pub fn is_loaded(&self) -> bool {
        match self {
            Definition::Eager(_) => true,
            Definition::Lazy { cell, .. } => cell.initialized(),
        }
    }
}

impl<T: ?Sized> fmt::Debug for Definition<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Definition::Eager(_) => f.write_str("Eager"),
            Definition::Lazy { cell, .. } if cell.initialized() => f.write_str("Lazy(loaded)"),
            Definition::Lazy { .. } => f.write_str("Lazy"),
        }
    }
}

/// One positional argument of a schema.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct ArgDef {
    pub name: &'static str,
    pub ty: ArgType,
    pub optional: bool,
    /// Takes every remaining argument.
    pub rest: bool,
}

impl ArgDef {
    pub const fn new(name: &'static str, ty: ArgType) -> Self {
        ArgDef {
            name,
            ty,
            optional: false,
            rest: false,
        }
    }

    #[must_use]
    pub const fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    #[must_use]
    pub const fn rest(mut self) -> Self {
        self.rest = true;
        self
    }
}

/// A `--name value` option.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct OptDef {
    pub name: &'static str,
    pub ty: ArgType,
}

impl OptDef {
    pub const fn new(name: &'static str, ty: ArgType) -> Self {
        OptDef { name, ty }
    }
}

/// How sibling arguments are evaluated.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
pub enum Evaluation {
    #[default]
    Sequential,
    /// Independent arguments, evaluated together.
    Concurrent,
}

/// Scope a block-taking command opens around its block.
#[derive(Clone, Debug, Default)]
pub struct BlockScope {
    /// Module unqualified command names resolve to inside the block.
    pub module: Option<String>,
    pub bindings: Vec<Binding>,
}

/// A command: `name arg* (--opt value)*`.
#[async_trait]
pub trait Command: Send + Sync {
    fn args(&self) -> &[ArgDef];

    fn opts(&self) -> &[OptDef] {
        &[]
    }

    fn evaluation(&self) -> Evaluation {
        Evaluation::Sequential
    }

    /// Scope opened around the block argument. Eager evaluation uses it to
    /// reproduce the bindings visible inside a block without running the
    /// command.
    fn block_scope(
        &self,
        _module: &Module,
        _args: &ResolvedArgs<'_>,
        _ctx: &CallContext<'_>,
    ) -> EvalResult<BlockScope> {
        Ok(BlockScope::default())
    }

    async fn run(
        &self,
        module: &Module,
        args: ResolvedArgs<'_>,
        ctx: &CallContext<'_>,
    ) -> EvalResult<Vec<Action>>;

    /// Completions for the argument or option `arg`; `None` uses the
    /// defaults for its type.
    fn complete(&self, _arg: &str, _cache: &BindingStore) -> Option<Vec<CompletionItem>> {
        None
    }
}

/// A helper: `@name(args)`.
#[async_trait]
pub trait Helper: Send + Sync {
    fn args(&self) -> &[ArgDef];

    /// Pure helpers run during eager evaluation; others yield a placeholder.
    fn is_pure(&self) -> bool {
        true
    }

    /// `args` are positional, with a rest argument flattened at the end.
    async fn run(&self, module: &Module, args: Vec<Value>, ctx: &CallContext<'_>)
        -> EvalResult<Value>;
}

/// A named bundle of commands and helpers.
pub struct Module {
    pub name: String,
    pub alias: Option<String>,
    commands: FxHashMap<String, Definition<dyn Command>>,
    helpers: FxHashMap<String, Definition<dyn Helper>>,
    pub types: TypeRegistry,
    constants: Vec<(String, Value)>,
    pub context: ModuleContext,
}

impl Module {
    pub fn new(name: impl Into<String>, context: ModuleContext) -> Self {
        Module {
            name: name.into(),
            alias: None,
            commands: FxHashMap::default(),
            helpers: FxHashMap::default(),
            types: TypeRegistry::default(),
            constants: Vec::new(),
            context,
        }
    }

    #[must_use]
    pub fn with_command(mut self, name: &str, command: impl Command + 'static) -> Self {
        let command: Arc<dyn Command> = Arc::new(command);
        self.commands
            .insert(name.to_string(), Definition::Eager(command));
        self
    }

    #[must_use]
    pub fn with_lazy_command<F, Fut>(mut self, name: &str, loader: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Arc<dyn Command>> + Send + 'static,
    {
        self.commands
            .insert(name.to_string(), Definition::lazy(loader));
        self
    }

    #[must_use]
    pub fn with_helper(mut self, name: &str, helper: impl Helper + 'static) -> Self {
        let helper: Arc<dyn Helper> = Arc::new(helper);
        self.helpers
            .insert(name.to_string(), Definition::Eager(helper));
        self
    }

    #[must_use]
    pub fn with_lazy_helper<F, Fut>(mut self, name: &str, loader: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Arc<dyn Helper>> + Send + 'static,
    {
        self.helpers.insert(name.to_string(), Definition::lazy(loader));
        self
    }

    #[must_use]
    pub fn with_type(mut self, name: &'static str, validator: Validator) -> Self {
        self.types.register(name, validator);
        self
    }

    #[must_use]
    pub fn with_constant(mut self, name: &str, value: Value) -> Self {
        self.constants.push((name.to_string(), value));
        self
    }

    /// Name scripts use to qualify this module's commands.
    pub fn display_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }

    pub fn has_command(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    pub fn has_helper(&self, name: &str) -> bool {
        self.helpers.contains_key(name)
    }

    pub async fn command(&self, name: &str) -> Option<Arc<dyn Command>> {
        Some(self.commands.get(name)?.resolve().await)
    }

    pub async fn helper(&self, name: &str) -> Option<Arc<dyn Helper>> {
        Some(self.helpers.get(name)?.resolve().await)
    }

    pub fn is_command_loaded(&self, name: &str) -> bool {
        self.commands.get(name).is_some_and(Definition::is_loaded)
    }

    /// Command names, sorted.
    pub fn command_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.commands.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Helper names, sorted.
    pub fn helper_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.helpers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn constants(&self) -> &[(String, Value)] {
        &self.constants
    }
}

impl fmt::Debug for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Module")
            .field("name", &self.name)
            .field("alias", &self.alias)
            .field("commands", &self.command_names())
            .field("helpers", &self.helper_names())
            .finish_non_exhaustive()
    }
}
