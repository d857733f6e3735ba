//! Editor completions computed from an eager run.
//!
//! Each request interprets the script prefix with a fresh, disposable
//! binding store and no chain client, then derives items from what that
//! store holds at the cursor. A generation counter makes sure only the most
//! recent request produces items.

mod cursor;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::debug;

use crisp_ir::{Ast, LineCol};

use crate::bindings::{BindingFilter, BindingStore, BindingValue, Namespace};
use crate::context::{EvalMode, ModuleContext};
use crate::interpreter::{Interpreter, STD};
use crate::module::{ArgDef, ArgType};
use crate::value::Value;

use cursor::{slot_at, Slot};

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum CompletionKind {
    Command,
    Module,
    Variable,
    Address,
    Helper,
    Value,
    Snippet,
}

/// One suggestion.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct CompletionItem {
    pub label: String,
    pub insert_text: String,
    pub kind: CompletionKind,
    /// Lower sorts first.
    pub sort_priority: Option<u32>,
    pub is_snippet: bool,
}

impl CompletionItem {
    pub fn new(label: impl Into<String>, kind: CompletionKind) -> Self {
        let label = label.into();
        CompletionItem {
            insert_text: label.clone(),
            label,
            kind,
            sort_priority: None,
            is_snippet: false,
        }
    }

    #[must_use]
    pub fn with_insert_text(mut self, text: impl Into<String>) -> Self {
        self.insert_text = text.into();
        self
    }

    #[must_use]
    pub fn with_priority(mut self, priority: u32) -> Self {
        self.sort_priority = Some(priority);
        self
    }

    #[must_use]
    pub fn snippet(mut self) -> Self {
        self.is_snippet = true;
        self
    }
}

/// Identifies one eager request; stale once a newer one begins.
#[derive(Clone, Debug)]
pub struct EagerToken {
    generation: Arc<AtomicU64>,
    id: u64,
}

impl EagerToken {
    pub fn is_stale(&self) -> bool {
        self.generation.load(Ordering::Acquire) != self.id
    }
}

/// Produces completions for a cursor position.
pub struct Completer {
    context: ModuleContext,
    generation: Arc<AtomicU64>,
}

impl Completer {
    /// `context` is switched to eager mode.
    pub fn new(context: ModuleContext) -> Self {
        Completer {
            context: context.with_mode(EvalMode::Eager),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Start a request, superseding any in flight.
    pub fn begin(&self) -> EagerToken {
        let id = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        EagerToken {
            generation: Arc::clone(&self.generation),
            id,
        }
    }

    pub async fn complete(&self, ast: &Ast, pos: LineCol) -> Option<Vec<CompletionItem>> {
        let token = self.begin();
        self.complete_with(token, ast, pos).await
    }

    /// Items for `pos`, or `None` if `token` was superseded.
    ///
    /// Other eager failures are tolerated: completion uses whatever the
    /// store held when interpretation stopped.
    pub async fn complete_with(
        &self,
        token: EagerToken,
        ast: &Ast,
        pos: LineCol,
    ) -> Option<Vec<CompletionItem>> {
        let interp = Interpreter::new(self.context.clone()).with_token(token.clone());
        match interp.run_eager(ast, pos.line).await {
            Err(e) if e.is_cancelled() => return None,
            Err(e) => debug!(error = %e, "eager evaluation stopped early"),
            Ok(()) => {}
        }
        if token.is_stale() {
            return None;
        }
        let items = items_at(&interp, ast, pos).await;
        (!token.is_stale()).then_some(items)
    }
}

async fn items_at(interp: &Interpreter, ast: &Ast, pos: LineCol) -> Vec<CompletionItem> {
    match slot_at(ast, pos) {
        Slot::CommandName => command_names(interp),
        Slot::Argument { expr, index } => {
            let Ok((_, command)) = interp.find_command(expr).await else {
                return Vec::new();
            };
            let Some(def) = arg_def(command.args(), index) else {
                return Vec::new();
            };
            let helpers = pure_helpers(interp).await;
            let store = interp.bindings().read();
            command
                .complete(def.name, &store)
                .unwrap_or_else(|| defaults_for(def.ty, &store, helpers))
        }
        Slot::OptionValue { expr, name } => {
            let Ok((_, command)) = interp.find_command(expr).await else {
                return Vec::new();
            };
            let Some(def) = command.opts().iter().find(|d| d.name == name).copied() else {
                return Vec::new();
            };
            let helpers = pure_helpers(interp).await;
            let store = interp.bindings().read();
            command
                .complete(def.name, &store)
                .unwrap_or_else(|| defaults_for(def.ty, &store, helpers))
        }
    }
}

fn arg_def(defs: &[ArgDef], index: usize) -> Option<ArgDef> {
    defs.get(index)
        .filter(|d| !d.rest)
        .or_else(|| defs.iter().find(|d| d.rest))
        .copied()
}

/// Commands of the current module and `std` unqualified, other loaded
/// modules qualified, and `load` for every module not loaded yet.
fn command_names(interp: &Interpreter) -> Vec<CompletionItem> {
    let current = interp
        .bindings()
        .read()
        .current_module()
        .map(str::to_string);
    let mut items = Vec::new();
    for module in interp.loaded_modules() {
        let unqualified = module.name == STD || current.as_deref() == Some(module.name.as_str());
        for name in module.command_names() {
            let item = if unqualified {
                CompletionItem::new(name, CompletionKind::Command).with_priority(0)
            } else {
                CompletionItem::new(
                    format!("{}:{name}", module.display_name()),
                    CompletionKind::Command,
                )
                .with_priority(1)
            };
            items.push(item);
        }
    }
    for name in interp.context().registry.available() {
        if interp.loaded_module(&name).is_none() {
            items.push(
                CompletionItem::new(format!("load {name}"), CompletionKind::Module)
                    .with_priority(2),
            );
        }
    }
    items
}

/// Completions derived from an argument type.
fn defaults_for(
    ty: ArgType,
    store: &BindingStore,
    helpers: Vec<CompletionItem>,
) -> Vec<CompletionItem> {
    match ty {
        ArgType::Address => {
            let mut items: Vec<CompletionItem> = store
                .get_all_bindings(&BindingFilter {
                    namespaces: vec![Namespace::Addr],
                    ignore_nulls: true,
                    ..BindingFilter::default()
                })
                .into_iter()
                .map(|b| {
                    CompletionItem::new(&b.identifier, CompletionKind::Address).with_priority(1)
                })
                .collect();
            for provider in store.data_providers() {
                items.extend(provider.identifiers().into_iter().map(|id| {
                    CompletionItem::new(id, CompletionKind::Address).with_priority(1)
                }));
            }
            items.extend(variables(store, |v| matches!(v, Value::Address(_))));
            items
        }
        ArgType::Number => variables(store, |v| matches!(v, Value::Number(_))),
        ArgType::Bool => vec![
            CompletionItem::new("true", CompletionKind::Value),
            CompletionItem::new("false", CompletionKind::Value),
        ],
        ArgType::Block => vec![CompletionItem::new("( ... )", CompletionKind::Snippet)
            .with_insert_text("(\n\t$0\n)")
            .snippet()],
        ArgType::Variable => variables(store, |_| true),
        _ => {
            let mut items = variables(store, |_| true);
            items.extend(helpers);
            items
        }
    }
}

fn variables(store: &BindingStore, keep: impl Fn(&Value) -> bool) -> Vec<CompletionItem> {
    store
        .get_all_bindings(&BindingFilter::namespace(Namespace::User))
        .into_iter()
        .filter(|b| {
            b.value
                .as_ref()
                .and_then(BindingValue::as_value)
                .is_some_and(|v| v.is_placeholder() || keep(v))
        })
        .map(|b| CompletionItem::new(&b.identifier, CompletionKind::Variable).with_priority(0))
        .collect()
}

/// Pure helpers of every loaded module. Lazy helpers get loaded here.
async fn pure_helpers(interp: &Interpreter) -> Vec<CompletionItem> {
    let mut items = Vec::new();
    for module in interp.loaded_modules() {
        for name in module.helper_names() {
            let pure = match module.helper(name).await {
                Some(helper) => helper.is_pure(),
                None => false,
            };
            if !pure {
                continue;
            }
            items.push(
                CompletionItem::new(format!("@{name}"), CompletionKind::Helper).with_priority(2),
            );
        }
    }
    items
}
