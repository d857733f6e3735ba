//! Execution engine for crisp scripts.
//!
//! - [`bindings`]: scoped multi-namespace binding store
//! - [`module`]: module, command and helper contracts with schema-driven
//!   argument processing
//! - [`interpreter`]: the node interpreter with its run and eager modes
//! - [`completion`]: editor completions computed from an eager run
//!
//! Values, the EVM ABI codec, actions and the capability context support
//! those four.

pub mod abi;
pub mod actions;
pub mod bindings;
pub mod completion;
pub mod context;
pub mod errors;
pub mod interpreter;
pub mod module;
pub mod value;

#[cfg(test)]
mod test_support;

pub use actions::{
    Action, BatchedAction, RpcAction, TerminalAction, TransactionAction, WalletAction,
};
pub use bindings::{
    Binding, BindingError, BindingFilter, BindingStore, BindingValue, DataProvider, FrameKind,
    Namespace, SharedBindings,
};
pub use completion::{Completer, CompletionItem, CompletionKind, EagerToken};
pub use context::{ChainClient, EvalMode, ModuleContext, ModuleRegistry, NonceTable, ScriptLogger};
pub use errors::{ErrorOrigin, EvalError, EvalErrorKind, EvalResult};
pub use interpreter::Interpreter;
pub use module::{
    ArgDef, ArgType, ArgValue, BlockScope, CallContext, Command, Definition, Evaluation, Helper,
    Module, OptDef, ResolvedArgs, TypeRegistry,
};
pub use value::{Address, Value};

/// Boxed future used for recursive evaluation.
pub type BoxFuture<'a, T> = std::pin::Pin<Box<dyn std::future::Future<Output = T> + Send + 'a>>;
