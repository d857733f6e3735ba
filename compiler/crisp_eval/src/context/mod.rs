//! Capability context handed to modules.
//!
//! A module never sees the interpreter itself: it gets a [`ModuleContext`]
//! with the chain client, a nonce table, a logger and the module registry.
//! In eager mode the client is withheld, so completion cannot reach the
//! chain.

mod registry;

pub use registry::{ModuleConstructor, ModuleRegistry};

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::actions::TransactionAction;
use crate::errors::{missing_capability, EvalResult};
use crate::value::Address;

/// Access to a chain.
#[async_trait]
pub trait ChainClient: Send + Sync {
    async fn chain_id(&self) -> EvalResult<u64>;

    /// Account transactions are sent from.
    async fn signer(&self) -> EvalResult<Address>;

    /// Read-only contract call.
    async fn call(&self, to: Address, data: &[u8]) -> EvalResult<Vec<u8>>;

    /// Submit a transaction; returns its hash.
    async fn send_transaction(&self, tx: &TransactionAction) -> EvalResult<String>;
}

/// Interpretation mode.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum EvalMode {
    /// Full run; capability calls are made.
    #[default]
    Run,
    /// Speculative run for completion; capability calls are skipped.
    Eager,
}

impl EvalMode {
    #[inline]
    pub fn is_eager(self) -> bool {
        self == EvalMode::Eager
    }
}

/// Per-address transaction counters.
#[derive(Clone, Debug, Default)]
pub struct NonceTable(Arc<Mutex<FxHashMap<Address, u64>>>);

impl NonceTable {
    /// Return the current nonce of `address` and advance it.
    pub fn next(&self, address: Address) -> u64 {
        let mut table = self.0.lock();
        let slot = table.entry(address).or_insert(0);
        let nonce = *slot;
        *slot += 1;
        nonce
    }

    pub fn peek(&self, address: Address) -> u64 {
        self.0.lock().get(&address).copied().unwrap_or(0)
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct LogEntry {
    pub level: LogLevel,
    pub module: String,
    pub message: String,
}

/// Module-facing logger. Lines go to `tracing` and are kept for the host.
#[derive(Clone, Debug)]
pub struct ScriptLogger {
    entries: Arc<Mutex<Vec<LogEntry>>>,
    traced: bool,
}

impl Default for ScriptLogger {
    fn default() -> Self {
        ScriptLogger {
            entries: Arc::default(),
            traced: true,
        }
    }
}

impl ScriptLogger {
    /// A private logger that keeps entries but emits no `tracing` events.
    pub fn detached() -> Self {
        ScriptLogger {
            entries: Arc::default(),
            traced: false,
        }
    }

    pub fn log(&self, level: LogLevel, module: &str, message: impl Into<String>) {
        let message = message.into();
        if self.traced {
            match level {
                LogLevel::Info => tracing::info!(target: "crisp::script", module, "{message}"),
                LogLevel::Warn => tracing::warn!(target: "crisp::script", module, "{message}"),
                LogLevel::Error => tracing::error!(target: "crisp::script", module, "{message}"),
            }
        }
        self.entries.lock().push(LogEntry {
            level,
            module: module.to_string(),
            message,
        });
    }

    pub fn info(&self, module: &str, message: impl Into<String>) {
        self.log(LogLevel::Info, module, message);
    }

    pub fn warn(&self, module: &str, message: impl Into<String>) {
        self.log(LogLevel::Warn, module, message);
    }

    /// Everything logged so far.
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().clone()
    }
}

/// Capabilities shared by every module of one interpretation.
#[derive(Clone)]
pub struct ModuleContext {
    client: Option<Arc<dyn ChainClient>>,
    pub nonces: NonceTable,
    pub logger: ScriptLogger,
    pub registry: Arc<ModuleRegistry>,
    pub mode: EvalMode,
}

impl ModuleContext {
    pub fn new(client: Option<Arc<dyn ChainClient>>, registry: Arc<ModuleRegistry>) -> Self {
        ModuleContext {
            client,
            nonces: NonceTable::default(),
            logger: ScriptLogger::default(),
            registry,
            mode: EvalMode::Run,
        }
    }

    /// The same capabilities in another mode.
    ///
    /// Eager mode gets a detached logger; module lines never reach the host.
    #[must_use]
    pub fn with_mode(mut self, mode: EvalMode) -> Self {
        if mode.is_eager() {
            self.logger = ScriptLogger::detached();
        }
        self.mode = mode;
        self
    }

    /// The chain client; unavailable in eager mode.
    pub fn client(&self) -> EvalResult<&Arc<dyn ChainClient>> {
        if self.mode.is_eager() {
            return Err(missing_capability("the chain client"));
        }
        self.client
            .as_ref()
            .ok_or_else(|| missing_capability("the chain client").with_note("no client configured"))
    }

    pub fn has_client(&self) -> bool {
        self.client.is_some()
    }
}

impl fmt::Debug for ModuleContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleContext")
            .field("has_client", &self.client.is_some())
            .field("mode", &self.mode)
            .field("modules", &self.registry.available())
            .finish_non_exhaustive()
    }
}
