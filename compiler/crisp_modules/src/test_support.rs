//! An in-memory chain for module tests.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use crisp_eval::errors::connection;
use crisp_eval::{
    Action, Address, ChainClient, EvalMode, EvalResult, Interpreter, ModuleContext,
    TransactionAction,
};
use crisp_ir::Ast;

use crate::default_registry;

pub(crate) const CHAIN_ID: u64 = 5;
pub(crate) const SIGNER: Address = Address::new([0x11; 20]);

/// Answers reads with a fixed word and records the calldata it saw.
#[derive(Default)]
pub(crate) struct MemoryChain {
    /// `None` makes every read fail.
    pub reply: Option<Vec<u8>>,
    pub reads: Mutex<Vec<(Address, Vec<u8>)>>,
}

impl MemoryChain {
    pub(crate) fn replying(word: [u8; 32]) -> Self {
        MemoryChain {
            reply: Some(word.to_vec()),
            reads: Mutex::default(),
        }
    }
}

#[async_trait]
impl ChainClient for MemoryChain {
    async fn chain_id(&self) -> EvalResult<u64> {
        Ok(CHAIN_ID)
    }

    async fn signer(&self) -> EvalResult<Address> {
        Ok(SIGNER)
    }

    async fn call(&self, to: Address, data: &[u8]) -> EvalResult<Vec<u8>> {
        self.reads.lock().push((to, data.to_vec()));
        self.reply
            .clone()
            .ok_or_else(|| connection("node unreachable"))
    }

    async fn send_transaction(&self, _tx: &TransactionAction) -> EvalResult<String> {
        Ok("0x00".to_string())
    }
}

pub(crate) fn interpreter(chain: Arc<MemoryChain>, mode: EvalMode) -> Interpreter {
    let client: Arc<dyn ChainClient> = chain;
    Interpreter::new(ModuleContext::new(Some(client), Arc::new(default_registry())).with_mode(mode))
}

pub(crate) fn parse(source: &str) -> Ast {
    let output = crisp_parse::parse(source).unwrap();
    assert!(output.errors.is_empty(), "{:?}", output.errors);
    output.ast
}

pub(crate) async fn run(source: &str) -> EvalResult<Vec<Action>> {
    interpreter(Arc::new(MemoryChain::default()), EvalMode::Run)
        .run(&parse(source))
        .await
}
