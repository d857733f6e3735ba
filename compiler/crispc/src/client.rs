//! A chain client that never touches a network.

use async_trait::async_trait;
use tracing::debug;

use crisp_eval::errors::connection;
use crisp_eval::value::keccak256;
use crisp_eval::{Address, ChainClient, EvalResult, NonceTable, TransactionAction};

use crate::config::RunConfig;

/// Answers identity questions from the run configuration, refuses reads,
/// and "sends" transactions by handing out deterministic hashes.
#[derive(Clone, Debug, Default)]
pub struct DryRunClient {
    chain_id: u64,
    sender: Address,
    nonces: NonceTable,
}

impl DryRunClient {
    pub fn new(config: &RunConfig, nonces: NonceTable) -> Self {
        DryRunClient {
            chain_id: config.chain_id,
            sender: config.sender,
            nonces,
        }
    }
}

#[async_trait]
impl ChainClient for DryRunClient {
    async fn chain_id(&self) -> EvalResult<u64> {
        Ok(self.chain_id)
    }

    async fn signer(&self) -> EvalResult<Address> {
        Ok(self.sender)
    }

    async fn call(&self, to: Address, _data: &[u8]) -> EvalResult<Vec<u8>> {
        Err(connection(format!("cannot read from {to} during a dry run"))
            .with_note("contract reads need a node connection"))
    }

    /// The hash commits to sender, nonce, target and calldata.
    async fn send_transaction(&self, tx: &TransactionAction) -> EvalResult<String> {
        let from = tx.from.unwrap_or(self.sender);
        let nonce = self.nonces.next(from);
        let mut preimage = Vec::with_capacity(20 + 8 + 20 + tx.data.len());
        preimage.extend_from_slice(from.as_bytes());
        preimage.extend_from_slice(&nonce.to_be_bytes());
        preimage.extend_from_slice(tx.to.as_bytes());
        preimage.extend_from_slice(&tx.data);
        let hash = format!("0x{}", hex::encode(keccak256(&preimage)));
        debug!(%from, nonce, %hash, "dry-run send");
        Ok(hash)
    }
}
