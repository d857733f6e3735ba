//! Actions: the interpreter's externally visible output.
//!
//! Actions are serialized with a `type` tag so hosts can dispatch on them.
//! Top-level order is source order and must not be changed by consumers.

use num_bigint::BigInt;
use serde::{Serialize, Serializer};

use crate::value::Address;

fn serialize_hex<S: Serializer>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format!("0x{}", hex::encode(data)))
}

fn serialize_decimal<S: Serializer>(n: &BigInt, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&n.to_string())
}

fn serialize_opt_decimal<S: Serializer>(
    n: &Option<BigInt>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match n {
        Some(n) => serializer.serialize_some(&n.to_string()),
        None => serializer.serialize_none(),
    }
}

/// A unit of externally executable effect.
#[derive(Clone, Eq, PartialEq, Debug, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Action {
    Transaction(TransactionAction),
    /// Executed atomically or not at all.
    Batched(BatchedAction),
    Wallet(WalletAction),
    Rpc(RpcAction),
    Terminal(TerminalAction),
}

impl Action {
    /// The serialized `type` tag.
    pub fn kind(&self) -> &'static str {
        match self {
            Action::Transaction(_) => "transaction",
            Action::Batched(_) => "batched",
            Action::Wallet(_) => "wallet",
            Action::Rpc(_) => "rpc",
            Action::Terminal(_) => "terminal",
        }
    }

    pub fn as_transaction(&self) -> Option<&TransactionAction> {
        match self {
            Action::Transaction(tx) => Some(tx),
            _ => None,
        }
    }
}

#[derive(Clone, Eq, PartialEq, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionAction {
    pub to: Address,
    #[serde(serialize_with = "serialize_hex")]
    pub data: Vec<u8>,
    #[serde(serialize_with = "serialize_decimal")]
    pub value: BigInt,
    pub from: Option<Address>,
    pub chain_id: Option<u64>,
    #[serde(serialize_with = "serialize_opt_decimal")]
    pub gas: Option<BigInt>,
}

impl TransactionAction {
    pub fn new(to: Address, data: Vec<u8>) -> Self {
        TransactionAction {
            to,
            data,
            value: BigInt::default(),
            from: None,
            chain_id: None,
            gas: None,
        }
    }
}

/// Same-chain, same-sender transactions.
#[derive(Clone, Eq, PartialEq, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchedAction {
    pub chain_id: Option<u64>,
    pub from: Option<Address>,
    pub actions: Vec<TransactionAction>,
}

/// A request for the connected wallet, e.g. `wallet_switchEthereumChain`.
#[derive(Clone, Eq, PartialEq, Debug, Serialize)]
pub struct WalletAction {
    pub method: String,
    pub params: serde_json::Value,
}

/// A raw JSON-RPC request for the host's provider.
#[derive(Clone, Eq, PartialEq, Debug, Serialize)]
pub struct RpcAction {
    pub method: String,
    pub params: serde_json::Value,
}

/// Informational output only.
#[derive(Clone, Eq, PartialEq, Debug, Serialize)]
pub struct TerminalAction {
    pub message: String,
}
