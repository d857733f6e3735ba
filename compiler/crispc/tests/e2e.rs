//! End-to-end tests: script text in, actions or diagnostics out.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use pretty_assertions::assert_eq;

use crisp_diagnostic::ErrorCode;
use crisp_eval::errors::connection;
use crisp_eval::{
    Action, Address, ChainClient, EvalMode, EvalResult, Interpreter, ModuleContext,
    TransactionAction,
};
use crispc::commands::{dry_run_context, evaluate, parse_source, send_all};
use crispc::{DryRunClient, RunConfig};

const TOKEN: &str = "0x00000000000000000000000000000000000000aa";
const HOLDER: &str = "0x00000000000000000000000000000000000000bb";
const KERNEL: &str = "0x000000000000000000000000000000000000000a";
const AGENT: &str = "0x000000000000000000000000000000000000000b";

/// Chain 10, a fixed signer, reads answered with the zero word.
#[derive(Default)]
struct RecordingChain {
    sent: Mutex<Vec<TransactionAction>>,
}

#[async_trait]
impl ChainClient for RecordingChain {
    async fn chain_id(&self) -> EvalResult<u64> {
        Ok(10)
    }

    async fn signer(&self) -> EvalResult<Address> {
        Ok(Address::from_low_u64(0x5e))
    }

    async fn call(&self, _to: Address, _data: &[u8]) -> EvalResult<Vec<u8>> {
        Ok(vec![0; 32])
    }

    async fn send_transaction(&self, tx: &TransactionAction) -> EvalResult<String> {
        let mut sent = self.sent.lock();
        sent.push(tx.clone());
        Ok(format!("0x{:02x}", sent.len()))
    }
}

fn context(chain: Arc<RecordingChain>, mode: EvalMode) -> ModuleContext {
    let client: Arc<dyn ChainClient> = chain;
    ModuleContext::new(Some(client), Arc::new(crisp_modules::default_registry())).with_mode(mode)
}

async fn run(source: &str) -> Result<Vec<Action>, Vec<crisp_diagnostic::Diagnostic>> {
    evaluate(source, context(Arc::default(), EvalMode::Run)).await
}

#[tokio::test]
async fn test_exec_script_produces_calldata() {
    let source = format!("set $x 5e18\nexec {TOKEN} transfer(address,uint256) {HOLDER} $x\n");
    let actions = run(&source).await.unwrap();
    let [Action::Transaction(tx)] = actions.as_slice() else {
        panic!("expected one transaction, got {actions:?}");
    };
    assert_eq!(tx.to, Address::from_low_u64(0xaa));
    assert_eq!(tx.chain_id, Some(10));
    assert_eq!(tx.from, Some(Address::from_low_u64(0x5e)));
    assert_eq!(
        hex::encode(&tx.data),
        format!("a9059cbb{:064x}{:064x}", 0xbb, 5_000_000_000_000_000_000u64)
    );
}

#[tokio::test]
async fn test_actions_serialize_with_type_tags() {
    let actions = run(&format!("print hello\nexec {TOKEN} pause()\n")).await.unwrap();
    let json = serde_json::to_value(&actions).unwrap();
    assert_eq!(json[0]["type"], "terminal");
    assert_eq!(json[0]["message"], "hello");
    assert_eq!(json[1]["type"], "transaction");
    assert_eq!(json[1]["data"], "0x8456cb59");
    assert_eq!(json[1]["value"], "0");
    assert_eq!(json[1]["chainId"], 10);
}

#[tokio::test]
async fn test_aragonos_connect_and_act() {
    let source = format!(
        "load aragonos as ar\n\
         ar:connect {KERNEL} (\n\
         \x20 act {AGENT} {TOKEN} transfer(address,uint256) {HOLDER} 7\n\
         \x20 print $dao\n\
         )\n"
    );
    let actions = run(&source).await.unwrap();
    let kinds: Vec<_> = actions.iter().map(Action::kind).collect();
    assert_eq!(kinds, vec!["transaction", "terminal"]);
    let tx = actions[0].as_transaction().unwrap();
    assert_eq!(tx.to, Address::from_low_u64(0x0b));
    assert_eq!(hex::encode(&tx.data[..4]), "b61d27f6");
}

#[tokio::test]
async fn test_unqualified_module_command_is_not_found() {
    let diagnostics = run(&format!("load aragonos\nconnect {KERNEL} (\n  print hi\n)\n"))
        .await
        .unwrap_err();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code, ErrorCode::E2002);
}

#[tokio::test]
async fn test_parse_errors_become_diagnostics() {
    let diagnostics = run("print (\n").await.unwrap_err();
    assert!(!diagnostics.is_empty());
    assert!(diagnostics.iter().all(|d| d.code.is_syntax_error()));
}

#[tokio::test]
async fn test_eager_run_agrees_with_full_run() {
    let source = "set $a 2\nset $b ($a * 3)\nset $c @id(\"x\")\n";
    let ast = parse_source(source).unwrap();

    let full = Interpreter::new(context(Arc::default(), EvalMode::Run));
    full.run(&ast).await.unwrap();
    let eager = Interpreter::new(context(Arc::default(), EvalMode::Eager));
    eager.run_eager(&ast, u32::MAX).await.unwrap();

    let full = full.bindings().read();
    let eager = eager.bindings().read();
    for name in ["$a", "$b", "$c"] {
        assert_eq!(
            full.get_binding(name, crisp_eval::Namespace::User),
            eager.get_binding(name, crisp_eval::Namespace::User),
            "{name}"
        );
    }
}

#[tokio::test]
async fn test_sent_transactions_keep_source_order() {
    let chain = Arc::new(RecordingChain::default());
    let source = format!(
        "exec {TOKEN} pause()\nbatch (\n  exec {TOKEN} unpause()\n  raw {HOLDER} 0x01\n)\n"
    );
    let actions = evaluate(&source, context(Arc::clone(&chain), EvalMode::Run))
        .await
        .unwrap();
    let client: &dyn ChainClient = chain.as_ref();
    let hashes = send_all(client, &actions).await.unwrap();
    assert_eq!(hashes, vec!["0x01", "0x02", "0x03"]);
    let targets: Vec<_> = chain.sent.lock().iter().map(|tx| tx.to).collect();
    assert_eq!(
        targets,
        vec![
            Address::from_low_u64(0xaa),
            Address::from_low_u64(0xaa),
            Address::from_low_u64(0xbb)
        ]
    );
}

#[tokio::test]
async fn test_dry_run_refuses_contract_reads() {
    let config = RunConfig::default();
    let source = format!("set $b {TOKEN}::balanceOf({HOLDER})\n");
    let diagnostics = evaluate(&source, dry_run_context(&config, EvalMode::Run))
        .await
        .unwrap_err();
    assert_eq!(diagnostics[0].code, ErrorCode::E2003);
}

#[tokio::test]
async fn test_dry_run_hashes_advance_nonces() {
    let config = RunConfig {
        chain_id: 5,
        ..RunConfig::default()
    };
    let context = dry_run_context(&config, EvalMode::Run);
    let client = DryRunClient::new(&config, context.nonces.clone());
    let actions = evaluate(&format!("exec {TOKEN} pause()\nexec {TOKEN} pause()\n"), context)
        .await
        .unwrap();
    let hashes = send_all(&client, &actions).await.unwrap();
    assert_eq!(hashes.len(), 2);
    assert_ne!(hashes[0], hashes[1]);
    assert!(hashes.iter().all(|h| h.len() == 66 && h.starts_with("0x")));
}

#[tokio::test]
async fn test_failing_client_surfaces_connection_error() {
    struct Offline;

    #[async_trait]
    impl ChainClient for Offline {
        async fn chain_id(&self) -> EvalResult<u64> {
            Err(connection("offline"))
        }
        async fn signer(&self) -> EvalResult<Address> {
            Err(connection("offline"))
        }
        async fn call(&self, _to: Address, _data: &[u8]) -> EvalResult<Vec<u8>> {
            Err(connection("offline"))
        }
        async fn send_transaction(&self, _tx: &TransactionAction) -> EvalResult<String> {
            Err(connection("offline"))
        }
    }

    let client: Arc<dyn ChainClient> = Arc::new(Offline);
    let context = ModuleContext::new(Some(client), Arc::new(crisp_modules::default_registry()));
    let diagnostics = evaluate(&format!("exec {TOKEN} pause()\n"), context)
        .await
        .unwrap_err();
    assert_eq!(diagnostics[0].code, ErrorCode::E2003);
}
