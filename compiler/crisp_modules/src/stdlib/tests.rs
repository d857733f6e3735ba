#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use num_bigint::BigInt;
use pretty_assertions::assert_eq;
use serde_json::json;

use crisp_eval::value::keccak256;
use crisp_eval::{
    Action, Address, ChainClient, Completer, EvalErrorKind, EvalMode, ModuleContext, Namespace,
    Value,
};
use crisp_ir::LineCol;

use crate::default_registry;
use crate::test_support::{interpreter, parse, run, MemoryChain, CHAIN_ID, SIGNER};

const ONE: &str = "0x0000000000000000000000000000000000000001";
const TWO: &str = "0x0000000000000000000000000000000000000002";

fn word(n: u64) -> String {
    format!("{n:064x}")
}

fn terminal(actions: &[Action]) -> Vec<String> {
    actions
        .iter()
        .filter_map(|a| match a {
            Action::Terminal(t) => Some(t.message.clone()),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn test_exec_encodes_call() {
    let actions = run(&format!("exec {ONE} transfer(address,uint256) {TWO} 5e18"))
        .await
        .unwrap();
    let tx = actions[0].as_transaction().unwrap();
    assert_eq!(tx.to, Address::from_low_u64(1));
    assert_eq!(
        hex::encode(&tx.data),
        format!("a9059cbb{}{}", word(2), word(5_000_000_000_000_000_000))
    );
    assert_eq!(tx.chain_id, Some(CHAIN_ID));
    assert_eq!(tx.from, Some(SIGNER));
    assert_eq!(tx.value, BigInt::default());
}

#[tokio::test]
async fn test_exec_options() {
    let source = format!("exec {ONE} deposit() --value 2e18 --from {TWO} --gas 50000");
    let actions = run(&source).await.unwrap();
    let tx = actions[0].as_transaction().unwrap();
    assert_eq!(tx.value, BigInt::from(2_000_000_000_000_000_000u64));
    assert_eq!(tx.from, Some(Address::from_low_u64(2)));
    assert_eq!(tx.gas, Some(BigInt::from(50_000u32)));
}

#[tokio::test]
async fn test_exec_rejects_negative_value() {
    let err = run(&format!("exec {ONE} deposit() --value (0 - 1)"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, EvalErrorKind::Invalid);
    assert!(err.message.contains("--value cannot be negative"));
}

#[tokio::test]
async fn test_exec_param_count_mismatch() {
    let err = run(&format!("exec {ONE} transfer(address,uint256) {TWO}"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, EvalErrorKind::Invalid);
}

#[tokio::test]
async fn test_exec_in_eager_mode_leaves_chain_unset() {
    let interp = interpreter(Arc::new(MemoryChain::default()), EvalMode::Eager);
    let actions = interp
        .run(&parse(&format!("exec {ONE} transfer(address,uint256) @me 1")))
        .await
        .unwrap();
    let tx = actions[0].as_transaction().unwrap();
    assert_eq!(tx.chain_id, None);
    assert_eq!(tx.from, None);
    // `@me` was skipped, so its slot encodes as zero.
    assert_eq!(&tx.data[4..36], &[0u8; 32]);
}

#[tokio::test]
async fn test_raw() {
    let actions = run(&format!("raw {ONE} 0xdeadbeef --value 1")).await.unwrap();
    let tx = actions[0].as_transaction().unwrap();
    assert_eq!(tx.data, vec![0xde, 0xad, 0xbe, 0xef]);
    assert_eq!(tx.value, BigInt::from(1u32));
}

#[tokio::test]
async fn test_set_overwrites_and_print_joins() {
    let chain = Arc::new(MemoryChain::default());
    let interp = interpreter(chain, EvalMode::Run);
    let actions = interp
        .run(&parse("set $a 1\nset $a 2\nprint \"a is\" $a\n"))
        .await
        .unwrap();
    assert_eq!(terminal(&actions), vec!["a is 2"]);
    let logged = interp.context().logger.entries();
    assert_eq!(logged.len(), 1);
    assert_eq!(logged[0].message, "a is 2");
}

#[tokio::test]
async fn test_switch() {
    let actions = run("switch mainnet\nswitch 137\n").await.unwrap();
    let params: Vec<_> = actions
        .iter()
        .map(|a| match a {
            Action::Wallet(w) => {
                assert_eq!(w.method, "wallet_switchEthereumChain");
                w.params.clone()
            }
            other => panic!("unexpected {other:?}"),
        })
        .collect();
    assert_eq!(
        params,
        vec![json!([{ "chainId": "0x1" }]), json!([{ "chainId": "0x89" }])]
    );

    let err = run("switch narnia").await.unwrap_err();
    assert_eq!(err.kind, EvalErrorKind::Invalid);
    assert!(err.notes[0].starts_with("known networks:"));
}

#[tokio::test]
async fn test_batch_groups_transactions() {
    let source = format!(
        "batch (\n  exec {ONE} pause()\n  raw {TWO} 0x01\n)\n"
    );
    let actions = run(&source).await.unwrap();
    assert_eq!(actions.len(), 1);
    let Action::Batched(batch) = &actions[0] else {
        panic!("expected a batch, got {:?}", actions[0]);
    };
    assert_eq!(batch.actions.len(), 2);
    assert_eq!(batch.chain_id, Some(CHAIN_ID));
    assert_eq!(batch.from, Some(SIGNER));
}

#[tokio::test]
async fn test_batch_rejects_other_actions_and_mixed_senders() {
    let err = run(&format!("batch (\n  exec {ONE} pause()\n  print hi\n)\n"))
        .await
        .unwrap_err();
    assert!(err.message.contains("found a terminal action"));

    let err = run(&format!(
        "batch (\n  exec {ONE} pause()\n  exec {ONE} pause() --from {TWO}\n)\n"
    ))
    .await
    .unwrap_err();
    assert!(err.message.contains("share a sender"));

    let err = run("batch (\n)\n").await.unwrap_err();
    assert!(err.message.contains("no transactions"));
}

#[tokio::test]
async fn test_load() {
    let chain = Arc::new(MemoryChain::default());
    let interp = interpreter(chain, EvalMode::Run);
    interp.run(&parse("load aragonos as ar")).await.unwrap();
    let store = interp.bindings().read();
    assert!(store.has_binding("aragonos", Namespace::Module));
    assert!(store.has_binding("ar", Namespace::Module));
    drop(store);

    let err = run("load ipfs").await.unwrap_err();
    assert_eq!(err.kind, EvalErrorKind::NotFound);
    assert_eq!(err.notes, vec!["available modules: aragonos, std".to_string()]);

    let err = run("load 5").await.unwrap_err();
    assert!(err.message.contains("expected a module name"));
}

#[tokio::test]
async fn test_id_helper() {
    let actions = run("print @id(\"CREATE_VOTES_ROLE\")").await.unwrap();
    let expected = Value::Bytes(keccak256(b"CREATE_VOTES_ROLE").to_vec());
    assert_eq!(terminal(&actions), vec![expected.to_string()]);
}

#[tokio::test]
async fn test_me_helper() {
    let actions = run("print @me").await.unwrap();
    assert_eq!(terminal(&actions), vec![SIGNER.to_string()]);

    let interp = interpreter(Arc::new(MemoryChain::default()), EvalMode::Eager);
    interp.run(&parse("set $me @me")).await.unwrap();
    let store = interp.bindings().read();
    let value = store.get_binding_value("$me", Namespace::User).cloned();
    assert_eq!(
        value.and_then(|v| v.as_value().cloned()),
        Some(Value::Placeholder)
    );
}

#[tokio::test]
async fn test_get_helper_reads_contract() {
    let mut reply = [0u8; 32];
    reply[31] = 7;
    let chain = Arc::new(MemoryChain::replying(reply));
    let interp = interpreter(Arc::clone(&chain), EvalMode::Run);
    let actions = interp
        .run(&parse(&format!(
            "print @get({ONE}, balanceOf(address)(uint256), @me)"
        )))
        .await
        .unwrap();
    assert_eq!(terminal(&actions), vec!["7"]);

    let reads = chain.reads.lock();
    assert_eq!(reads.len(), 1);
    assert_eq!(reads[0].0, Address::from_low_u64(1));
    assert_eq!(hex::encode(&reads[0].1[..4]), "70a08231");
}

#[tokio::test]
async fn test_get_helper_connection_failure() {
    let err = run(&format!("print @get({ONE}, totalSupply())"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, EvalErrorKind::Connection);
}

#[tokio::test]
async fn test_command_completions() {
    let interp = interpreter(Arc::new(MemoryChain::default()), EvalMode::Run);
    interp
        .run(&parse(&format!("exec {ONE} pause()\nload aragonos\n")))
        .await
        .unwrap();
    let std = interp.loaded_module("std").unwrap();
    let exec = std.command("exec").await.unwrap();
    let load = std.command("load").await.unwrap();
    let switch = std.command("switch").await.unwrap();
    let store = interp.bindings().read();

    let labels: Vec<String> = exec
        .complete("signature", &store)
        .unwrap()
        .into_iter()
        .map(|i| i.label)
        .collect();
    assert_eq!(labels, vec!["pause()"]);
    assert!(exec.complete("target", &store).is_none());

    // Every bundled module is loaded by now.
    assert!(load.complete("module", &store).unwrap().is_empty());

    assert!(switch
        .complete("chain", &store)
        .unwrap()
        .iter()
        .any(|i| i.label == "mainnet"));
}

#[tokio::test]
async fn test_completion_leaves_host_logger_untouched() {
    let client: Arc<dyn ChainClient> = Arc::new(MemoryChain::default());
    let context = ModuleContext::new(Some(client), Arc::new(default_registry()));
    let logger = context.logger.clone();
    let completer = Completer::new(context);
    let ast = parse("print \"hello\"\nset $a 1\n\n");

    for _ in 0..2 {
        completer
            .complete(&ast, LineCol::new(3, 0))
            .await
            .unwrap();
    }
    assert!(logger.entries().is_empty());
}
