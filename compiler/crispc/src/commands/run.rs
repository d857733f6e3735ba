//! The `run` command: interpret a script and hand its actions to the client.

use serde_json::json;

use crisp_diagnostic::{Diagnostic, ErrorCode};
use crisp_eval::context::{LogLevel, ScriptLogger};
use crisp_eval::{Action, ChainClient, EvalMode, EvalResult, TransactionAction};
use crisp_ir::LineIndex;

use super::{block_on, dry_run_context, evaluate, read_file, report};
use crate::client::DryRunClient;
use crate::config::{OutputFormat, RunConfig};

/// Run a script and print its actions; transactions are sent through a
/// [`DryRunClient`].
pub fn run_file(path: &str, config: &RunConfig) {
    let source = read_file(path);
    let context = dry_run_context(config, EvalMode::Run);
    let client = DryRunClient::new(config, context.nonces.clone());
    let logger = context.logger.clone();

    let result = block_on(async {
        let actions = evaluate(&source, context).await?;
        let hashes = send_all(&client, &actions)
            .await
            .map_err(|e| vec![e.to_diagnostic(&LineIndex::new(&source))])?;
        Ok::<_, Vec<_>>((actions, hashes))
    });
    let warnings = module_warnings(&logger);
    let (actions, hashes) = match result {
        Ok(done) => done,
        Err(mut diagnostics) => {
            diagnostics.extend(warnings);
            report(&source, path, &diagnostics, config.format);
            std::process::exit(1);
        }
    };
    if !warnings.is_empty() {
        report(&source, path, &warnings, config.format);
    }

    match config.format {
        OutputFormat::Json => {
            println!("{}", json!({ "actions": actions, "hashes": hashes }));
        }
        OutputFormat::Text => {
            let mut hashes = hashes.iter();
            for action in &actions {
                println!("{}", describe(action));
                for _ in 0..transactions(action).len() {
                    if let Some(hash) = hashes.next() {
                        println!("  sent {hash}");
                    }
                }
            }
        }
    }
}

/// Warnings modules logged during the run, as diagnostics.
fn module_warnings(logger: &ScriptLogger) -> Vec<Diagnostic> {
    logger
        .entries()
        .into_iter()
        .filter(|entry| entry.level == LogLevel::Warn)
        .map(|entry| {
            Diagnostic::warning(ErrorCode::W2001)
                .with_message(entry.message)
                .with_note(format!("reported by module `{}`", entry.module))
        })
        .collect()
}

fn transactions(action: &Action) -> Vec<&TransactionAction> {
    match action {
        Action::Transaction(tx) => vec![tx],
        Action::Batched(batch) => batch.actions.iter().collect(),
        _ => Vec::new(),
    }
}

/// Send every transaction in order, returning their hashes.
pub async fn send_all(client: &dyn ChainClient, actions: &[Action]) -> EvalResult<Vec<String>> {
    let mut hashes = Vec::new();
    for tx in actions.iter().flat_map(transactions) {
        hashes.push(client.send_transaction(tx).await?);
    }
    Ok(hashes)
}

fn describe(action: &Action) -> String {
    match action {
        Action::Transaction(tx) => describe_tx(tx),
        Action::Batched(batch) => {
            let mut lines = vec![format!("batch of {} transactions", batch.actions.len())];
            lines.extend(batch.actions.iter().map(|tx| format!("  {}", describe_tx(tx))));
            lines.join("\n")
        }
        Action::Wallet(wallet) => format!("wallet {} {}", wallet.method, wallet.params),
        Action::Rpc(rpc) => format!("rpc {} {}", rpc.method, rpc.params),
        Action::Terminal(terminal) => terminal.message.clone(),
    }
}

fn describe_tx(tx: &TransactionAction) -> String {
    let mut text = format!("transaction to {}", tx.to);
    if let Some(from) = tx.from {
        text.push_str(&format!(" from {from}"));
    }
    let value = tx.value.to_string();
    if value != "0" {
        text.push_str(&format!(" value {value}"));
    }
    text
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use pretty_assertions::assert_eq;

    use super::*;
    use crisp_eval::Address;

    #[test]
    fn test_module_warnings_become_diagnostics() {
        let logger = ScriptLogger::default();
        logger.info("std", "hello");
        logger.warn("aragonos", "could not read the ACL");
        let warnings = module_warnings(&logger);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].code, ErrorCode::W2001);
        assert!(!warnings[0].is_error());
        assert_eq!(warnings[0].message, "could not read the ACL");
        assert_eq!(warnings[0].notes, vec!["reported by module `aragonos`".to_string()]);
    }

    #[test]
    fn test_describe_transaction() {
        let mut tx = TransactionAction::new(Address::from_low_u64(1), vec![0xde, 0xad]);
        assert_eq!(
            describe_tx(&tx),
            format!("transaction to {}", Address::from_low_u64(1))
        );
        tx.value = 7.into();
        tx.from = Some(Address::from_low_u64(2));
        assert_eq!(
            describe_tx(&tx),
            format!(
                "transaction to {} from {} value 7",
                Address::from_low_u64(1),
                Address::from_low_u64(2)
            )
        );
    }
}
