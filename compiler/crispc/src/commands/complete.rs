//! The `complete` command: completion items at a cursor position.

use serde_json::json;

use crisp_eval::{Completer, CompletionItem, CompletionKind, EvalMode};
use crisp_ir::LineCol;

use super::{block_on, dry_run_context, read_file, report};
use crate::config::{OutputFormat, RunConfig};

/// Print the completions at `line`:`col` (both 1-based).
pub fn complete_file(path: &str, line: u32, col: u32, config: &RunConfig) {
    let source = read_file(path);
    let output = match crisp_parse::parse(&source) {
        Ok(output) => output,
        Err(fatal) => {
            report(&source, path, &[fatal.to_diagnostic()], config.format);
            std::process::exit(1);
        }
    };

    // Recovered parse errors do not stop completion.
    let completer = Completer::new(dry_run_context(config, EvalMode::Eager));
    let items = block_on(completer.complete(&output.ast, LineCol::new(line, col)))
        .unwrap_or_default();

    match config.format {
        OutputFormat::Json => {
            let items: Vec<_> = items.iter().map(to_json).collect();
            println!("{}", serde_json::Value::Array(items));
        }
        OutputFormat::Text => {
            for item in &items {
                println!("{}\t{}", item.label, kind_name(item.kind));
            }
        }
    }
}

fn kind_name(kind: CompletionKind) -> &'static str {
    match kind {
        CompletionKind::Command => "command",
        CompletionKind::Module => "module",
        CompletionKind::Variable => "variable",
        CompletionKind::Address => "address",
        CompletionKind::Helper => "helper",
        CompletionKind::Value => "value",
        CompletionKind::Snippet => "snippet",
    }
}

fn to_json(item: &CompletionItem) -> serde_json::Value {
    json!({
        "label": item.label,
        "insertText": item.insert_text,
        "kind": kind_name(item.kind),
        "sortPriority": item.sort_priority,
        "isSnippet": item.is_snippet,
    })
}
