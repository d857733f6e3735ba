//! Command handlers for the crisp CLI.
//!
//! Each submodule implements one CLI command. The shared pipeline (parse,
//! interpret, lower failures to diagnostics) lives here so integration
//! tests can drive it without a terminal.

mod check;
mod complete;
mod debug;
mod run;

pub use check::check_file;
pub use complete::complete_file;
pub use debug::parse_file;
pub use run::{run_file, send_all};

use std::io::IsTerminal;
use std::sync::Arc;

use crisp_diagnostic::emitter::{ColorMode, DiagnosticEmitter, JsonEmitter, TerminalEmitter};
use crisp_diagnostic::{count_by_severity, Diagnostic};
use crisp_eval::{Action, ChainClient, EvalMode, Interpreter, ModuleContext, NonceTable};
use crisp_ir::{Ast, LineIndex};

use crate::client::DryRunClient;
use crate::config::{OutputFormat, RunConfig};

/// Parse `source`, lowering every error to a diagnostic.
pub fn parse_source(source: &str) -> Result<Ast, Vec<Diagnostic>> {
    let output = crisp_parse::parse(source).map_err(|fatal| vec![fatal.to_diagnostic()])?;
    if output.has_errors() {
        return Err(output.errors.iter().map(|e| e.to_diagnostic()).collect());
    }
    Ok(output.ast)
}

/// Parse and interpret `source`, returning its actions.
pub async fn evaluate(
    source: &str,
    context: ModuleContext,
) -> Result<Vec<Action>, Vec<Diagnostic>> {
    let ast = parse_source(source)?;
    Interpreter::new(context)
        .run(&ast)
        .await
        .map_err(|e| vec![e.to_diagnostic(&LineIndex::new(source))])
}

/// Context for a dry run: bundled modules and a [`DryRunClient`].
pub fn dry_run_context(config: &RunConfig, mode: EvalMode) -> ModuleContext {
    let nonces = NonceTable::default();
    let client: Arc<dyn ChainClient> = Arc::new(DryRunClient::new(config, nonces.clone()));
    let mut context = ModuleContext::new(Some(client), Arc::new(crisp_modules::default_registry()))
        .with_mode(mode);
    context.nonces = nonces;
    context
}

/// Print diagnostics in the configured format: JSON lines on stdout, or
/// rendered reports on stderr.
pub(crate) fn report(source: &str, path: &str, diagnostics: &[Diagnostic], format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let mut emitter = JsonEmitter::new(std::io::stdout());
            emitter.emit_all(diagnostics);
            emitter.flush();
        }
        OutputFormat::Text => {
            let is_tty = std::io::stderr().is_terminal();
            let mut emitter = TerminalEmitter::stderr(source, path, ColorMode::Auto, is_tty);
            emitter.emit_all(diagnostics);
            let (errors, warnings) = count_by_severity(diagnostics);
            emitter.emit_summary(errors, warnings);
            emitter.flush();
        }
    }
}

pub(crate) fn block_on<F: std::future::Future>(future: F) -> F::Output {
    match tokio::runtime::Builder::new_current_thread().build() {
        Ok(runtime) => runtime.block_on(future),
        Err(e) => {
            eprintln!("error: cannot start the async runtime: {e}");
            std::process::exit(1);
        }
    }
}

pub(crate) fn read_file(path: &str) -> String {
    match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            let msg = match e.kind() {
                std::io::ErrorKind::NotFound => format!("cannot find file '{path}'"),
                std::io::ErrorKind::PermissionDenied => {
                    format!("permission denied reading '{path}'")
                }
                std::io::ErrorKind::InvalidData => {
                    format!("'{path}' contains invalid UTF-8 data")
                }
                _ => format!("error reading '{path}': {e}"),
            };
            eprintln!("{msg}");
            std::process::exit(1);
        }
    }
}
