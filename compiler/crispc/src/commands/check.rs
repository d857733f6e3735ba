//! The `check` command: parse and eagerly interpret without side effects.

use crisp_eval::{EvalMode, Interpreter};
use crisp_ir::LineIndex;

use super::{block_on, dry_run_context, parse_source, read_file, report};
use crate::config::RunConfig;

/// Check a script. Capability calls are skipped, so this catches parse
/// errors, unknown commands, arity and type errors, but not chain failures.
pub fn check_file(path: &str, config: &RunConfig) {
    let source = read_file(path);
    let ast = match parse_source(&source) {
        Ok(ast) => ast,
        Err(diagnostics) => {
            report(&source, path, &diagnostics, config.format);
            std::process::exit(1);
        }
    };

    let interp = Interpreter::new(dry_run_context(config, EvalMode::Eager));
    if let Err(e) = block_on(interp.run_eager(&ast, u32::MAX)) {
        let diagnostic = e.to_diagnostic(&LineIndex::new(&source));
        report(&source, path, &[diagnostic], config.format);
        std::process::exit(1);
    }

    println!("OK: {path} ({} commands)", ast.body().len());
}
