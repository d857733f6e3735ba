//! The `parse` command: dump the command tree.

use std::fmt::Write as _;

use crisp_ir::{Node, NodeKind};

use super::{read_file, report};
use crate::config::RunConfig;

pub fn parse_file(path: &str, config: &RunConfig) {
    let source = read_file(path);
    let output = match crisp_parse::parse(&source) {
        Ok(output) => output,
        Err(fatal) => {
            report(&source, path, &[fatal.to_diagnostic()], config.format);
            std::process::exit(1);
        }
    };

    let mut out = String::new();
    for node in output.ast.body() {
        write_node(&mut out, node, 0);
    }
    print!("{out}");

    if output.has_errors() {
        let diagnostics: Vec<_> = output.errors.iter().map(|e| e.to_diagnostic()).collect();
        report(&source, path, &diagnostics, config.format);
        std::process::exit(1);
    }
}

fn write_node(out: &mut String, node: &Node, depth: usize) {
    let indent = "  ".repeat(depth);
    let loc = node.loc.map(|l| l.to_string()).unwrap_or_default();
    let _ = write!(out, "{indent}{}", node.kind_name());
    if let Some(name) = node.name() {
        let _ = write!(out, " `{name}`");
    }
    let _ = writeln!(out, " @ {loc}");

    match &node.kind {
        NodeKind::CommandExpression(cmd) => {
            for arg in &cmd.args {
                write_node(out, arg, depth + 1);
            }
            for opt in &cmd.opts {
                let _ = writeln!(out, "{indent}  --{}", opt.name);
                write_node(out, &opt.value, depth + 2);
            }
        }
        NodeKind::BlockExpression(block) => {
            for child in &block.body {
                write_node(out, child, depth + 1);
            }
        }
        NodeKind::CallExpression(call) => {
            write_node(out, &call.target, depth + 1);
            for arg in &call.args {
                write_node(out, arg, depth + 1);
            }
        }
        NodeKind::HelperFunctionExpression(helper) => {
            for arg in &helper.args {
                write_node(out, arg, depth + 1);
            }
        }
        NodeKind::BinaryExpression(bin) => {
            write_node(out, &bin.left, depth + 1);
            write_node(out, &bin.right, depth + 1);
        }
        NodeKind::AsExpression(alias) => {
            write_node(out, &alias.left, depth + 1);
            write_node(out, &alias.right, depth + 1);
        }
        _ => {}
    }
}
