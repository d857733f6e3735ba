//! What the cursor is sitting on.

use crisp_ir::{Ast, CommandExpression, LineCol};

pub(super) enum Slot<'a> {
    /// A command name, or a line without a command.
    CommandName,
    /// Positional argument `index` of `expr`.
    Argument {
        expr: &'a CommandExpression,
        index: usize,
    },
    /// The value of option `--name`.
    OptionValue {
        expr: &'a CommandExpression,
        name: &'a str,
    },
}

pub(super) fn slot_at(ast: &Ast, pos: LineCol) -> Slot<'_> {
    let Some(node) = ast.command_at_line(pos.line) else {
        return Slot::CommandName;
    };
    let (Some(expr), Some(loc)) = (node.as_command(), node.loc) else {
        return Slot::CommandName;
    };
    // Blank or closing line inside a block.
    if loc.start.line != pos.line {
        return Slot::CommandName;
    }
    let name_len = u32::try_from(expr.qualified_name().len()).unwrap_or(u32::MAX);
    if pos.col <= loc.start.col.saturating_add(name_len) {
        return Slot::CommandName;
    }
    if let Some(opt) = expr
        .opts
        .iter()
        .find(|o| o.loc.is_some_and(|l| l.contains(pos)))
    {
        return Slot::OptionValue {
            expr,
            name: &opt.name,
        };
    }
    let index = expr
        .args
        .iter()
        .take_while(|a| a.loc.is_some_and(|l| l.end < pos))
        .count();
    Slot::Argument { expr, index }
}
