//! Line-indexed queries over a parsed script.

use super::{Node, NodeKind};

/// A parsed script: top-level command nodes in source order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Ast {
    body: Vec<Node>,
    /// Last line of each top-level command; non-decreasing.
    end_lines: Vec<u32>,
}

impl Ast {
    pub fn new(body: Vec<Node>) -> Self {
        let mut last = 0;
        let end_lines = body
            .iter()
            .map(|n| {
                last = n.loc.map_or(last, |l| l.end.line.max(last));
                last
            })
            .collect();
        Ast { body, end_lines }
    }

    #[inline]
    pub fn body(&self) -> &[Node] {
        &self.body
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    /// Top-level commands that end strictly before `line`.
    pub fn commands_until_line(&self, line: u32) -> &[Node] {
        let end = self.end_lines.partition_point(|&l| l < line);
        &self.body[..end]
    }

    /// Innermost command whose location spans `line`, descending into blocks.
    pub fn command_at_line(&self, line: u32) -> Option<&Node> {
        self.command_path_at_line(line).pop()
    }

    /// Chain of commands enclosing `line`, outermost first.
    pub fn command_path_at_line(&self, line: u32) -> Vec<&Node> {
        let mut path = Vec::new();
        let idx = self.end_lines.partition_point(|&l| l < line);
        let Some(top) = self.body.get(idx).filter(|n| spans(n, line)) else {
            return path;
        };
        path.push(top);

        let mut current = top;
        while let Some(inner) = nested_command_at_line(current, line) {
            path.push(inner);
            current = inner;
        }
        path
    }
}

fn spans(node: &Node, line: u32) -> bool {
    node.loc.is_some_and(|l| l.spans_line(line))
}

fn nested_command_at_line(command: &Node, line: u32) -> Option<&Node> {
    let NodeKind::CommandExpression(c) = &command.kind else {
        return None;
    };
    let block = c.block().filter(|b| spans(b, line))?.as_block()?;
    block.body.iter().find(|n| spans(n, line))
}
