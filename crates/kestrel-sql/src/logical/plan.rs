//! Logical plan wrapper.

use std::fmt;

use super::operator::LogicalOperator;

/// A compiled logical plan.
#[derive(Debug, Clone)]
pub struct LogicalPlan {
    root: LogicalOperator,
}

impl LogicalPlan {
    /// Wraps a root operator.
    pub fn new(root: LogicalOperator) -> Self {
        Self { root }
    }

    /// The root operator.
    pub fn root(&self) -> &LogicalOperator {
        &self.root
    }

    /// Gives up the tree, typically to lowering.
    pub fn into_root(self) -> LogicalOperator {
        self.root
    }

    /// Renders the tree, one operator per line, indented by depth.
    pub fn display(&self) -> String {
        let mut output = String::new();
        format_node(&self.root, 0, &mut output);
        output
    }
}

fn format_node(op: &LogicalOperator, indent: usize, output: &mut String) {
    output.push_str(&"  ".repeat(indent));
    output.push_str(&op.describe());
    output.push('\n');
    for child in op.children() {
        format_node(child, indent + 1, output);
    }
}

impl fmt::Display for LogicalPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}
