//! Statement results.

use std::fmt;

use kestrel_common::constants::CELL_SEPARATOR;

use crate::value::{AttrType, Value};

/// One column of a result header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultColumn {
    /// Display name, e.g. `a`, `t.a` or `SUM(b)`.
    pub name: String,
    /// Value type.
    pub attr_type: AttrType,
    /// Declared length in bytes.
    pub length: usize,
}

impl ResultColumn {
    /// Creates a column.
    pub fn new(name: impl Into<String>, attr_type: AttrType, length: usize) -> Self {
        Self {
            name: name.into(),
            attr_type,
            length,
        }
    }
}

/// Rows and counters produced by one statement.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    /// Header; empty for statements that produce no rows.
    pub columns: Vec<ResultColumn>,
    /// Rows in production order.
    pub rows: Vec<Vec<Value>>,
    /// Rows changed by INSERT, UPDATE or DELETE.
    pub affected_rows: usize,
    /// Set when the row cap stopped collection early.
    pub truncated: bool,
}

impl ResultSet {
    /// An empty result with the given header.
    pub fn new(columns: Vec<ResultColumn>) -> Self {
        Self {
            columns,
            ..Self::default()
        }
    }

    /// Column names.
    pub fn header(&self) -> Vec<&str> {
        self.columns.iter().map(|column| column.name.as_str()).collect()
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if there are no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Header line followed by one line per row, cells joined by ` | `.
    /// Statements without a header render as an empty string.
    pub fn to_text(&self) -> String {
        if self.columns.is_empty() {
            return String::new();
        }
        let mut lines = Vec::with_capacity(self.rows.len() + 1);
        lines.push(self.header().join(CELL_SEPARATOR));
        for row in &self.rows {
            let cells: Vec<String> = row.iter().map(Value::to_string).collect();
            lines.push(cells.join(CELL_SEPARATOR));
        }
        lines.join("\n")
    }
}

impl fmt::Display for ResultSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_text() {
        let mut result = ResultSet::new(vec![
            ResultColumn::new("t.a", AttrType::Ints, 4),
            ResultColumn::new("SUM(b)", AttrType::Ints, 4),
        ]);
        result.rows.push(vec![Value::Int(1), Value::Null]);
        result.rows.push(vec![Value::Int(2), Value::Int(30)]);
        assert_eq!(result.to_text(), "t.a | SUM(b)\n1 | NULL\n2 | 30");
        assert_eq!(result.row_count(), 2);
    }

    #[test]
    fn test_headerless_result_is_blank() {
        let result = ResultSet {
            affected_rows: 3,
            ..ResultSet::default()
        };
        assert_eq!(result.to_text(), "");
        assert!(result.is_empty());
    }
}
