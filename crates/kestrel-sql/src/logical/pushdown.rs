//! Predicate pushdown.
//!
//! A WHERE unit moves into a table's scan when exactly one side is a column
//! of that table and the other side is a literal, in either orientation.
//! Moved units leave the remaining set, so nothing is evaluated twice.

use crate::expr::Expression;
use crate::stmt::FilterUnit;

/// Splits `units` into the comparisons pushed into `table_name`'s scan and
/// the units left for the filter above the joins. Both keep their original
/// order.
pub fn split_pushable(table_name: &str, units: Vec<FilterUnit>) -> (Vec<Expression>, Vec<FilterUnit>) {
    let (pushed, remaining): (Vec<_>, Vec<_>) = units
        .into_iter()
        .partition(|unit| unit.single_table() == Some(table_name));
    let pushed = pushed.iter().map(FilterUnit::to_expression).collect();
    (pushed, remaining)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::expr::Field;
    use crate::parser::{AttrInfo, CompOp};
    use crate::stmt::FilterObj;
    use crate::storage::{Table, TableMeta};
    use crate::value::{AttrType, Value};

    fn field(table: &str, name: &str) -> FilterObj {
        let meta = TableMeta::new(1, table, &[AttrInfo::new("a", AttrType::Ints)]).unwrap();
        let field_meta = meta.field_by_name(name).unwrap().clone();
        FilterObj::Attr(Field::new(Arc::new(Table::new(meta)), field_meta))
    }

    fn literal(v: i32) -> FilterObj {
        FilterObj::Value(Value::Int(v))
    }

    #[test]
    fn test_split() {
        let units = vec![
            FilterUnit::new(field("t", "a"), CompOp::GreatThan, literal(1)),
            FilterUnit::new(field("t", "a"), CompOp::EqualTo, field("u", "a")),
            FilterUnit::new(literal(5), CompOp::GreatThan, field("t", "a")),
            FilterUnit::new(field("u", "a"), CompOp::LessThan, literal(9)),
            FilterUnit::new(literal(1), CompOp::EqualTo, literal(1)),
        ];

        let (pushed, remaining) = split_pushable("t", units);
        let pushed: Vec<_> = pushed.iter().map(|e| e.name(true)).collect();
        assert_eq!(pushed, vec!["t.a > 1", "5 > t.a"]);
        assert_eq!(remaining.len(), 3);

        let (pushed, remaining) = split_pushable("u", remaining);
        assert_eq!(pushed.len(), 1);
        assert_eq!(remaining.len(), 2);
        assert!(remaining.iter().all(|u| u.single_table().is_none()));
    }
}
