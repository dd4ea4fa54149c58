//! INSERT, UPDATE and DELETE scenarios.

use kestrel_common::ErrorCode;
use kestrel_sql::parser::{AttrInfo, CompOp, ConditionSqlNode, SelectSqlNode};
use kestrel_sql::value::{AttrType, Date, Value};
use kestrel_test::fixtures::{delete_node, insert_node, update_node, TestDb};

fn typed_db() -> TestDb {
    let db = TestDb::new();
    db.create_table(
        "r",
        vec![
            AttrInfo::new("i", AttrType::Ints),
            AttrInfo::new("f", AttrType::Floats),
            AttrInfo::chars("s", 4),
            AttrInfo::new("d", AttrType::Dates),
        ],
    );
    db
}

#[test]
fn test_insert_coerces_values() {
    let db = typed_db();
    let result = db
        .execute(insert_node(
            "r",
            vec![
                Value::Float(2.9),
                Value::Int(3),
                Value::Int(42),
                Value::from("2024-02-29"),
            ],
        ))
        .unwrap();
    assert_eq!(result.affected_rows, 1);
    assert_eq!(
        db.rows("r"),
        vec![vec![
            Value::Int(2),
            Value::Float(3.0),
            Value::from("42"),
            Value::Date(Date::parse("2024-02-29").unwrap()),
        ]]
    );
}

#[test]
fn test_insert_errors() {
    let db = typed_db();
    let cases = [
        (vec![Value::Int(1)], ErrorCode::FieldCountMismatch),
        (
            vec![Value::Boolean(true), Value::Int(1), Value::from("a"), Value::from("2020-01-01")],
            ErrorCode::FieldTypeMismatch,
        ),
        (
            vec![Value::Int(1), Value::Int(1), Value::from("abcde"), Value::from("2020-01-01")],
            ErrorCode::InvalidValue,
        ),
        (
            vec![Value::Int(1), Value::Int(1), Value::from("a"), Value::from("2021-02-29")],
            ErrorCode::InvalidValue,
        ),
    ];
    for (values, expected) in cases {
        let err = db.execute(insert_node("r", values)).unwrap_err();
        assert_eq!(err.code(), expected, "{err}");
    }
    assert_eq!(
        db.execute(insert_node("missing", vec![Value::Int(1)]))
            .unwrap_err()
            .code(),
        ErrorCode::TableNotFound
    );
    assert!(db.rows("r").is_empty());
}

#[test]
fn test_update_with_filter() {
    let db = TestDb::with_sample_table();
    let result = db
        .execute(update_node(
            "t",
            "b",
            Value::Int(99),
            vec![ConditionSqlNode::attr_value("a", CompOp::GreatEqual, 2)],
        ))
        .unwrap();
    assert_eq!(result.affected_rows, 2);
    assert_eq!(
        db.rows("t"),
        vec![
            vec![Value::Int(1), Value::Int(10)],
            vec![Value::Int(2), Value::Int(99)],
            vec![Value::Int(3), Value::Int(99)],
        ]
    );
}

#[test]
fn test_update_coerces_value() {
    let db = TestDb::with_sample_table();
    db.execute(update_node("t", "a", Value::from("7"), vec![]))
        .unwrap();
    let result = db
        .select(SelectSqlNode::new().column("a").from("t"))
        .unwrap();
    assert_eq!(result.to_text(), "a\n7\n7\n7");
}

#[test]
fn test_update_unknown_column() {
    let db = TestDb::with_sample_table();
    let err = db
        .execute(update_node("t", "zz", Value::Int(1), vec![]))
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::FieldNotFound);
}

#[test]
fn test_delete_with_filter() {
    let db = TestDb::with_sample_table();
    let result = db
        .execute(delete_node(
            "t",
            vec![ConditionSqlNode::attr_value("b", CompOp::NotEqual, 20)],
        ))
        .unwrap();
    assert_eq!(result.affected_rows, 2);
    assert_eq!(db.rows("t"), vec![vec![Value::Int(2), Value::Int(20)]]);
}

#[test]
fn test_delete_everything() {
    let db = TestDb::with_sample_table();
    let result = db.execute(delete_node("t", vec![])).unwrap();
    assert_eq!(result.affected_rows, 3);
    assert!(db.rows("t").is_empty());
}
