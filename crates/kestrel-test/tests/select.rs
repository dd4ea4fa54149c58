//! SELECT scenarios: pushdown, joins, aggregates.

use kestrel_common::config::PlannerConfig;
use kestrel_common::ErrorCode;
use kestrel_sql::logical::LogicalPlanGenerator;
use kestrel_sql::parser::{
    AggrFuncType, AttrInfo, CompOp, ConditionSqlNode, SelectSqlNode, SqlNode,
};
use kestrel_sql::stmt::Stmt;
use kestrel_sql::value::{AttrType, Value};
use kestrel_test::fixtures::TestDb;

fn sum_b_where_a_gt_1() -> SelectSqlNode {
    SelectSqlNode::new()
        .aggregate(AggrFuncType::Sum, "b")
        .from("t")
        .filter(ConditionSqlNode::attr_value("a", CompOp::GreatThan, 1))
}

#[test]
fn test_sum_with_pushed_down_filter() {
    let db = TestDb::with_sample_table();

    let stmt = Stmt::create(db.db(), &SqlNode::Select(sum_b_where_a_gt_1())).unwrap();
    let plan = LogicalPlanGenerator::new(&PlannerConfig::default())
        .create(&stmt)
        .unwrap();
    let display = plan.display();
    assert!(display.contains("TableGet: t [b] predicates=[t.a > 1]"));
    assert!(!display.contains("Predicate:"));

    let result = db.select(sum_b_where_a_gt_1()).unwrap();
    assert_eq!(result.header(), vec!["SUM(b)"]);
    assert_eq!(result.rows, vec![vec![Value::Int(50)]]);
    assert_eq!(result.to_text(), "SUM(b)\n50");
}

#[test]
fn test_reversed_comparison_is_pushed_down() {
    let db = TestDb::with_sample_table();
    let node = SelectSqlNode::new()
        .column("b")
        .from("t")
        .filter(ConditionSqlNode::value_attr(2, CompOp::LessThan, "a"));
    let result = db.select(node).unwrap();
    assert_eq!(result.rows, vec![vec![Value::Int(30)]]);
}

#[test]
fn test_aggregates_over_empty_input() {
    let db = TestDb::with_sample_table();
    let node = SelectSqlNode::new()
        .aggregate(AggrFuncType::Count, "*")
        .aggregate(AggrFuncType::Count, "a")
        .aggregate(AggrFuncType::Sum, "b")
        .aggregate(AggrFuncType::Avg, "b")
        .aggregate(AggrFuncType::Max, "b")
        .aggregate(AggrFuncType::Min, "b")
        .from("t")
        .filter(ConditionSqlNode::attr_value("a", CompOp::GreatThan, 100));
    let result = db.select(node).unwrap();
    assert_eq!(
        result.header(),
        vec!["COUNT(*)", "COUNT(a)", "SUM(b)", "AVG(b)", "MAX(b)", "MIN(b)"]
    );
    assert_eq!(
        result.rows,
        vec![vec![
            Value::Int(0),
            Value::Int(0),
            Value::Null,
            Value::Null,
            Value::Null,
            Value::Null
        ]]
    );
}

#[test]
fn test_aggregates_over_all_rows() {
    let db = TestDb::with_sample_table();
    let node = SelectSqlNode::new()
        .aggregate(AggrFuncType::Count, "*")
        .aggregate(AggrFuncType::Avg, "a")
        .aggregate(AggrFuncType::Max, "b")
        .aggregate(AggrFuncType::Min, "b")
        .from("t");
    let result = db.select(node).unwrap();
    assert_eq!(result.to_text(), "COUNT(*) | AVG(a) | MAX(b) | MIN(b)\n3 | 2 | 30 | 10");
}

#[test]
fn test_aggregate_mixed_with_column_is_rejected() {
    let db = TestDb::with_sample_table();
    let node = SelectSqlNode::new()
        .column("a")
        .aggregate(AggrFuncType::Sum, "b")
        .from("t");
    let err = db.select(node).unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidArgument);
}

#[test]
fn test_group_by_is_unimplemented() {
    let db = TestDb::with_sample_table();
    let node = SelectSqlNode::new()
        .aggregate(AggrFuncType::Sum, "b")
        .from("t")
        .group_by("a");
    let err = db.select(node).unwrap_err();
    assert_eq!(err.code(), ErrorCode::Unimplemented);
}

#[test]
fn test_comma_join_filtered_by_where() {
    let db = TestDb::with_sample_table();
    db.create_int_table("u", &["a", "c"]);
    db.insert("u", vec![Value::Int(2), Value::Int(200)]);
    db.insert("u", vec![Value::Int(3), Value::Int(300)]);
    db.insert("u", vec![Value::Int(4), Value::Int(400)]);

    let node = SelectSqlNode::new()
        .column("t.b")
        .column("u.c")
        .from("t")
        .from("u")
        .filter(ConditionSqlNode::attr_attr("t.a", CompOp::EqualTo, "u.a"))
        .filter(ConditionSqlNode::attr_value("u.c", CompOp::LessThan, 350));
    let result = db.select(node).unwrap();
    assert_eq!(result.header(), vec!["t.b", "u.c"]);
    assert_eq!(
        result.rows,
        vec![
            vec![Value::Int(20), Value::Int(200)],
            vec![Value::Int(30), Value::Int(300)],
        ]
    );
}

#[test]
fn test_explicit_join() {
    let db = TestDb::with_sample_table();
    db.create_int_table("u", &["a", "c"]);
    db.insert("u", vec![Value::Int(1), Value::Int(100)]);
    db.insert("u", vec![Value::Int(3), Value::Int(300)]);

    let node = SelectSqlNode::new()
        .column("*")
        .from("t")
        .join("u", vec![ConditionSqlNode::attr_attr("t.a", CompOp::EqualTo, "u.a")]);
    let result = db.select(node).unwrap();
    assert_eq!(result.header(), vec!["t.a", "t.b", "u.a", "u.c"]);
    assert_eq!(
        result.rows,
        vec![
            vec![Value::Int(1), Value::Int(10), Value::Int(1), Value::Int(100)],
            vec![Value::Int(3), Value::Int(30), Value::Int(3), Value::Int(300)],
        ]
    );
}

#[test]
fn test_join_with_empty_side() {
    let db = TestDb::with_sample_table();
    db.create_int_table("u", &["a", "c"]);
    let node = SelectSqlNode::new()
        .column("t.a")
        .from("t")
        .join("u", vec![ConditionSqlNode::attr_attr("t.a", CompOp::EqualTo, "u.a")]);
    assert!(db.select(node).unwrap().is_empty());
}

#[test]
fn test_unqualified_column_with_two_tables() {
    let db = TestDb::with_sample_table();
    db.create_int_table("u", &["a", "c"]);
    let node = SelectSqlNode::new().column("b").from("t").from("u");
    let err = db.select(node).unwrap_err();
    assert_eq!(err.code(), ErrorCode::FieldNotFound);
}

#[test]
fn test_like_filter() {
    let db = TestDb::new();
    db.create_table(
        "p",
        vec![AttrInfo::new("id", AttrType::Ints), AttrInfo::chars("name", 8)],
    );
    for (id, name) in [(1, "abc"), (2, "abcx"), (3, "axc")] {
        db.insert("p", vec![Value::Int(id), Value::from(name)]);
    }
    let node = SelectSqlNode::new()
        .column("id")
        .from("p")
        .filter(ConditionSqlNode::attr_value("name", CompOp::Like, "a.c"));
    let result = db.select(node).unwrap();
    assert_eq!(result.rows, vec![vec![Value::Int(1)], vec![Value::Int(3)]]);
}

#[test]
fn test_cross_type_comparison() {
    let db = TestDb::with_sample_table();
    let node = SelectSqlNode::new()
        .column("b")
        .from("t")
        .filter(ConditionSqlNode::attr_value("a", CompOp::EqualTo, "2"));
    let result = db.select(node).unwrap();
    assert_eq!(result.rows, vec![vec![Value::Int(20)]]);
}
