//! Statement node definitions.

use std::fmt;

use crate::value::{AttrType, Value};

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompOp {
    /// `=`
    EqualTo,
    /// `<>`
    NotEqual,
    /// `<`
    LessThan,
    /// `<=`
    LessEqual,
    /// `>`
    GreatThan,
    /// `>=`
    GreatEqual,
    /// `LIKE`, a full-match regular expression.
    Like,
    /// `NOT LIKE`
    NotLike,
}

impl CompOp {
    /// Returns the SQL spelling of the operator.
    pub const fn symbol(self) -> &'static str {
        match self {
            CompOp::EqualTo => "=",
            CompOp::NotEqual => "<>",
            CompOp::LessThan => "<",
            CompOp::LessEqual => "<=",
            CompOp::GreatThan => ">",
            CompOp::GreatEqual => ">=",
            CompOp::Like => "LIKE",
            CompOp::NotLike => "NOT LIKE",
        }
    }

    /// Returns true for `LIKE` and `NOT LIKE`.
    pub const fn is_pattern(self) -> bool {
        matches!(self, CompOp::Like | CompOp::NotLike)
    }
}

impl fmt::Display for CompOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Aggregate functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggrFuncType {
    /// `COUNT(col)`
    Count,
    /// `COUNT(*)`
    CountStar,
    /// `SUM(col)`
    Sum,
    /// `AVG(col)`
    Avg,
    /// `MAX(col)`
    Max,
    /// `MIN(col)`
    Min,
}

impl AggrFuncType {
    /// Returns the SQL function name.
    pub const fn name(self) -> &'static str {
        match self {
            AggrFuncType::Count | AggrFuncType::CountStar => "COUNT",
            AggrFuncType::Sum => "SUM",
            AggrFuncType::Avg => "AVG",
            AggrFuncType::Max => "MAX",
            AggrFuncType::Min => "MIN",
        }
    }
}

impl fmt::Display for AggrFuncType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A possibly qualified attribute reference: `attr`, `rel.attr`, `*`,
/// `rel.*` or `*.*`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RelAttrSqlNode {
    /// Table name, empty when unqualified.
    pub relation_name: String,
    /// Attribute name or `*`.
    pub attribute_name: String,
}

impl RelAttrSqlNode {
    /// Creates a reference with an explicit relation.
    pub fn new(relation_name: impl Into<String>, attribute_name: impl Into<String>) -> Self {
        Self {
            relation_name: relation_name.into(),
            attribute_name: attribute_name.into(),
        }
    }

    /// Parses `attr` or `rel.attr`.
    pub fn parse(text: &str) -> Self {
        match text.split_once('.') {
            Some((relation, attribute)) => Self::new(relation, attribute),
            None => Self::new("", text),
        }
    }

    /// Returns true if the attribute part is `*`.
    pub fn is_wildcard(&self) -> bool {
        self.attribute_name == "*"
    }
}

impl fmt::Display for RelAttrSqlNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.relation_name.is_empty() {
            f.write_str(&self.attribute_name)
        } else {
            write!(f, "{}.{}", self.relation_name, self.attribute_name)
        }
    }
}

/// One side of a condition.
#[derive(Debug, Clone, PartialEq)]
pub enum ConditionOperand {
    /// A column reference.
    Attr(RelAttrSqlNode),
    /// A literal.
    Value(Value),
}

/// `left <op> right`
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionSqlNode {
    /// Left operand.
    pub left: ConditionOperand,
    /// Operator.
    pub comp: CompOp,
    /// Right operand.
    pub right: ConditionOperand,
}

impl ConditionSqlNode {
    /// Creates a condition from two operands.
    pub fn new(left: ConditionOperand, comp: CompOp, right: ConditionOperand) -> Self {
        Self { left, comp, right }
    }

    /// `attr <op> literal`
    pub fn attr_value(attr: &str, comp: CompOp, value: impl Into<Value>) -> Self {
        Self::new(
            ConditionOperand::Attr(RelAttrSqlNode::parse(attr)),
            comp,
            ConditionOperand::Value(value.into()),
        )
    }

    /// `literal <op> attr`
    pub fn value_attr(value: impl Into<Value>, comp: CompOp, attr: &str) -> Self {
        Self::new(
            ConditionOperand::Value(value.into()),
            comp,
            ConditionOperand::Attr(RelAttrSqlNode::parse(attr)),
        )
    }

    /// `attr <op> attr`
    pub fn attr_attr(left: &str, comp: CompOp, right: &str) -> Self {
        Self::new(
            ConditionOperand::Attr(RelAttrSqlNode::parse(left)),
            comp,
            ConditionOperand::Attr(RelAttrSqlNode::parse(right)),
        )
    }
}

/// An aggregate call in a select list.
#[derive(Debug, Clone, PartialEq)]
pub struct AggrFuncSqlNode {
    /// The function; `COUNT(*)` is parsed as `Count` with a `*` argument.
    pub func: AggrFuncType,
    /// Arguments as written.
    pub attributes: Vec<RelAttrSqlNode>,
}

/// One item of a select list.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectExprSqlNode {
    /// A column or wildcard.
    Attr(RelAttrSqlNode),
    /// An aggregate call.
    Aggregation(AggrFuncSqlNode),
}

/// `INNER JOIN right_rel ON conditions`
#[derive(Debug, Clone, PartialEq)]
pub struct JoinSqlNode {
    /// The joined table.
    pub right_rel: String,
    /// The ON conditions.
    pub conditions: Vec<ConditionSqlNode>,
}

/// A SELECT statement.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectSqlNode {
    /// Select list in written order.
    pub select_exprs: Vec<SelectExprSqlNode>,
    /// FROM tables; more than one means comma-style FROM.
    pub relations: Vec<String>,
    /// Explicit joins against the first relation, left to right.
    pub joins: Vec<JoinSqlNode>,
    /// WHERE conditions, implicitly AND-ed.
    pub conditions: Vec<ConditionSqlNode>,
    /// GROUP BY columns.
    pub group_by: Vec<RelAttrSqlNode>,
}

impl SelectSqlNode {
    /// Creates an empty SELECT.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a column (or wildcard) to the select list.
    pub fn column(mut self, attr: &str) -> Self {
        self.select_exprs
            .push(SelectExprSqlNode::Attr(RelAttrSqlNode::parse(attr)));
        self
    }

    /// Adds an aggregate over one argument to the select list.
    pub fn aggregate(mut self, func: AggrFuncType, attr: &str) -> Self {
        self.select_exprs
            .push(SelectExprSqlNode::Aggregation(AggrFuncSqlNode {
                func,
                attributes: vec![RelAttrSqlNode::parse(attr)],
            }));
        self
    }

    /// Adds a FROM table.
    pub fn from(mut self, table: &str) -> Self {
        self.relations.push(table.to_string());
        self
    }

    /// Adds an explicit join.
    pub fn join(mut self, table: &str, conditions: Vec<ConditionSqlNode>) -> Self {
        self.joins.push(JoinSqlNode {
            right_rel: table.to_string(),
            conditions,
        });
        self
    }

    /// Adds a WHERE condition.
    pub fn filter(mut self, condition: ConditionSqlNode) -> Self {
        self.conditions.push(condition);
        self
    }

    /// Adds a GROUP BY column.
    pub fn group_by(mut self, attr: &str) -> Self {
        self.group_by.push(RelAttrSqlNode::parse(attr));
        self
    }
}

/// `INSERT INTO relation VALUES (...)`
#[derive(Debug, Clone, PartialEq)]
pub struct InsertSqlNode {
    /// Target table.
    pub relation_name: String,
    /// Values in column order.
    pub values: Vec<Value>,
}

/// `UPDATE relation SET attribute = value WHERE ...`
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateSqlNode {
    /// Target table.
    pub relation_name: String,
    /// Column to overwrite.
    pub attribute_name: String,
    /// Replacement value.
    pub value: Value,
    /// WHERE conditions.
    pub conditions: Vec<ConditionSqlNode>,
}

/// `DELETE FROM relation WHERE ...`
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteSqlNode {
    /// Target table.
    pub relation_name: String,
    /// WHERE conditions.
    pub conditions: Vec<ConditionSqlNode>,
}

/// A column definition in CREATE TABLE.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttrInfo {
    /// Column name.
    pub name: String,
    /// Column type.
    pub attr_type: AttrType,
    /// Declared length; only meaningful for CHARS, 0 means the default.
    pub length: usize,
}

impl AttrInfo {
    /// Creates a column definition with the default length.
    pub fn new(name: impl Into<String>, attr_type: AttrType) -> Self {
        Self {
            name: name.into(),
            attr_type,
            length: 0,
        }
    }

    /// Creates a CHARS column of the given length.
    pub fn chars(name: impl Into<String>, length: usize) -> Self {
        Self {
            name: name.into(),
            attr_type: AttrType::Chars,
            length,
        }
    }
}

/// `CREATE TABLE relation (...)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTableSqlNode {
    /// Table name.
    pub relation_name: String,
    /// Column definitions.
    pub attr_infos: Vec<AttrInfo>,
}

/// `CREATE INDEX index_name ON relation (attributes)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateIndexSqlNode {
    /// Index name.
    pub index_name: String,
    /// Table name.
    pub relation_name: String,
    /// Indexed columns.
    pub attribute_names: Vec<String>,
}

/// A parsed statement.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlNode {
    /// SELECT
    Select(SelectSqlNode),
    /// INSERT
    Insert(InsertSqlNode),
    /// UPDATE
    Update(UpdateSqlNode),
    /// DELETE
    Delete(DeleteSqlNode),
    /// CREATE TABLE
    CreateTable(CreateTableSqlNode),
    /// CREATE INDEX
    CreateIndex(CreateIndexSqlNode),
    /// EXPLAIN of another statement.
    Explain(Box<SqlNode>),
}

impl SqlNode {
    /// Wraps this statement in EXPLAIN.
    pub fn explain(self) -> Self {
        SqlNode::Explain(Box::new(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rel_attr_parse() {
        assert_eq!(RelAttrSqlNode::parse("t.a"), RelAttrSqlNode::new("t", "a"));
        assert_eq!(RelAttrSqlNode::parse("a"), RelAttrSqlNode::new("", "a"));
        assert!(RelAttrSqlNode::parse("*.*").is_wildcard());
        assert_eq!(RelAttrSqlNode::parse("t.a").to_string(), "t.a");
    }

    #[test]
    fn test_select_builder() {
        let select = SelectSqlNode::new()
            .column("t.a")
            .aggregate(AggrFuncType::Count, "*")
            .from("t")
            .join("u", vec![ConditionSqlNode::attr_attr("t.a", CompOp::EqualTo, "u.a")])
            .filter(ConditionSqlNode::value_attr(3, CompOp::LessThan, "t.b"));

        assert_eq!(select.select_exprs.len(), 2);
        assert_eq!(select.joins[0].right_rel, "u");
        assert_eq!(
            select.conditions[0].left,
            ConditionOperand::Value(Value::Int(3))
        );
    }

    #[test]
    fn test_operator_names() {
        assert_eq!(CompOp::NotLike.to_string(), "NOT LIKE");
        assert!(CompOp::Like.is_pattern());
        assert_eq!(AggrFuncType::CountStar.name(), "COUNT");
    }
}
