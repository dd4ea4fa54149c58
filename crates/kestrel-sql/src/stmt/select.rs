//! SELECT binding.

use std::sync::Arc;

use tracing::{debug, warn};

use kestrel_common::{KestrelError, KestrelResult};

use super::{lookup_field, lookup_table, visible_fields, BindContext, FilterStmt};
use crate::expr::{AggrTarget, AggregationExpr, Expression, Field};
use crate::parser::{AggrFuncSqlNode, AggrFuncType, JoinSqlNode, RelAttrSqlNode, SelectExprSqlNode, SelectSqlNode};
use crate::storage::{Db, Table};

/// `INNER JOIN table ON condition`, bound.
#[derive(Debug, Clone)]
pub struct JoinStmt {
    table: Arc<Table>,
    condition: FilterStmt,
}

impl JoinStmt {
    fn create(ctx: &BindContext, node: &JoinSqlNode) -> KestrelResult<Self> {
        if node.conditions.is_empty() {
            return Err(KestrelError::invalid_argument(format!(
                "join with '{}' has no condition",
                node.right_rel
            )));
        }
        let condition = FilterStmt::create(ctx, &node.conditions)?;
        let table = ctx.find(&node.right_rel).cloned().ok_or_else(|| {
            KestrelError::internal(format!("joined table '{}' not in scope", node.right_rel))
        })?;
        Ok(Self { table, condition })
    }

    /// The joined table.
    pub fn table(&self) -> &Arc<Table> {
        &self.table
    }

    /// The ON condition.
    pub fn condition(&self) -> &FilterStmt {
        &self.condition
    }
}

/// A bound SELECT.
#[derive(Debug, Clone)]
pub struct SelectStmt {
    tables: Vec<Arc<Table>>,
    query_exprs: Vec<Expression>,
    filter: FilterStmt,
    joins: Vec<JoinStmt>,
}

impl SelectStmt {
    /// Binds a SELECT.
    ///
    /// Tables come from FROM followed by the JOIN clauses, left to right.
    /// The select list keeps its written order with wildcards expanded in
    /// place.
    pub fn create(db: &Db, node: &SelectSqlNode) -> KestrelResult<Self> {
        if node.relations.len() > 1 && !node.joins.is_empty() {
            return Err(KestrelError::invalid_argument(
                "comma-separated FROM cannot be combined with JOIN",
            ));
        }
        if node.relations.is_empty() {
            return Err(KestrelError::invalid_argument("SELECT needs a FROM clause"));
        }
        if !node.group_by.is_empty() {
            return Err(KestrelError::unimplemented("GROUP BY"));
        }

        let mut tables = Vec::with_capacity(node.relations.len() + node.joins.len());
        for name in node
            .relations
            .iter()
            .chain(node.joins.iter().map(|join| &join.right_rel))
        {
            tables.push(lookup_table(db, name)?);
        }
        let ctx = BindContext::new(&tables);
        let with_table = tables.len() > 1;

        let mut query_exprs = Vec::new();
        let mut num_attr = 0;
        let mut num_aggr = 0;
        for select_expr in &node.select_exprs {
            match select_expr {
                SelectExprSqlNode::Aggregation(aggr) => {
                    let expr = bind_aggregation(&ctx, aggr, with_table)?;
                    query_exprs.push(Expression::Aggregation(expr));
                    num_aggr += 1;
                }
                SelectExprSqlNode::Attr(attr) => {
                    query_exprs.extend(
                        bind_select_attr(&ctx, attr)?
                            .into_iter()
                            .map(Expression::Field),
                    );
                    num_attr += 1;
                }
            }
        }
        if num_aggr > 0 && num_attr > 0 {
            return Err(KestrelError::invalid_argument(
                "aggregates cannot be mixed with plain columns without GROUP BY",
            ));
        }
        if query_exprs.is_empty() {
            return Err(KestrelError::invalid_argument("empty select list"));
        }

        let joins = node
            .joins
            .iter()
            .map(|join| JoinStmt::create(&ctx, join))
            .collect::<KestrelResult<Vec<_>>>()?;
        let filter = FilterStmt::create(&ctx, &node.conditions)?;

        debug!(
            tables = tables.len(),
            exprs = query_exprs.len(),
            joins = joins.len(),
            filters = filter.units().len(),
            "bound select"
        );
        Ok(Self {
            tables,
            query_exprs,
            filter,
            joins,
        })
    }

    /// Source tables: FROM tables, then joined tables.
    pub fn tables(&self) -> &[Arc<Table>] {
        &self.tables
    }

    /// Select list.
    pub fn query_exprs(&self) -> &[Expression] {
        &self.query_exprs
    }

    /// WHERE clause.
    pub fn filter(&self) -> &FilterStmt {
        &self.filter
    }

    /// JOIN clauses in order.
    pub fn joins(&self) -> &[JoinStmt] {
        &self.joins
    }

    /// Returns true when output columns are qualified with their table.
    pub fn multi_table(&self) -> bool {
        self.tables.len() > 1
    }
}

fn bind_select_attr(ctx: &BindContext, attr: &RelAttrSqlNode) -> KestrelResult<Vec<Field>> {
    let all_tables = |ctx: &BindContext| -> Vec<Field> {
        ctx.tables.iter().flat_map(visible_fields).collect()
    };

    if attr.relation_name.is_empty() {
        if attr.is_wildcard() {
            return Ok(all_tables(ctx));
        }
        let Some(table) = ctx.default_table() else {
            warn!(attr = %attr, "unqualified attribute with several tables in scope");
            return Err(KestrelError::field_not_found("", &attr.attribute_name));
        };
        return lookup_field(table, &attr.attribute_name).map(|field| vec![field]);
    }

    if attr.relation_name == "*" {
        if !attr.is_wildcard() {
            warn!(attr = %attr, "table wildcard with a named field");
            return Err(KestrelError::field_not_found("*", &attr.attribute_name));
        }
        return Ok(all_tables(ctx));
    }

    let Some(table) = ctx.find(&attr.relation_name) else {
        warn!(table = %attr.relation_name, "table not in from list");
        return Err(KestrelError::field_not_found(
            &attr.relation_name,
            &attr.attribute_name,
        ));
    };
    if attr.is_wildcard() {
        Ok(visible_fields(table))
    } else {
        lookup_field(table, &attr.attribute_name).map(|field| vec![field])
    }
}

/// Binds one aggregate call.
///
/// Every argument must name the same target: `*` is only accepted by
/// `COUNT` (which becomes `COUNT(*)`), and a repeated column only by `SUM`
/// and `AVG`.
fn bind_aggregation(
    ctx: &BindContext,
    node: &AggrFuncSqlNode,
    with_table: bool,
) -> KestrelResult<AggregationExpr> {
    let mut func = node.func;
    let mut target: Option<AggrTarget> = None;

    for attr in &node.attributes {
        let next = if attr.is_wildcard() {
            let table = if attr.relation_name.is_empty() {
                ctx.default_table()
                    .or_else(|| ctx.first_table())
                    .cloned()
                    .ok_or_else(|| KestrelError::table_not_found(""))?
            } else {
                ctx.resolve_table(attr)?
            };
            AggrTarget::Star(table)
        } else {
            AggrTarget::Field(ctx.resolve_field(attr)?)
        };

        target = Some(match (target, next) {
            (None, AggrTarget::Star(table)) => {
                if !matches!(func, AggrFuncType::Count | AggrFuncType::CountStar) {
                    return Err(invalid_aggregate(node, "'*' is only allowed in COUNT"));
                }
                func = AggrFuncType::CountStar;
                AggrTarget::Star(table)
            }
            (None, field) => field,
            (Some(AggrTarget::Star(_)), _) => {
                return Err(invalid_aggregate(node, "nothing may follow '*'"));
            }
            (Some(existing), next) => {
                if existing == next && matches!(func, AggrFuncType::Sum | AggrFuncType::Avg) {
                    existing
                } else {
                    return Err(invalid_aggregate(node, "takes a single column"));
                }
            }
        });
    }

    let target = target.ok_or_else(|| invalid_aggregate(node, "needs an argument"))?;
    Ok(AggregationExpr::new(func, target, with_table))
}

fn invalid_aggregate(node: &AggrFuncSqlNode, reason: &str) -> KestrelError {
    warn!(func = %node.func, reason, "invalid aggregate");
    KestrelError::invalid_argument(format!("{}: {reason}", node.func))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{AttrInfo, CompOp, ConditionSqlNode};
    use crate::value::AttrType;
    use kestrel_common::config::StorageConfig;
    use kestrel_common::ErrorCode;

    fn db() -> Db {
        let db = Db::new("test", StorageConfig::default());
        let ints = |names: &[&str]| -> Vec<AttrInfo> {
            names.iter().map(|n| AttrInfo::new(*n, AttrType::Ints)).collect()
        };
        db.create_table("t", &ints(&["a", "b"])).unwrap();
        db.create_table("u", &ints(&["a", "c"])).unwrap();
        db
    }

    fn names(stmt: &SelectStmt) -> Vec<String> {
        stmt.query_exprs()
            .iter()
            .map(|e| e.name(stmt.multi_table()))
            .collect()
    }

    fn code(node: SelectSqlNode) -> ErrorCode {
        SelectStmt::create(&db(), &node).unwrap_err().code()
    }

    #[test]
    fn test_wildcards() {
        let db = db();
        let stmt = SelectStmt::create(&db, &SelectSqlNode::new().column("*").from("t")).unwrap();
        assert_eq!(names(&stmt), vec!["a", "b"]);

        let node = SelectSqlNode::new().column("u.*").column("t.b").from("t").from("u");
        let stmt = SelectStmt::create(&db, &node).unwrap();
        assert_eq!(names(&stmt), vec!["u.a", "u.c", "t.b"]);

        let node = SelectSqlNode::new().column("*.*").from("t").from("u");
        assert_eq!(SelectStmt::create(&db, &node).unwrap().query_exprs().len(), 4);
    }

    #[test]
    fn test_resolution_errors() {
        assert_eq!(code(SelectSqlNode::new().column("a").from("nope")), ErrorCode::TableNotFound);
        assert_eq!(code(SelectSqlNode::new().column("z").from("t")), ErrorCode::FieldNotFound);
        assert_eq!(
            code(SelectSqlNode::new().column("a").from("t").from("u")),
            ErrorCode::FieldNotFound
        );
        assert_eq!(code(SelectSqlNode::new().column("u.a").from("t")), ErrorCode::FieldNotFound);
        assert_eq!(code(SelectSqlNode::new().column("*.a").from("t")), ErrorCode::FieldNotFound);
        assert_eq!(code(SelectSqlNode::new().column("__trx").from("t")), ErrorCode::FieldNotFound);
        assert_eq!(code(SelectSqlNode::new().column("a")), ErrorCode::InvalidArgument);
        assert_eq!(
            code(SelectSqlNode::new().column("a").from("t").group_by("a")),
            ErrorCode::Unimplemented
        );
    }

    #[test]
    fn test_join_rules() {
        let cond = ConditionSqlNode::attr_attr("t.a", CompOp::EqualTo, "u.a");
        let node = SelectSqlNode::new()
            .column("t.b")
            .from("t")
            .join("u", vec![cond.clone()]);
        let stmt = SelectStmt::create(&db(), &node).unwrap();
        assert_eq!(stmt.tables().len(), 2);
        assert_eq!(stmt.joins()[0].table().name(), "u");
        assert_eq!(stmt.joins()[0].condition().units().len(), 1);

        assert_eq!(
            code(SelectSqlNode::new().column("t.b").from("t").join("u", vec![])),
            ErrorCode::InvalidArgument
        );
        assert_eq!(
            code(SelectSqlNode::new().column("t.b").from("t").from("u").join("u", vec![cond])),
            ErrorCode::InvalidArgument
        );
    }

    #[test]
    fn test_aggregates() {
        let db = db();
        let node = SelectSqlNode::new()
            .aggregate(AggrFuncType::Count, "*")
            .aggregate(AggrFuncType::Sum, "b")
            .from("t");
        let stmt = SelectStmt::create(&db, &node).unwrap();
        assert_eq!(names(&stmt), vec!["COUNT(*)", "SUM(b)"]);
        let Expression::Aggregation(count) = &stmt.query_exprs()[0] else {
            panic!("expected aggregate");
        };
        assert_eq!(count.func(), AggrFuncType::CountStar);

        assert_eq!(
            code(SelectSqlNode::new().aggregate(AggrFuncType::Sum, "*").from("t")),
            ErrorCode::InvalidArgument
        );
        assert_eq!(
            code(SelectSqlNode::new().aggregate(AggrFuncType::Max, "z").from("t")),
            ErrorCode::FieldNotFound
        );
        assert_eq!(
            code(SelectSqlNode::new().aggregate(AggrFuncType::Max, "b").column("a").from("t")),
            ErrorCode::InvalidArgument
        );
    }

    #[test]
    fn test_repeated_aggregate_argument() {
        let db = db();
        let twice = |func| {
            let mut node = SelectSqlNode::new().from("t");
            node.select_exprs.push(SelectExprSqlNode::Aggregation(AggrFuncSqlNode {
                func,
                attributes: vec![RelAttrSqlNode::parse("b"), RelAttrSqlNode::parse("b")],
            }));
            SelectStmt::create(&db, &node)
        };
        assert!(twice(AggrFuncType::Sum).is_ok());
        assert!(twice(AggrFuncType::Avg).is_ok());
        assert_eq!(twice(AggrFuncType::Max).unwrap_err().code(), ErrorCode::InvalidArgument);
    }

    #[test]
    fn test_count_star_across_tables() {
        let node = SelectSqlNode::new()
            .aggregate(AggrFuncType::Count, "*")
            .from("t")
            .from("u");
        let stmt = SelectStmt::create(&db(), &node).unwrap();
        let Expression::Aggregation(count) = &stmt.query_exprs()[0] else {
            panic!("expected aggregate");
        };
        assert_eq!(count.table_name(), "t");
    }
}
