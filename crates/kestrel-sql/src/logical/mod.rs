//! Logical planning.
//!
//! The [`LogicalPlanGenerator`] compiles a bound [`Stmt`](crate::stmt::Stmt)
//! into a tree of [`LogicalOperator`]s, pushing single-table comparisons
//! from the WHERE clause down into table scans on the way.

mod generator;
mod operator;
mod plan;
mod pushdown;

pub use generator::LogicalPlanGenerator;
pub use operator::*;
pub use plan::LogicalPlan;
pub use pushdown::split_pushable;
