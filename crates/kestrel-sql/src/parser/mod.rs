//! Parse-tree nodes.
//!
//! These are the shapes a SQL front end hands to statement binding. The
//! grammar itself lives outside this crate; the nodes carry builder methods
//! so statements can be assembled directly in code and tests.
//!
//! # Usage
//!
//! ```
//! use kestrel_sql::parser::{AggrFuncType, CompOp, ConditionSqlNode, SelectSqlNode};
//!
//! let select = SelectSqlNode::new()
//!     .aggregate(AggrFuncType::Sum, "b")
//!     .from("t")
//!     .filter(ConditionSqlNode::attr_value("a", CompOp::GreatThan, 1));
//! assert_eq!(select.relations, vec!["t".to_string()]);
//! ```

mod nodes;

pub use nodes::*;
