//! Aggregate expressions.
//!
//! An `AggregationExpr` describes *what* to aggregate. The running state
//! lives in an [`Accumulator`] owned by the aggregation operator, so the
//! expression itself is immutable and can be cloned freely between the
//! aggregation node (which computes results) and the projection (which
//! reads them back by alias).

use std::sync::Arc;

use kestrel_common::{KestrelError, KestrelResult};

use super::Field;
use crate::executor::accumulator::Accumulator;
use crate::executor::tuple::{Tuple, TupleCellSpec};
use crate::parser::AggrFuncType;
use crate::storage::Table;
use crate::value::{AttrType, Value};

/// What an aggregate reads.
#[derive(Debug, Clone)]
pub enum AggrTarget {
    /// `*`, attributed to a table so the planner knows where it belongs.
    Star(Arc<Table>),
    /// A column.
    Field(Field),
}

impl AggrTarget {
    /// Name of the table the target belongs to.
    pub fn table_name(&self) -> &str {
        match self {
            AggrTarget::Star(table) => table.name(),
            AggrTarget::Field(field) => field.table_name(),
        }
    }
}

impl PartialEq for AggrTarget {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (AggrTarget::Star(left), AggrTarget::Star(right)) => left.name() == right.name(),
            (AggrTarget::Field(left), AggrTarget::Field(right)) => left == right,
            _ => false,
        }
    }
}

/// `FUNC(target)`
#[derive(Debug, Clone, PartialEq)]
pub struct AggregationExpr {
    func: AggrFuncType,
    target: AggrTarget,
    alias: String,
}

impl AggregationExpr {
    /// Creates an aggregate. The alias is `FUNC(field)`, or `FUNC(table.field)`
    /// when `with_table` is set, or `FUNC(*)` for a star target.
    pub fn new(func: AggrFuncType, target: AggrTarget, with_table: bool) -> Self {
        let argument = match &target {
            AggrTarget::Star(_) => "*".to_string(),
            AggrTarget::Field(field) => field.name(with_table),
        };
        let alias = format!("{}({})", func.name(), argument);
        Self {
            func,
            target,
            alias,
        }
    }

    /// The function.
    pub fn func(&self) -> AggrFuncType {
        self.func
    }

    /// The target.
    pub fn target(&self) -> &AggrTarget {
        &self.target
    }

    /// The column read, `None` for `*`.
    pub fn field(&self) -> Option<&Field> {
        match &self.target {
            AggrTarget::Field(field) => Some(field),
            AggrTarget::Star(_) => None,
        }
    }

    /// Name of the table the aggregate reads.
    pub fn table_name(&self) -> &str {
        self.target.table_name()
    }

    /// Display name and lookup key of the result cell.
    pub fn alias(&self) -> &str {
        &self.alias
    }

    /// Spec of the result cell in an aggregated tuple.
    pub fn cell_spec(&self) -> TupleCellSpec {
        TupleCellSpec::from_alias(&self.alias)
    }

    /// Declared result type, used for result headers.
    ///
    /// `SUM` over an int column declares `Ints`, but its cell widens to
    /// `Floats` when the total leaves the `i32` range. Readers of a
    /// `SUM(int)` cell must accept either type.
    pub fn value_type(&self) -> AttrType {
        match self.func {
            AggrFuncType::Count | AggrFuncType::CountStar => AttrType::Ints,
            AggrFuncType::Avg => AttrType::Floats,
            AggrFuncType::Sum => match self.field().map(Field::attr_type) {
                Some(AttrType::Ints) => AttrType::Ints,
                _ => AttrType::Floats,
            },
            AggrFuncType::Max | AggrFuncType::Min => self
                .field()
                .map_or(AttrType::Undefined, Field::attr_type),
        }
    }

    /// Fresh accumulator for this aggregate.
    pub fn create_accumulator(&self) -> Accumulator {
        Accumulator::new(self.func)
    }

    /// Value to feed the accumulator for one input tuple. A star target
    /// feeds `Null`, which `COUNT(*)` still counts.
    pub fn input_value(&self, tuple: &Tuple) -> KestrelResult<Value> {
        match &self.target {
            AggrTarget::Star(_) => Ok(Value::Null),
            AggrTarget::Field(field) => tuple.find_cell(&field.cell_spec())?.ok_or_else(|| {
                KestrelError::field_not_found(field.table_name(), field.field_name())
            }),
        }
    }

    /// Reads the finalized result back out of an aggregated tuple.
    pub(super) fn evaluate(&self, tuple: &Tuple) -> KestrelResult<Value> {
        tuple.find_cell(&self.cell_spec())?.ok_or_else(|| {
            KestrelError::internal(format!("aggregate '{}' missing from tuple", self.alias))
        })
    }
}
