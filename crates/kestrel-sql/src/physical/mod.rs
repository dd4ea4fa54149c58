//! Physical operators.
//!
//! Every operator implements the same pull protocol:
//!
//! ```text
//!   Created ──open(trx)──► Opened ──next()──► Producing ──next()──► EndOfStream
//!                                                 ▲    │                 │
//!                                                 └────┘              close()
//!                                                                        ▼
//!                                                                     Closed
//! ```
//!
//! - `open` prepares operator state and opens one level of children
//! - `next` yields at most one tuple; [`Next::EndOfStream`] is a normal
//!   outcome, not an error
//! - `current_tuple` is valid between a `next` that returned
//!   [`Next::Tuple`] and the following call
//! - `close` closes every child even if some fail, then reports a single
//!   internal error
//!
//! Calling `next` before `open` or after `close` fails with an internal
//! error.

mod aggregation;
mod delete;
mod explain;
mod generator;
mod insert;
mod join;
mod predicate;
mod project;
mod table_scan;
mod update;

use std::fmt;
use std::sync::Arc;

use tracing::warn;

use kestrel_common::{KestrelError, KestrelResult};

pub use aggregation::AggregationPhysicalOperator;
pub use delete::DeletePhysicalOperator;
pub use explain::{render_plan, ExplainPhysicalOperator};
pub use generator::PhysicalPlanGenerator;
pub use insert::InsertPhysicalOperator;
pub use join::NestedLoopJoinPhysicalOperator;
pub use predicate::PredicatePhysicalOperator;
pub use project::ProjectPhysicalOperator;
pub use table_scan::TableScanPhysicalOperator;
pub use update::UpdatePhysicalOperator;

use crate::executor::tuple::Tuple;
use crate::storage::Trx;

/// Outcome of a successful `next` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Next {
    /// A tuple is available through `current_tuple`.
    Tuple,
    /// No more tuples.
    EndOfStream,
}

/// Physical operator kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhysicalOperatorType {
    /// Table scan.
    TableScan,
    /// Filter.
    Predicate,
    /// Nested-loop join.
    NestedLoopJoin,
    /// Aggregation.
    Aggregation,
    /// Projection.
    Project,
    /// Insert.
    Insert,
    /// Update.
    Update,
    /// Delete.
    Delete,
    /// Explain.
    Explain,
}

impl PhysicalOperatorType {
    /// Name used in EXPLAIN output.
    pub const fn name(self) -> &'static str {
        match self {
            PhysicalOperatorType::TableScan => "TABLE_SCAN",
            PhysicalOperatorType::Predicate => "PREDICATE",
            PhysicalOperatorType::NestedLoopJoin => "NESTED_LOOP_JOIN",
            PhysicalOperatorType::Aggregation => "AGGREGATION",
            PhysicalOperatorType::Project => "PROJECT",
            PhysicalOperatorType::Insert => "INSERT",
            PhysicalOperatorType::Update => "UPDATE",
            PhysicalOperatorType::Delete => "DELETE",
            PhysicalOperatorType::Explain => "EXPLAIN",
        }
    }
}

impl fmt::Display for PhysicalOperatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An executable plan node.
pub trait PhysicalOperator: fmt::Debug + Send {
    /// Operator kind.
    fn kind(&self) -> PhysicalOperatorType;

    /// Name used in EXPLAIN output.
    fn name(&self) -> &'static str {
        self.kind().name()
    }

    /// Parameters shown next to the name in EXPLAIN output.
    fn param(&self) -> String {
        String::new()
    }

    /// Prepares for execution and opens children.
    fn open(&mut self, trx: &Arc<Trx>) -> KestrelResult<()>;

    /// Advances to the next tuple.
    fn next(&mut self) -> KestrelResult<Next>;

    /// Releases resources and closes children.
    fn close(&mut self) -> KestrelResult<()>;

    /// The tuple produced by the last successful `next`.
    fn current_tuple(&self) -> Option<&Tuple>;

    /// Child operators.
    fn children(&self) -> &[Box<dyn PhysicalOperator>];

    /// Rows changed by a DML operator.
    fn affected_rows(&self) -> usize {
        0
    }
}

/// Lifecycle state shared by every operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OperatorState {
    /// Built, not yet opened.
    #[default]
    Created,
    /// Opened, no `next` yet.
    Opened,
    /// At least one tuple produced.
    Producing,
    /// `next` reported end-of-stream.
    EndOfStream,
    /// Closed.
    Closed,
}

impl OperatorState {
    /// Transition for `open`.
    pub fn on_open(&mut self, op: PhysicalOperatorType) -> KestrelResult<()> {
        match self {
            OperatorState::Created => {
                *self = OperatorState::Opened;
                Ok(())
            }
            state => Err(contract_violation(op, "open", *state)),
        }
    }

    /// Check before `next`.
    pub fn check_next(&self, op: PhysicalOperatorType) -> KestrelResult<()> {
        match self {
            OperatorState::Opened | OperatorState::Producing | OperatorState::EndOfStream => Ok(()),
            state => Err(contract_violation(op, "next", *state)),
        }
    }

    /// Records the outcome of `next` and passes it through.
    pub fn after_next(&mut self, next: Next) -> Next {
        *self = match next {
            Next::Tuple => OperatorState::Producing,
            Next::EndOfStream => OperatorState::EndOfStream,
        };
        next
    }

    /// Transition for `close`. Closing an operator that was never opened is
    /// allowed so a failed `open` can still be cleaned up.
    pub fn on_close(&mut self, op: PhysicalOperatorType) -> KestrelResult<()> {
        match self {
            OperatorState::Closed => Err(contract_violation(op, "close", *self)),
            _ => {
                *self = OperatorState::Closed;
                Ok(())
            }
        }
    }

    /// Returns true when `current_tuple` may hold a row.
    pub fn is_producing(&self) -> bool {
        *self == OperatorState::Producing
    }
}

fn contract_violation(op: PhysicalOperatorType, call: &str, state: OperatorState) -> KestrelError {
    KestrelError::internal(format!("{op}: {call} called in state {state:?}"))
}

/// Opens every child in order, stopping at the first failure.
pub(crate) fn open_children(
    op: PhysicalOperatorType,
    children: &mut [Box<dyn PhysicalOperator>],
    trx: &Arc<Trx>,
) -> KestrelResult<()> {
    for child in children.iter_mut() {
        if let Err(e) = child.open(trx) {
            warn!(operator = %op, child = %child.kind(), error = %e, "failed to open child operator");
            return Err(e);
        }
    }
    Ok(())
}

/// Closes every child, even after failures, and reports one internal error
/// if any child failed.
pub(crate) fn close_children(
    op: PhysicalOperatorType,
    children: &mut [Box<dyn PhysicalOperator>],
) -> KestrelResult<()> {
    let mut failed = 0;
    for child in children.iter_mut() {
        if let Err(e) = child.close() {
            warn!(operator = %op, child = %child.kind(), error = %e, "failed to close child operator");
            failed += 1;
        }
    }
    if failed > 0 {
        return Err(KestrelError::internal(format!(
            "{failed} child operator(s) of {op} failed to close"
        )));
    }
    Ok(())
}

/// Fails unless the operator has exactly `expected` children.
pub(crate) fn expect_children(
    op: PhysicalOperatorType,
    children: &[Box<dyn PhysicalOperator>],
    expected: usize,
) -> KestrelResult<()> {
    if children.len() != expected {
        return Err(KestrelError::internal(format!(
            "{op} expects {expected} child operator(s), has {}",
            children.len()
        )));
    }
    Ok(())
}

/// Pulls the current tuple of a child that just returned [`Next::Tuple`].
pub(crate) fn child_tuple<'a>(
    op: PhysicalOperatorType,
    child: &'a dyn PhysicalOperator,
) -> KestrelResult<&'a Tuple> {
    child.current_tuple().ok_or_else(|| {
        warn!(operator = %op, child = %child.kind(), "child produced no tuple");
        KestrelError::internal(format!("{} produced no current tuple", child.kind()))
    })
}
