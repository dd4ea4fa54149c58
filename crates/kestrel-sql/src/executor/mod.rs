//! Statement execution.
//!
//! [`SqlExecutor`] is the entry point: it binds a parsed statement, plans
//! it, lowers the plan and drives the physical tree through
//! `open → next* → close`, collecting rows into a [`ResultSet`].

pub mod accumulator;
mod engine;
mod result;
pub mod tuple;

pub use accumulator::Accumulator;
pub use engine::SqlExecutor;
pub use result::{ResultColumn, ResultSet};
pub use tuple::{JoinedTuple, RowTuple, Tuple, TupleCellSpec, ValueListTuple};
