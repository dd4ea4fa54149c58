//! Aggregate accumulators.
//!
//! Each accumulator is a small state machine: `reset` puts it back to the
//! empty state, `accumulate` folds one input value in, and `finalize`
//! reads the result without consuming the state.
//!
//! Results over an empty input:
//!
//! | function          | result |
//! |-------------------|--------|
//! | `COUNT`, `COUNT(*)` | `0`  |
//! | `SUM`, `AVG`      | `NULL` |
//! | `MAX`, `MIN`      | `NULL` |

use std::cmp::Ordering;

use kestrel_common::{KestrelError, KestrelResult};

use crate::parser::AggrFuncType;
use crate::value::Value;

/// Running state for one aggregate.
#[derive(Debug, Clone)]
pub struct Accumulator {
    func: AggrFuncType,
    state: AccumulatorState,
}

#[derive(Debug, Clone)]
enum AccumulatorState {
    Count(i64),
    Sum {
        int_sum: i64,
        float_sum: f64,
        all_ints: bool,
        seen: bool,
    },
    Avg {
        sum: f64,
        count: i64,
    },
    Extreme(Option<Value>),
}

impl AccumulatorState {
    fn initial(func: AggrFuncType) -> Self {
        match func {
            AggrFuncType::Count | AggrFuncType::CountStar => AccumulatorState::Count(0),
            AggrFuncType::Sum => AccumulatorState::Sum {
                int_sum: 0,
                float_sum: 0.0,
                all_ints: true,
                seen: false,
            },
            AggrFuncType::Avg => AccumulatorState::Avg { sum: 0.0, count: 0 },
            AggrFuncType::Max | AggrFuncType::Min => AccumulatorState::Extreme(None),
        }
    }
}

impl Accumulator {
    /// Creates an empty accumulator.
    pub fn new(func: AggrFuncType) -> Self {
        Self {
            func,
            state: AccumulatorState::initial(func),
        }
    }

    /// The aggregate function.
    pub fn func(&self) -> AggrFuncType {
        self.func
    }

    /// Returns to the empty state.
    pub fn reset(&mut self) {
        self.state = AccumulatorState::initial(self.func);
    }

    /// Folds one value in. `NULL` is skipped by everything except
    /// `COUNT(*)`.
    pub fn accumulate(&mut self, value: &Value) -> KestrelResult<()> {
        if value.is_null() && self.func != AggrFuncType::CountStar {
            return Ok(());
        }

        match &mut self.state {
            AccumulatorState::Count(count) => *count += 1,
            AccumulatorState::Sum {
                int_sum,
                float_sum,
                all_ints,
                seen,
            } => {
                check_summable(self.func, value)?;
                match value {
                    Value::Int(v) => *int_sum += i64::from(*v),
                    Value::Boolean(b) => *int_sum += i64::from(*b),
                    other => {
                        *all_ints = false;
                        *float_sum += f64::from(other.get_float());
                    }
                }
                *seen = true;
            }
            AccumulatorState::Avg { sum, count } => {
                check_summable(self.func, value)?;
                *sum += f64::from(value.get_float());
                *count += 1;
            }
            AccumulatorState::Extreme(current) => {
                let replace = match current {
                    None => true,
                    Some(existing) => {
                        let wanted = if self.func == AggrFuncType::Max {
                            Ordering::Greater
                        } else {
                            Ordering::Less
                        };
                        value.compare_with(existing) == Some(wanted)
                    }
                };
                if replace {
                    *current = Some(value.clone());
                }
            }
        }
        Ok(())
    }

    /// The current result.
    pub fn finalize(&self) -> Value {
        match &self.state {
            AccumulatorState::Count(count) => Value::Int(saturate(*count)),
            AccumulatorState::Sum {
                int_sum,
                float_sum,
                all_ints,
                seen,
            } => {
                if !*seen {
                    Value::Null
                } else if *all_ints {
                    match i32::try_from(*int_sum) {
                        Ok(v) => Value::Int(v),
                        Err(_) => Value::Float(*int_sum as f32),
                    }
                } else {
                    Value::Float((*float_sum + *int_sum as f64) as f32)
                }
            }
            AccumulatorState::Avg { sum, count } => {
                if *count == 0 {
                    Value::Null
                } else {
                    Value::Float((*sum / *count as f64) as f32)
                }
            }
            AccumulatorState::Extreme(current) => current.clone().unwrap_or(Value::Null),
        }
    }
}

fn check_summable(func: AggrFuncType, value: &Value) -> KestrelResult<()> {
    if let Value::Date(_) = value {
        return Err(KestrelError::invalid_argument(format!(
            "{func} is not defined over dates"
        )));
    }
    Ok(())
}

fn saturate(count: i64) -> i32 {
    i32::try_from(count).unwrap_or(i32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Date;

    fn run(func: AggrFuncType, values: &[Value]) -> Value {
        let mut acc = Accumulator::new(func);
        for value in values {
            acc.accumulate(value).unwrap();
        }
        acc.finalize()
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(run(AggrFuncType::Count, &[]), Value::Int(0));
        assert_eq!(run(AggrFuncType::CountStar, &[]), Value::Int(0));
        assert_eq!(run(AggrFuncType::Sum, &[]), Value::Null);
        assert_eq!(run(AggrFuncType::Avg, &[]), Value::Null);
        assert_eq!(run(AggrFuncType::Max, &[]), Value::Null);
        assert_eq!(run(AggrFuncType::Min, &[]), Value::Null);
    }

    #[test]
    fn test_count_skips_null_unless_star() {
        let values = [Value::Int(1), Value::Null, Value::Int(3)];
        assert_eq!(run(AggrFuncType::Count, &values), Value::Int(2));
        assert_eq!(run(AggrFuncType::CountStar, &values), Value::Int(3));
    }

    #[test]
    fn test_sum_keeps_int_type() {
        assert_eq!(
            run(AggrFuncType::Sum, &[Value::Int(20), Value::Int(30)]),
            Value::Int(50)
        );
        assert_eq!(
            run(AggrFuncType::Sum, &[Value::Int(i32::MAX), Value::Int(1)]),
            Value::Float(i32::MAX as f32 + 1.0)
        );
        assert_eq!(
            run(AggrFuncType::Sum, &[Value::Float(1.5), Value::Int(2)]),
            Value::Float(3.5)
        );
    }

    #[test]
    fn test_avg() {
        assert_eq!(
            run(AggrFuncType::Avg, &[Value::Int(1), Value::Int(2)]),
            Value::Float(1.5)
        );
    }

    #[test]
    fn test_extremes() {
        let values = [Value::from("b"), Value::from("c"), Value::from("a")];
        assert_eq!(run(AggrFuncType::Max, &values), Value::from("c"));
        assert_eq!(run(AggrFuncType::Min, &values), Value::from("a"));

        let dates = [
            Value::Date(Date::from_ymd(2021, 5, 1).unwrap()),
            Value::Date(Date::from_ymd(2020, 12, 31).unwrap()),
        ];
        assert_eq!(run(AggrFuncType::Min, &dates), dates[1]);
    }

    #[test]
    fn test_sum_over_dates_fails() {
        let mut acc = Accumulator::new(AggrFuncType::Sum);
        let date = Value::Date(Date::from_ymd(2020, 1, 1).unwrap());
        assert!(acc.accumulate(&date).is_err());
    }

    #[test]
    fn test_reset() {
        let mut acc = Accumulator::new(AggrFuncType::Count);
        acc.accumulate(&Value::Int(1)).unwrap();
        acc.reset();
        assert_eq!(acc.finalize(), Value::Int(0));
    }
}
