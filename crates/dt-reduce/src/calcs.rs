//! Single pass standard statistics over a value sequence

use ahash::AHashSet;
use dt_core::{NullValueMode, Value};

use crate::ReducerId;

/// Results of the standard one-pass calculation
#[derive(Debug, Clone, PartialEq)]
pub struct StandardCalcs {
    pub sum: f64,
    pub max: Option<f64>,
    pub min: Option<f64>,
    /// Smallest strictly positive number
    pub logmin: Option<f64>,
    pub mean: Option<f64>,
    pub first: Value,
    pub last: Value,
    pub first_not_null: Value,
    pub last_not_null: Value,
    /// Values taking part in the calculation (ignored nulls excluded)
    pub count: usize,
    pub non_null_count: usize,
    pub all_is_null: bool,
    pub all_is_zero: bool,
    pub range: Option<f64>,
    pub diff: Option<f64>,
    /// Accumulated increase, treating drops as counter resets
    pub delta: f64,
    /// Smallest step between consecutive numbers
    pub step: Option<f64>,
}

impl StandardCalcs {
    /// Run the standard calculation over `values`
    pub fn compute(values: &[Value], mode: NullValueMode) -> Self {
        let mut sum = 0.0;
        let mut max: Option<f64> = None;
        let mut min: Option<f64> = None;
        let mut logmin: Option<f64> = None;
        let mut first = Value::Null;
        let mut last = Value::Null;
        let mut first_not_null = Value::Null;
        let mut last_not_null = Value::Null;
        let mut count = 0;
        let mut non_null_count = 0;
        let mut all_is_null = true;
        let mut all_is_zero = true;
        let mut delta = 0.0;
        let mut step: Option<f64> = None;
        let mut previous_delta_up = true;
        let mut last_number: Option<f64> = None;

        for (i, raw) in values.iter().enumerate() {
            if i == 0 {
                first = raw.clone();
            }
            last = raw.clone();

            let current = match (raw, mode) {
                (Value::Null, NullValueMode::Ignore) => continue,
                (Value::Null, NullValueMode::AsZero) => Value::Number(0.0),
                _ => raw.clone(),
            };
            count += 1;

            if current.is_null() {
                continue;
            }
            if first_not_null.is_null() {
                first_not_null = current.clone();
            }

            if let Some(v) = current.as_f64() {
                sum += v;
                all_is_null = false;
                non_null_count += 1;

                if let Some(prev) = last_number {
                    let s = v - prev;
                    step = Some(step.map_or(s, |existing| existing.min(s)));
                    if prev > v {
                        // Counter reset; only the tail value counts when it ends the series
                        previous_delta_up = false;
                        if i == values.len() - 1 {
                            delta += v;
                        }
                    } else {
                        if previous_delta_up {
                            delta += s;
                        } else {
                            delta += v;
                        }
                        previous_delta_up = true;
                    }
                }

                max = Some(max.map_or(v, |m| m.max(v)));
                min = Some(min.map_or(v, |m| m.min(v)));
                if v > 0.0 {
                    logmin = Some(logmin.map_or(v, |m| m.min(v)));
                }
                if v != 0.0 {
                    all_is_zero = false;
                }
                last_number = Some(v);
            } else {
                all_is_zero = false;
            }

            last_not_null = current;
        }

        if all_is_null {
            all_is_zero = false;
        }
        let mean = (non_null_count > 0).then(|| sum / non_null_count as f64);
        let range = match (max, min) {
            (Some(max), Some(min)) => Some(max - min),
            _ => None,
        };
        let diff = match (first_not_null.as_f64(), last_not_null.as_f64()) {
            (Some(first), Some(last)) => Some(last - first),
            _ => None,
        };

        Self {
            sum,
            max,
            min,
            logmin,
            mean,
            first,
            last,
            first_not_null,
            last_not_null,
            count,
            non_null_count,
            all_is_null,
            all_is_zero,
            range,
            diff,
            delta,
            step,
        }
    }

    /// Value of a standard reducer; `None` for reducers computed elsewhere
    pub fn get(&self, id: ReducerId) -> Option<Value> {
        let value = match id {
            ReducerId::Sum => Value::Number(self.sum),
            ReducerId::Max => self.max.into(),
            ReducerId::Min => self.min.into(),
            ReducerId::Logmin => self.logmin.into(),
            ReducerId::Mean => self.mean.into(),
            ReducerId::First => self.first.clone(),
            ReducerId::Last => self.last.clone(),
            ReducerId::FirstNotNull => self.first_not_null.clone(),
            ReducerId::LastNotNull => self.last_not_null.clone(),
            ReducerId::Count => Value::Number(self.count as f64),
            ReducerId::AllIsNull => Value::Boolean(self.all_is_null),
            ReducerId::AllIsZero => Value::Boolean(self.all_is_zero),
            ReducerId::Range => self.range.into(),
            ReducerId::Diff => self.diff.into(),
            ReducerId::Delta => Value::Number(self.delta),
            ReducerId::Step => self.step.into(),
            ReducerId::ChangeCount | ReducerId::DistinctCount => return None,
        };
        Some(value)
    }
}

/// Number of times the value differs from its predecessor
pub fn change_count(values: &[Value], mode: NullValueMode) -> Value {
    let mut count = 0usize;
    let mut previous: Option<Value> = None;
    for raw in values {
        let current = match (raw, mode) {
            (Value::Null, NullValueMode::Ignore) => continue,
            (Value::Null, NullValueMode::AsZero) => Value::Number(0.0),
            _ => raw.clone(),
        };
        if let Some(prev) = &previous {
            if prev.identity_key() != current.identity_key() {
                count += 1;
            }
        }
        previous = Some(current);
    }
    Value::Number(count as f64)
}

/// Number of distinct non-null values
pub fn distinct_count(values: &[Value], mode: NullValueMode) -> Value {
    let zero = Value::Number(0.0);
    let mut distinct = AHashSet::new();
    for raw in values {
        match (raw, mode) {
            (Value::Null, NullValueMode::AsZero) => {
                distinct.insert(zero.identity_key());
            }
            (Value::Null, _) => {}
            _ => {
                distinct.insert(raw.identity_key());
            }
        }
    }
    Value::Number(distinct.len() as f64)
}
