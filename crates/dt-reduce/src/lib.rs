//! Field reducers: named aggregations that turn a value sequence into a
//! single scalar.

pub mod calcs;
pub mod reduce;
pub mod registry;

use std::fmt;
use std::str::FromStr;
use serde::{Serialize, Deserialize};
use thiserror::Error;

// Re-exports
pub use calcs::StandardCalcs;
pub use reduce::{reduce_field, reduce_values, reduce_values_with, FieldCalcs};
pub use registry::{field_reducers, FieldReducerInfo, FieldReducerRegistry};

/// Errors that can occur when naming reducers
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReduceError {
    #[error("Unknown reducer: {0}")]
    UnknownReducer(String),
}

/// Canonical reducer identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReducerId {
    Max,
    Min,
    Mean,
    Last,
    LastNotNull,
    First,
    FirstNotNull,
    Sum,
    Count,
    Range,
    Delta,
    Step,
    Diff,
    Logmin,
    ChangeCount,
    DistinctCount,
    AllIsZero,
    AllIsNull,
}

impl ReducerId {
    pub const ALL: [ReducerId; 18] = [
        ReducerId::Max,
        ReducerId::Min,
        ReducerId::Mean,
        ReducerId::Last,
        ReducerId::LastNotNull,
        ReducerId::First,
        ReducerId::FirstNotNull,
        ReducerId::Sum,
        ReducerId::Count,
        ReducerId::Range,
        ReducerId::Delta,
        ReducerId::Step,
        ReducerId::Diff,
        ReducerId::Logmin,
        ReducerId::ChangeCount,
        ReducerId::DistinctCount,
        ReducerId::AllIsZero,
        ReducerId::AllIsNull,
    ];

    /// The wire identifier, e.g. `lastNotNull`
    pub fn as_str(&self) -> &'static str {
        match self {
            ReducerId::LastNotNull => "lastNotNull",
            ReducerId::Last => "last",
            ReducerId::FirstNotNull => "firstNotNull",
            ReducerId::First => "first",
            ReducerId::Min => "min",
            ReducerId::Max => "max",
            ReducerId::Mean => "mean",
            ReducerId::Sum => "sum",
            ReducerId::Count => "count",
            ReducerId::Range => "range",
            ReducerId::Delta => "delta",
            ReducerId::Step => "step",
            ReducerId::Diff => "diff",
            ReducerId::Logmin => "logmin",
            ReducerId::ChangeCount => "changeCount",
            ReducerId::DistinctCount => "distinctCount",
            ReducerId::AllIsZero => "allIsZero",
            ReducerId::AllIsNull => "allIsNull",
        }
    }
}

impl fmt::Display for ReducerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReducerId {
    type Err = ReduceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ReducerId::ALL
            .iter()
            .copied()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| ReduceError::UnknownReducer(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_names_match_serde() {
        for id in ReducerId::ALL {
            let json = serde_json::to_string(&id).unwrap();
            assert_eq!(json, format!("\"{}\"", id.as_str()));
            assert_eq!(id.as_str().parse::<ReducerId>().unwrap(), id);
        }
    }

    #[test]
    fn test_unknown_id() {
        assert_eq!(
            "median".parse::<ReducerId>(),
            Err(ReduceError::UnknownReducer("median".to_string()))
        );
    }
}
