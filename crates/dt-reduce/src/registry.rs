//! Registry of the known field reducers

use ahash::AHashSet;
use dt_core::{NullValueMode, Value};
use once_cell::sync::Lazy;

use crate::calcs::{change_count, distinct_count};
use crate::ReducerId;

/// Reduction function for reducers outside the standard calculation
pub type ReduceFn = fn(&[Value], NullValueMode) -> Value;

/// Descriptor of a reducer
#[derive(Debug, Clone)]
pub struct FieldReducerInfo {
    pub id: ReducerId,
    pub name: &'static str,
    pub description: &'static str,
    /// Alternative identifiers accepted in configuration
    pub aliases: &'static [&'static str],
    /// Dedicated implementation; `None` means the standard one-pass calculation
    pub reduce: Option<ReduceFn>,
}

impl FieldReducerInfo {
    fn standard(id: ReducerId, name: &'static str, description: &'static str) -> Self {
        Self {
            id,
            name,
            description,
            aliases: &[],
            reduce: None,
        }
    }

    fn with_aliases(mut self, aliases: &'static [&'static str]) -> Self {
        self.aliases = aliases;
        self
    }

    fn matches(&self, key: &str) -> bool {
        self.id.as_str() == key || self.aliases.contains(&key)
    }
}

/// Ordered set of reducers; the order is the canonical output order
#[derive(Debug, Clone)]
pub struct FieldReducerRegistry {
    items: Vec<FieldReducerInfo>,
}

static STANDARD: Lazy<FieldReducerRegistry> = Lazy::new(FieldReducerRegistry::standard);

/// The process-wide standard reducer registry
pub fn field_reducers() -> &'static FieldReducerRegistry {
    &STANDARD
}

impl FieldReducerRegistry {
    /// Create a registry holding `items` in the given order
    pub fn new(items: Vec<FieldReducerInfo>) -> Self {
        Self { items }
    }

    /// Registry with every built-in reducer
    pub fn standard() -> Self {
        Self::new(vec![
            FieldReducerInfo::standard(ReducerId::Max, "Max", "Maximum value"),
            FieldReducerInfo::standard(ReducerId::Min, "Min", "Minimum value"),
            FieldReducerInfo::standard(ReducerId::Mean, "Mean", "Average value").with_aliases(&["avg"]),
            FieldReducerInfo::standard(ReducerId::Last, "Last", "Last value"),
            FieldReducerInfo::standard(ReducerId::LastNotNull, "Last *", "Last non-null value")
                .with_aliases(&["current"]),
            FieldReducerInfo::standard(ReducerId::First, "First", "First value"),
            FieldReducerInfo::standard(ReducerId::FirstNotNull, "First *", "First non-null value"),
            FieldReducerInfo::standard(ReducerId::Sum, "Total", "The sum of all values").with_aliases(&["total"]),
            FieldReducerInfo::standard(ReducerId::Count, "Count", "Number of values in response"),
            FieldReducerInfo::standard(ReducerId::Range, "Range", "Difference between minimum and maximum values"),
            FieldReducerInfo::standard(ReducerId::Delta, "Delta", "Cumulative change in value"),
            FieldReducerInfo::standard(ReducerId::Step, "Step", "Minimum interval between values"),
            FieldReducerInfo::standard(ReducerId::Diff, "Difference", "Difference between first and last values"),
            FieldReducerInfo::standard(ReducerId::Logmin, "Min (above zero)", "Used for log min scale"),
            FieldReducerInfo {
                id: ReducerId::ChangeCount,
                name: "Change Count",
                description: "Number of times the value changes",
                aliases: &[],
                reduce: Some(change_count),
            },
            FieldReducerInfo {
                id: ReducerId::DistinctCount,
                name: "Distinct Count",
                description: "Number of distinct values",
                aliases: &[],
                reduce: Some(distinct_count),
            },
            FieldReducerInfo::standard(ReducerId::AllIsZero, "All Zeros", "All values are zero"),
            FieldReducerInfo::standard(ReducerId::AllIsNull, "All Nulls", "All values are null"),
        ])
    }

    /// All reducers in canonical order
    pub fn all(&self) -> &[FieldReducerInfo] {
        &self.items
    }

    /// Look up a reducer by id
    pub fn get(&self, id: ReducerId) -> Option<&FieldReducerInfo> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Look up a reducer by identifier or alias
    pub fn get_if_exists(&self, key: &str) -> Option<&FieldReducerInfo> {
        self.items.iter().find(|item| item.matches(key))
    }

    /// Resolve configured identifiers to known reducers.
    ///
    /// Unknown identifiers are dropped, duplicates (including aliases of
    /// the same reducer) collapse, and the result follows registry order.
    pub fn list<S: AsRef<str>>(&self, keys: &[S]) -> Vec<&FieldReducerInfo> {
        let mut wanted = AHashSet::with_capacity(keys.len());
        for key in keys {
            let key = key.as_ref();
            match self.get_if_exists(key) {
                Some(item) => {
                    wanted.insert(item.id);
                }
                None => tracing::debug!("Dropping unknown reducer id '{}'", key),
            }
        }
        self.items.iter().filter(|item| wanted.contains(&item.id)).collect()
    }
}

impl Default for FieldReducerRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_registry_covers_every_id() {
        let registry = field_reducers();
        assert_eq!(registry.all().len(), ReducerId::ALL.len());
        for id in ReducerId::ALL {
            assert_eq!(registry.get(id).map(|r| r.id), Some(id));
        }
    }

    #[test]
    fn test_list_uses_registry_order_and_dedupes() {
        let ids: Vec<ReducerId> = field_reducers()
            .list(&["max", "last", "max", "avg", "mean", "bogus"])
            .iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec![ReducerId::Max, ReducerId::Mean, ReducerId::Last]);
    }

    #[test]
    fn test_list_of_nothing() {
        let keys: [&str; 0] = [];
        assert!(field_reducers().list(&keys).is_empty());
        assert!(field_reducers().list(&["nope"]).is_empty());
    }

    #[test]
    fn test_aliases_resolve() {
        let registry = field_reducers();
        assert_eq!(registry.get_if_exists("current").map(|r| r.id), Some(ReducerId::LastNotNull));
        assert_eq!(registry.get_if_exists("total").map(|r| r.name), Some("Total"));
    }
}
