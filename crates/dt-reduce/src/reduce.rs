//! Reducing field values to scalars

use dt_core::{Field, NullValueMode, Value};
use indexmap::IndexMap;

use crate::calcs::StandardCalcs;
use crate::registry::{field_reducers, FieldReducerRegistry};
use crate::ReducerId;

/// Reduced value per requested reducer, in request order
pub type FieldCalcs = IndexMap<ReducerId, Value>;

/// Reduce `values` with every reducer in `reducers`.
///
/// The standard calculation runs at most once no matter how many
/// standard reducers are requested.
pub fn reduce_values(values: &[Value], reducers: &[ReducerId], mode: NullValueMode) -> FieldCalcs {
    reduce_values_with(field_reducers(), values, reducers, mode)
}

/// Same as [`reduce_values`] against an explicit registry
pub fn reduce_values_with(
    registry: &FieldReducerRegistry,
    values: &[Value],
    reducers: &[ReducerId],
    mode: NullValueMode,
) -> FieldCalcs {
    let mut standard: Option<StandardCalcs> = None;
    let mut calcs = FieldCalcs::with_capacity(reducers.len());

    for &id in reducers {
        if calcs.contains_key(&id) {
            continue;
        }
        let custom = registry.get(id).and_then(|info| info.reduce);
        let value = match custom {
            Some(reduce) => reduce(values, mode),
            None => {
                let standard = standard.get_or_insert_with(|| StandardCalcs::compute(values, mode));
                standard.get(id).unwrap_or(Value::Null)
            }
        };
        calcs.insert(id, value);
    }
    calcs
}

/// Reduce a field's values using its configured null handling
pub fn reduce_field(field: &Field, reducers: &[ReducerId]) -> FieldCalcs {
    reduce_values(field.values.as_slice(), reducers, field.null_value_mode())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dt_core::FieldConfig;
    use proptest::prelude::*;

    #[test]
    fn test_reduce_values_keeps_request_order() {
        let values = vec![Value::from(10.0), Value::from(30.0), Value::from(20.0)];
        let calcs = reduce_values(
            &values,
            &[ReducerId::Last, ReducerId::Max, ReducerId::DistinctCount],
            NullValueMode::Null,
        );
        let entries: Vec<_> = calcs.into_iter().collect();
        assert_eq!(
            entries,
            vec![
                (ReducerId::Last, Value::from(20.0)),
                (ReducerId::Max, Value::from(30.0)),
                (ReducerId::DistinctCount, Value::from(3.0)),
            ]
        );
    }

    #[test]
    fn test_reduce_field_uses_null_mode() {
        let field = Field::new(
            "value",
            dt_core::FieldType::Number,
            vec![Value::from(2.0), Value::Null],
        );
        let calcs = reduce_field(&field, &[ReducerId::Mean]);
        assert_eq!(calcs[&ReducerId::Mean], Value::from(2.0));

        let config = FieldConfig {
            null_value_mode: Some(NullValueMode::AsZero),
            ..FieldConfig::default()
        };
        let calcs = reduce_field(&field.with_config(config), &[ReducerId::Mean]);
        assert_eq!(calcs[&ReducerId::Mean], Value::from(1.0));
    }

    proptest! {
        #[test]
        fn prop_max_bounds_every_value(values in prop::collection::vec(-1.0e6f64..1.0e6, 1..50)) {
            let input: Vec<Value> = values.iter().copied().map(Value::from).collect();
            let calcs = reduce_values(&input, &[ReducerId::Max, ReducerId::Min, ReducerId::Mean], NullValueMode::Null);
            let max = calcs[&ReducerId::Max].as_f64().unwrap();
            let min = calcs[&ReducerId::Min].as_f64().unwrap();
            let mean = calcs[&ReducerId::Mean].as_f64().unwrap();
            prop_assert!(values.iter().all(|v| *v <= max && *v >= min));
            prop_assert!(mean <= max + 1e-6 && mean >= min - 1e-6);
        }

        #[test]
        fn prop_reduction_is_deterministic(values in prop::collection::vec(prop::option::of(-100.0f64..100.0), 0..30)) {
            let input: Vec<Value> = values.iter().copied().map(Value::from).collect();
            let ids = ReducerId::ALL;
            prop_assert_eq!(
                reduce_values(&input, &ids, NullValueMode::Null),
                reduce_values(&input, &ids, NullValueMode::Null)
            );
        }
    }
}
