//! Calculate-to-row: append one summary row per frame
//!
//! Every configured field is reduced (max, mean, last, ...) and the
//! result is appended as a new row. One output field is produced per
//! selected reducer; fields without reducers get a null placeholder so
//! all columns keep the same length.

use std::borrow::Cow;
use ahash::AHashSet;
use indexmap::IndexMap;
use serde::{Serialize, Deserialize};
use tracing::debug;

use dt_core::{
    DataFrame, DisplayNameResolver, Field, FieldNameResolver, StatValue, StatValueIndex, Value,
    ValueVector,
};
use dt_reduce::{field_reducers, reduce_values_with, FieldReducerRegistry, ReducerId};

use crate::transformer::{DataTransformer, TransformerId, TransformerInfo};

/// Reducer identifiers keyed by field display name
pub type ReducerConfig = IndexMap<String, Vec<String>>;

/// Options of the calculate-to-row transformation
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CalculateToRowOptions {
    #[serde(default)]
    pub reducers: ReducerConfig,
}

impl CalculateToRowOptions {
    /// Select `reducers` for the field displayed as `field`
    pub fn with_reducers<S: Into<String>>(mut self, field: impl Into<String>, reducers: impl IntoIterator<Item = S>) -> Self {
        self.reducers.insert(field.into(), reducers.into_iter().map(Into::into).collect());
        self
    }

    /// True when no field has any reducer selected
    pub fn is_inactive(&self) -> bool {
        is_inactive(&self.reducers)
    }
}

pub const CALCULATE_TO_ROW_INFO: TransformerInfo = TransformerInfo {
    id: TransformerId::CalculateToRow,
    name: "Calculate To Row",
    description: "Append a new row by calculating each column to a single value using a function like max, min, mean or last",
};

/// Configured calculate-to-row transformer
#[derive(Debug, Clone, Default)]
pub struct CalculateToRowTransformer {
    options: CalculateToRowOptions,
}

impl CalculateToRowTransformer {
    pub fn new(options: CalculateToRowOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &CalculateToRowOptions {
        &self.options
    }
}

impl DataTransformer for CalculateToRowTransformer {
    fn info(&self) -> &TransformerInfo {
        &CALCULATE_TO_ROW_INFO
    }

    fn transform<'a>(&self, frames: &'a [DataFrame]) -> Cow<'a, [DataFrame]> {
        calculate_to_row(frames, &self.options.reducers)
    }
}

/// Append a summary row to every frame using the standard collaborators.
///
/// Returns `frames` itself when no reducer is selected for any field.
pub fn calculate_to_row<'a>(frames: &'a [DataFrame], reducers: &ReducerConfig) -> Cow<'a, [DataFrame]> {
    RowSynthesizer::standard().apply(frames, reducers)
}

fn is_inactive(reducers: &ReducerConfig) -> bool {
    reducers.values().all(Vec::is_empty)
}

/// Builds summary rows against a reducer registry and a name resolver
#[derive(Clone, Copy)]
pub struct RowSynthesizer<'r> {
    registry: &'r FieldReducerRegistry,
    resolver: &'r dyn FieldNameResolver,
}

impl RowSynthesizer<'static> {
    /// Synthesizer using the standard registry and display names
    pub fn standard() -> Self {
        Self {
            registry: field_reducers(),
            resolver: &DisplayNameResolver,
        }
    }
}

impl<'r> RowSynthesizer<'r> {
    pub fn new(registry: &'r FieldReducerRegistry, resolver: &'r dyn FieldNameResolver) -> Self {
        Self { registry, resolver }
    }

    /// Append one row to each frame; frames left without fields are dropped
    pub fn apply<'a>(&self, frames: &'a [DataFrame], reducers: &ReducerConfig) -> Cow<'a, [DataFrame]> {
        if is_inactive(reducers) {
            return Cow::Borrowed(frames);
        }

        let mut processed = Vec::with_capacity(frames.len());
        for (index, frame) in frames.iter().enumerate() {
            match self.synthesize_frame(frame, frames, reducers) {
                Some(frame) => processed.push(frame),
                None => debug!("Dropping frame {} ({:?}): no addressable fields", index, frame.name),
            }
        }
        Cow::Owned(processed)
    }

    fn synthesize_frame(&self, frame: &DataFrame, frames: &[DataFrame], reducers: &ReducerConfig) -> Option<DataFrame> {
        let row = frame.length;
        let mut fields = Vec::with_capacity(frame.fields.len());

        for (col, field) in frame.fields.iter().enumerate() {
            let Some(name) = self.resolver.resolve(field, frame, frames).filter(|n| !n.is_empty()) else {
                continue;
            };
            let keys = reducers.get(name.as_str()).map(Vec::as_slice).unwrap_or(&[]);
            let selected = self.registry.list(keys);

            if selected.is_empty() {
                fields.push(field.with_values(field.values.appended(Value::Null)));
                continue;
            }

            let ids: Vec<ReducerId> = selected.iter().map(|r| r.id).collect();
            let clean = original_values(field);
            let results = reduce_values_with(self.registry, clean.as_slice(), &ids, field.null_value_mode());

            for reducer in selected {
                let value = results.get(&reducer.id).cloned().unwrap_or_default();
                let stat = StatValue {
                    id: reducer.id.to_string(),
                    name: reducer.name.to_string(),
                    index: StatValueIndex { col, row },
                };
                fields.push(field.with_values_and_config(
                    field.values.appended(value),
                    field.config.with_stat_value(stat),
                ));
            }
        }

        if fields.is_empty() {
            return None;
        }
        Some(frame.with_fields(fields, frame.length + 1))
    }
}

/// The field's values minus rows appended by earlier passes
fn original_values(field: &Field) -> ValueVector {
    let stat_rows: AHashSet<usize> = field.config.stat_rows().collect();
    field.values.without_rows(&stat_rows)
}
