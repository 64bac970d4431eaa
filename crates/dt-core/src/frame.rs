//! Frames and fields
//!
//! Frames are immutable values. Derived copies are built with the
//! `with_*` builders, which always start from an empty display cache.

use indexmap::IndexMap;
use serde::{Serialize, Deserialize};

use crate::value::{FieldType, Value};
use crate::vector::ValueVector;

/// Ordered key/value labels attached to a field
pub type Labels = IndexMap<String, String>;

/// How null values take part in reductions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NullValueMode {
    /// Nulls are counted but skipped by numeric calculations
    #[default]
    Null,
    /// Nulls are skipped entirely
    Ignore,
    /// Nulls are treated as zero
    AsZero,
}

/// Position of a synthesized value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StatValueIndex {
    pub col: usize,
    pub row: usize,
}

/// Marks a value that was produced by a previous reduction pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatValue {
    /// Reducer identifier
    pub id: String,
    /// Reducer display name
    pub name: String,
    pub index: StatValueIndex,
}

/// Field metadata
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    /// Display name reported by the originating data source
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name_from_ds: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub null_value_mode: Option<NullValueMode>,

    /// Values appended by earlier reductions, oldest first
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stat_values: Vec<StatValue>,
}

impl FieldConfig {
    /// Config with `stat` appended to the existing stat values
    pub fn with_stat_value(&self, stat: StatValue) -> Self {
        let mut config = self.clone();
        config.stat_values.push(stat);
        config
    }

    /// Rows of the owning field holding synthesized values
    pub fn stat_rows(&self) -> impl Iterator<Item = usize> + '_ {
        self.stat_values.iter().map(|s| s.index.row)
    }
}

/// Derived display cache of a field.
///
/// Only valid for the exact value sequence it was computed from, so it is
/// never carried over to a derived field.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FieldState {
    display_name: Option<String>,
}

impl FieldState {
    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    pub fn set_display_name(&mut self, name: impl Into<String>) {
        self.display_name = Some(name.into());
    }

    pub fn clear(&mut self) {
        self.display_name = None;
    }

    pub fn is_empty(&self) -> bool {
        self.display_name.is_none()
    }
}

/// A named, typed column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,

    #[serde(rename = "type", default)]
    pub field_type: FieldType,

    pub values: ValueVector,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<Labels>,

    #[serde(default)]
    pub config: FieldConfig,

    #[serde(skip)]
    pub state: FieldState,
}

impl Field {
    /// Create a new field with default config
    pub fn new(name: impl Into<String>, field_type: FieldType, values: impl Into<ValueVector>) -> Self {
        Self {
            name: name.into(),
            field_type,
            values: values.into(),
            labels: None,
            config: FieldConfig::default(),
            state: FieldState::default(),
        }
    }

    /// Number field from plain numbers
    pub fn numbers(name: impl Into<String>, values: impl IntoIterator<Item = f64>) -> Self {
        Self::new(name, FieldType::Number, values.into_iter().map(Value::Number).collect::<ValueVector>())
    }

    /// Time field from epoch milliseconds
    pub fn times(name: impl Into<String>, values: impl IntoIterator<Item = i64>) -> Self {
        Self::new(name, FieldType::Time, values.into_iter().map(Value::from).collect::<ValueVector>())
    }

    pub fn strings<'a>(name: impl Into<String>, values: impl IntoIterator<Item = &'a str>) -> Self {
        Self::new(name, FieldType::String, values.into_iter().map(Value::from).collect::<ValueVector>())
    }

    pub fn with_labels(mut self, labels: Labels) -> Self {
        self.labels = Some(labels);
        self
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.config.display_name = Some(name.into());
        self
    }

    /// Copy of this field holding `values`
    pub fn with_values(&self, values: ValueVector) -> Self {
        Self {
            values,
            state: FieldState::default(),
            ..self.clone()
        }
    }

    /// Copy of this field carrying `config`
    pub fn with_config(&self, config: FieldConfig) -> Self {
        Self {
            config,
            state: FieldState::default(),
            ..self.clone()
        }
    }

    /// Copy of this field with both values and config replaced
    pub fn with_values_and_config(&self, values: ValueVector, config: FieldConfig) -> Self {
        Self {
            name: self.name.clone(),
            field_type: self.field_type,
            values,
            labels: self.labels.clone(),
            config,
            state: FieldState::default(),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn null_value_mode(&self) -> NullValueMode {
        self.config.null_value_mode.unwrap_or_default()
    }
}

/// An ordered collection of fields sharing a row count
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataFrame {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ref_id: Option<String>,

    pub fields: Vec<Field>,

    pub length: usize,
}

impl DataFrame {
    /// Create a frame, taking the row count from the first field
    pub fn new(fields: Vec<Field>) -> Self {
        let length = fields.first().map(Field::len).unwrap_or(0);
        Self {
            name: None,
            ref_id: None,
            fields,
            length,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_ref_id(mut self, ref_id: impl Into<String>) -> Self {
        self.ref_id = Some(ref_id.into());
        self
    }

    /// Copy of this frame with `fields` and `length` replaced
    pub fn with_fields(&self, fields: Vec<Field>, length: usize) -> Self {
        Self {
            name: self.name.clone(),
            ref_id: self.ref_id.clone(),
            fields,
            length,
        }
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Whether every field holds exactly `length` values
    pub fn is_consistent(&self) -> bool {
        self.fields.iter().all(|f| f.len() == self.length)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stat(row: usize) -> StatValue {
        StatValue {
            id: "max".to_string(),
            name: "Max".to_string(),
            index: StatValueIndex { col: 0, row },
        }
    }

    #[test]
    fn test_builders_reset_display_cache() {
        let mut field = Field::numbers("value", [1.0, 2.0]);
        field.state.set_display_name("value");

        let copy = field.with_values(field.values.appended(Value::Null));
        assert!(copy.state.is_empty());
        assert_eq!(field.state.display_name(), Some("value"));
        assert_eq!(field.len(), 2);

        let copy = field.with_config(FieldConfig::default());
        assert!(copy.state.is_empty());
    }

    #[test]
    fn test_stat_values_are_cumulative() {
        let config = FieldConfig::default().with_stat_value(stat(3));
        let unit = FieldConfig {
            unit: Some("ms".to_string()),
            ..config
        };
        let next = unit.with_stat_value(stat(4));

        assert_eq!(next.stat_rows().collect::<Vec<_>>(), vec![3, 4]);
        assert_eq!(next.unit.as_deref(), Some("ms"));
        assert_eq!(unit.stat_rows().collect::<Vec<_>>(), vec![3]);
    }

    #[test]
    fn test_frame_json_round_trip_drops_state() {
        let mut field = Field::numbers("value", [1.0]);
        field.state.set_display_name("cached");
        let frame = DataFrame::new(vec![field]).with_name("A");

        let json = serde_json::to_string(&frame).unwrap();
        let parsed: DataFrame = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.name.as_deref(), Some("A"));
        assert!(parsed.fields[0].state.is_empty());
        assert!(parsed.is_consistent());
    }
}
