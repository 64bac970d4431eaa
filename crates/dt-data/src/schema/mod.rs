use chrono::{DateTime, NaiveDate, NaiveDateTime};

use dt_core::{FieldType, Value};

use crate::config::NullConfig;

/// Naive datetime layouts accepted for time columns
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

/// Schema detector for analyzing text columns and choosing field types
#[derive(Debug, Clone)]
pub struct SchemaDetector {
    sample_size: usize,
    null_config: NullConfig,
}

/// Statistics about a sampled column
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnStats {
    pub null_count: usize,
    pub non_null_count: usize,
}

impl SchemaDetector {
    /// Create a new schema detector
    pub fn new() -> Self {
        Self {
            sample_size: 1000,
            null_config: NullConfig::default(),
        }
    }

    /// Set the sample size for detection
    pub fn with_sample_size(mut self, size: usize) -> Self {
        self.sample_size = size;
        self
    }

    pub fn with_null_config(mut self, null_config: NullConfig) -> Self {
        self.null_config = null_config;
        self
    }

    /// Detect one field type per column from sample rows
    pub fn detect_from_samples(&self, column_count: usize, samples: &[Vec<String>]) -> Vec<FieldType> {
        (0..column_count)
            .map(|col_idx| self.analyze_column(samples, col_idx).0)
            .collect()
    }

    /// Analyze a single column
    pub fn analyze_column(&self, samples: &[Vec<String>], col_idx: usize) -> (FieldType, ColumnStats) {
        let mut stats = ColumnStats::default();
        let mut is_bool = true;
        let mut is_number = true;
        let mut is_time = true;

        for row in samples.iter().take(self.sample_size) {
            let cell = match row.get(col_idx) {
                Some(cell) if !self.null_config.is_null(cell) => cell.trim(),
                _ => {
                    stats.null_count += 1;
                    continue;
                }
            };
            stats.non_null_count += 1;

            if is_bool && parse_bool(cell).is_none() {
                is_bool = false;
            }
            if is_number && cell.parse::<f64>().is_err() {
                is_number = false;
            }
            if is_time && parse_time(cell).is_none() {
                is_time = false;
            }
        }

        // All-null columns stay untyped
        let field_type = if stats.non_null_count == 0 {
            FieldType::Other
        } else if is_bool {
            FieldType::Boolean
        } else if is_number {
            FieldType::Number
        } else if is_time {
            FieldType::Time
        } else {
            FieldType::String
        };

        (field_type, stats)
    }

    /// Convert a text cell to a value of the given type.
    ///
    /// Cells that fail to parse load as null rather than failing the file.
    pub fn parse_cell(&self, cell: &str, field_type: FieldType) -> Value {
        if self.null_config.is_null(cell) {
            return Value::Null;
        }
        let trimmed = cell.trim();

        match field_type {
            FieldType::Number => trimmed.parse::<f64>().map(Value::Number).unwrap_or(Value::Null),
            FieldType::Time => parse_time(trimmed)
                .map(|ms| Value::Number(ms as f64))
                .unwrap_or(Value::Null),
            FieldType::Boolean => parse_bool(trimmed).map(Value::Boolean).unwrap_or(Value::Null),
            FieldType::String | FieldType::Other => Value::String(cell.to_string()),
        }
    }
}

impl Default for SchemaDetector {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a boolean cell
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

/// Parse a time cell into epoch milliseconds
pub fn parse_time(value: &str) -> Option<i64> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.timestamp_millis());
    }
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Some(dt.and_utc().timestamp_millis());
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc().timestamp_millis());
        }
    }
    None
}
