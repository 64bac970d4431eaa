//! Per-file loading configuration

use std::collections::HashMap;
use std::path::PathBuf;
use serde::{Serialize, Deserialize};

use dt_core::FieldType;

use super::null_handling::NullConfig;
use crate::DataError;

/// Configuration for a single input file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Path to the file
    pub path: PathBuf,

    /// Frame name; defaults to the file stem
    pub name: Option<String>,

    /// Query/ref identifier attached to the frame
    pub ref_id: Option<String>,

    /// Field delimiter
    pub delimiter: char,

    /// Whether the first record holds column names
    pub has_headers: bool,

    /// Column type overrides
    pub column_types: HashMap<String, FieldType>,

    /// Null handling configuration
    pub null_config: NullConfig,

    /// Sample size for type inference
    pub sample_size: usize,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::new(),
            name: None,
            ref_id: None,
            delimiter: ',',
            has_headers: true,
            column_types: HashMap::new(),
            null_config: NullConfig::default(),
            sample_size: 1000,
        }
    }
}

impl FileConfig {
    /// Create a new file configuration
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// Frame name: the configured name or the file stem
    pub fn frame_name(&self) -> String {
        self.name.clone().unwrap_or_else(|| {
            self.path
                .file_stem()
                .and_then(|n| n.to_str())
                .unwrap_or("unknown")
                .to_string()
        })
    }

    /// Get column type with override
    pub fn column_type(&self, column: &str, detected: FieldType) -> FieldType {
        self.column_types.get(column).copied().unwrap_or(detected)
    }

    /// Delimiter as a single byte, if it is ASCII
    pub fn delimiter_byte(&self) -> Result<u8, DataError> {
        if self.delimiter.is_ascii() {
            Ok(self.delimiter as u8)
        } else {
            Err(DataError::Csv(format!("delimiter {:?} is not ASCII", self.delimiter)))
        }
    }
}
