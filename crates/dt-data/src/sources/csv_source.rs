use std::path::PathBuf;
use async_trait::async_trait;
use csv::ReaderBuilder;
use tracing::{debug, info};

use dt_core::{DataFrame, Field, FrameSource, Value, ValueVector};

use crate::config::FileConfig;
use crate::schema::SchemaDetector;
use crate::DataError;

/// CSV data source producing one frame per file
pub struct CsvSource {
    config: FileConfig,
    /// Display form of the path for logs and errors
    source_name: String,
}

impl CsvSource {
    /// Create a CSV source from a file configuration
    pub fn new(config: FileConfig) -> Self {
        let source_name = config.path.display().to_string();
        Self { config, source_name }
    }

    /// Create a CSV source with default settings for a path
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self::new(FileConfig::new(path))
    }

    /// Read and type the whole file into a frame
    pub async fn load(&self) -> Result<DataFrame, DataError> {
        let config = self.config.clone();
        let frame = tokio::task::spawn_blocking(move || Self::read_frame(&config)).await??;

        info!(
            source = %self.source_name,
            fields = frame.fields.len(),
            rows = frame.length,
            "Loaded CSV frame"
        );
        Ok(frame)
    }

    /// Synchronous load used by `load`
    fn read_frame(config: &FileConfig) -> Result<DataFrame, DataError> {
        let mut reader = ReaderBuilder::new()
            .delimiter(config.delimiter_byte()?)
            .has_headers(config.has_headers)
            .flexible(true)
            .from_path(&config.path)?;

        let mut rows: Vec<Vec<String>> = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(record.iter().map(|s| s.to_string()).collect());
        }

        let headers: Vec<String> = if config.has_headers {
            reader.headers()?.iter().map(|h| h.to_string()).collect()
        } else {
            let width = rows.iter().map(Vec::len).max().unwrap_or(0);
            (1..=width).map(|i| format!("Field {}", i)).collect()
        };

        let detector = SchemaDetector::new()
            .with_sample_size(config.sample_size)
            .with_null_config(config.null_config.clone());
        let detected = detector.detect_from_samples(headers.len(), &rows);

        let fields = headers
            .iter()
            .zip(detected)
            .enumerate()
            .map(|(col_idx, (header, detected))| {
                let field_type = config.column_type(header, detected);
                debug!(column = %header, %field_type, "Detected column type");

                let values: ValueVector = rows
                    .iter()
                    .map(|row| match row.get(col_idx) {
                        Some(cell) => detector.parse_cell(cell, field_type),
                        None => Value::Null,
                    })
                    .collect();
                Field::new(header.clone(), field_type, values)
            })
            .collect::<Vec<_>>();

        let mut frame = DataFrame::new(fields).with_name(config.frame_name());
        frame.length = rows.len();
        if let Some(ref_id) = &config.ref_id {
            frame = frame.with_ref_id(ref_id.clone());
        }
        Ok(frame)
    }
}

#[async_trait]
impl FrameSource for CsvSource {
    async fn frames(&self) -> anyhow::Result<Vec<DataFrame>> {
        Ok(vec![self.load().await?])
    }

    fn source_name(&self) -> &str {
        &self.source_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use dt_core::FieldType;
    use tempfile::NamedTempFile;

    fn write_csv(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[tokio::test]
    async fn test_load_typed_frame() {
        let file = write_csv("time,host,value\n2024-01-01T00:00:00Z,a,1.5\n2024-01-01T00:00:01Z,b,\n");
        let source = CsvSource::new(FileConfig {
            name: Some("metrics".to_string()),
            ref_id: Some("A".to_string()),
            ..FileConfig::new(file.path())
        });

        let frame = source.load().await.unwrap();
        assert_eq!(frame.name.as_deref(), Some("metrics"));
        assert_eq!(frame.ref_id.as_deref(), Some("A"));
        assert_eq!(frame.length, 2);
        assert!(frame.is_consistent());

        let types: Vec<_> = frame.fields.iter().map(|f| f.field_type).collect();
        assert_eq!(types, vec![FieldType::Time, FieldType::String, FieldType::Number]);

        let value = frame.field("value").unwrap();
        assert_eq!(value.values.as_slice(), &[Value::Number(1.5), Value::Null]);
        assert_eq!(frame.fields[0].values[0], Value::Number(1_704_067_200_000.0));
    }

    #[tokio::test]
    async fn test_headerless_and_short_rows() {
        let file = write_csv("1;2\n3\n");
        let source = CsvSource::new(FileConfig {
            delimiter: ';',
            has_headers: false,
            ..FileConfig::new(file.path())
        });

        let frame = source.load().await.unwrap();
        let names: Vec<_> = frame.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["Field 1", "Field 2"]);
        assert_eq!(frame.fields[1].values.as_slice(), &[Value::Number(2.0), Value::Null]);
    }

    #[tokio::test]
    async fn test_header_only_file() {
        let file = write_csv("a,b\n");
        let frame = CsvSource::from_path(file.path()).load().await.unwrap();
        assert_eq!(frame.length, 0);
        assert_eq!(frame.fields.len(), 2);
        assert!(frame.fields.iter().all(|f| f.field_type == FieldType::Other));
    }

    #[tokio::test]
    async fn test_column_type_override_applies() {
        let file = write_csv("id,value\n001,1\n002,2\n");
        let mut config = FileConfig::new(file.path());
        config.column_types.insert("id".to_string(), FieldType::String);

        let frame = CsvSource::new(config).load().await.unwrap();
        assert_eq!(frame.fields[0].values[0], Value::from("001"));
    }

    #[tokio::test]
    async fn test_frame_source_trait() {
        let file = write_csv("value\n1\n2\n");
        let source: Box<dyn FrameSource> = Box::new(CsvSource::from_path(file.path()));
        let frames = source.frames().await.unwrap();
        assert_eq!(frames.len(), 1);
        assert_eq!(source.source_name(), file.path().display().to_string());
    }

    #[tokio::test]
    async fn test_missing_file_errors() {
        let source = CsvSource::from_path("/definitely/not/here.csv");
        assert!(matches!(source.load().await, Err(DataError::Io(_))));
    }
}
