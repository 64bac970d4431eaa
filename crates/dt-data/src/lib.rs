//! Data loading and output for the frame transform pipeline

pub mod batch;
pub mod config;
pub mod schema;
pub mod sources;

use arrow::error::ArrowError;
use tokio::task::JoinError;
use thiserror::Error;

// Re-exports
pub use batch::{frame_to_record_batch, pretty_format_frames, record_batch_to_frame};
pub use config::{FileConfig, NullConfig};
pub use schema::SchemaDetector;
pub use sources::CsvSource;

/// Errors that can occur in data operations
#[derive(Error, Debug)]
pub enum DataError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Arrow error: {0}")]
    Arrow(ArrowError),

    #[error("CSV parsing error: {0}")]
    Csv(String),

    #[error("Schema detection error: {0}")]
    SchemaDetection(String),

    #[error("Join error: {0}")]
    Join(#[from] JoinError),
}

impl From<csv::Error> for DataError {
    fn from(error: csv::Error) -> Self {
        match error.kind() {
            csv::ErrorKind::Io(io_err) => DataError::Io(std::io::Error::new(io_err.kind(), error.to_string())),
            _ => DataError::Csv(error.to_string()),
        }
    }
}

impl From<ArrowError> for DataError {
    fn from(error: ArrowError) -> Self {
        DataError::Arrow(error)
    }
}
