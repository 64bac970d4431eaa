//! Frame transformations
//!
//! The calculate-to-row transformation appends a row of reduced values
//! (max, min, mean, last, ...) to each frame of a batch.

pub mod calculate_to_row;
pub mod operator;
pub mod transformer;

use thiserror::Error;

// Re-exports
pub use calculate_to_row::{
    calculate_to_row, CalculateToRowOptions, CalculateToRowTransformer, ReducerConfig, RowSynthesizer,
};
pub use operator::{OptionsHandle, TransformStage};
pub use transformer::{
    standard_transformers, transform_data_frames, DataTransformer, DataTransformerConfig,
    TransformerId, TransformerInfo, TransformerRegistry,
};

/// Errors that can occur when configuring transformations
#[derive(Error, Debug)]
pub enum TransformError {
    #[error("Unknown transformer: {0}")]
    UnknownTransformer(String),

    #[error("Invalid options for {id}: {source}")]
    InvalidOptions {
        id: TransformerId,
        source: serde_json::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
