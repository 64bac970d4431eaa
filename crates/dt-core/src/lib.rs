//! Core data model for the frame transform pipeline
//!
//! This crate provides frames, fields, values and the display name
//! resolution shared by the transform and data crates.

pub mod field_state;
pub mod frame;
pub mod value;
pub mod vector;

// Re-export commonly used types
pub use field_state::{
    all_field_display_names, get_field_display_name, DisplayNameResolver, FieldNameResolver,
};
pub use frame::{
    DataFrame, Field, FieldConfig, FieldState, Labels, NullValueMode, StatValue, StatValueIndex,
};
pub use value::{FieldType, Value};
pub use vector::ValueVector;
pub use data::FrameSource;

pub mod data {
    use crate::frame::DataFrame;

    /// Trait for producers of frame batches
    #[async_trait::async_trait]
    pub trait FrameSource: Send + Sync {
        /// Load the frames this source provides
        async fn frames(&self) -> anyhow::Result<Vec<DataFrame>>;

        /// Get the source name/path
        fn source_name(&self) -> &str;
    }
}
