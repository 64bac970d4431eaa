//! Transformer registry and transformation chains

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;
use once_cell::sync::Lazy;
use serde::{Serialize, Deserialize};
use tracing::debug;

use dt_core::DataFrame;

use crate::calculate_to_row::{CalculateToRowOptions, CalculateToRowTransformer, CALCULATE_TO_ROW_INFO};
use crate::TransformError;

/// Identifiers of the available transformations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TransformerId {
    CalculateToRow,
}

impl TransformerId {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransformerId::CalculateToRow => "calculateToRow",
        }
    }
}

impl fmt::Display for TransformerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransformerId {
    type Err = TransformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "calculateToRow" => Ok(TransformerId::CalculateToRow),
            other => Err(TransformError::UnknownTransformer(other.to_string())),
        }
    }
}

/// Static description of a transformation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransformerInfo {
    pub id: TransformerId,
    pub name: &'static str,
    pub description: &'static str,
}

/// A configured transformation over frame batches
pub trait DataTransformer: Send + Sync {
    fn info(&self) -> &TransformerInfo;

    /// Transform `frames`; returns them borrowed when nothing changes
    fn transform<'a>(&self, frames: &'a [DataFrame]) -> Cow<'a, [DataFrame]>;
}

/// One step of a transformation chain, as stored in configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataTransformerConfig {
    pub id: String,

    #[serde(default)]
    pub options: serde_json::Value,

    #[serde(default)]
    pub disabled: bool,
}

impl DataTransformerConfig {
    pub fn calculate_to_row(options: &CalculateToRowOptions) -> Result<Self, TransformError> {
        Ok(Self {
            id: TransformerId::CalculateToRow.to_string(),
            options: serde_json::to_value(options)?,
            disabled: false,
        })
    }
}

type CreateFn = fn(serde_json::Value) -> Result<Box<dyn DataTransformer>, TransformError>;

/// Registry entry pairing a transformation with its factory
pub struct TransformerRegistryItem {
    pub info: TransformerInfo,
    create: CreateFn,
}

impl fmt::Debug for TransformerRegistryItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransformerRegistryItem")
            .field("info", &self.info)
            .finish()
    }
}

/// Known transformations
#[derive(Debug)]
pub struct TransformerRegistry {
    items: Vec<TransformerRegistryItem>,
}

static STANDARD: Lazy<TransformerRegistry> = Lazy::new(TransformerRegistry::standard);

/// The process-wide standard transformer registry
pub fn standard_transformers() -> &'static TransformerRegistry {
    &STANDARD
}

fn create_calculate_to_row(options: serde_json::Value) -> Result<Box<dyn DataTransformer>, TransformError> {
    let options: CalculateToRowOptions = if options.is_null() {
        CalculateToRowOptions::default()
    } else {
        serde_json::from_value(options).map_err(|e| TransformError::InvalidOptions {
            id: TransformerId::CalculateToRow,
            source: e,
        })?
    };
    Ok(Box::new(CalculateToRowTransformer::new(options)))
}

impl TransformerRegistry {
    pub fn standard() -> Self {
        Self {
            items: vec![TransformerRegistryItem {
                info: CALCULATE_TO_ROW_INFO,
                create: create_calculate_to_row,
            }],
        }
    }

    pub fn list(&self) -> impl Iterator<Item = &TransformerInfo> {
        self.items.iter().map(|item| &item.info)
    }

    pub fn get(&self, id: TransformerId) -> Option<&TransformerRegistryItem> {
        self.items.iter().find(|item| item.info.id == id)
    }

    /// Build the transformer described by `config`
    pub fn create(&self, config: &DataTransformerConfig) -> Result<Box<dyn DataTransformer>, TransformError> {
        let id: TransformerId = config.id.parse()?;
        let item = self.get(id).ok_or(TransformError::UnknownTransformer(config.id.clone()))?;
        (item.create)(config.options.clone())
    }
}

/// Apply every enabled transformation in order.
///
/// The input is returned borrowed when no step changes it.
pub fn transform_data_frames<'a>(
    frames: &'a [DataFrame],
    configs: &[DataTransformerConfig],
) -> Result<Cow<'a, [DataFrame]>, TransformError> {
    let registry = standard_transformers();
    let mut current: Cow<'a, [DataFrame]> = Cow::Borrowed(frames);

    for config in configs {
        if config.disabled {
            debug!("Skipping disabled transformation '{}'", config.id);
            continue;
        }
        let transformer = registry.create(config)?;
        current = match current {
            Cow::Borrowed(input) => transformer.transform(input),
            Cow::Owned(input) => {
                let changed = match transformer.transform(&input) {
                    Cow::Borrowed(_) => None,
                    Cow::Owned(output) => Some(output),
                };
                Cow::Owned(changed.unwrap_or(input))
            }
        };
        debug!("Applied '{}': {} frame(s)", transformer.info().name, current.len());
    }
    Ok(current)
}
