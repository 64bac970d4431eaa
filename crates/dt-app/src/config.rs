//! Pipeline configuration loaded from JSON and adjusted by CLI flags

use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::{Serialize, Deserialize};

use dt_data::FileConfig;
use dt_transform::{CalculateToRowOptions, DataTransformerConfig, TransformerId};

/// Inputs plus the transformation chain applied to them
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub inputs: Vec<FileConfig>,

    #[serde(default)]
    pub transformations: Vec<DataTransformerConfig>,
}

impl PipelineConfig {
    /// Load a pipeline from a JSON file
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read pipeline config {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("invalid pipeline config {}", path.display()))
    }

    pub fn add_input(&mut self, path: impl Into<PathBuf>) {
        self.inputs.push(FileConfig::new(path));
    }

    /// Merge `--reduce` flags into the last enabled calculate-to-row step,
    /// appending a new step when the chain has none.
    pub fn apply_reduce_overrides(&mut self, overrides: &[ReduceOverride]) -> Result<()> {
        if overrides.is_empty() {
            return Ok(());
        }

        let calc_id = TransformerId::CalculateToRow.as_str();
        let position = self
            .transformations
            .iter()
            .rposition(|t| t.id == calc_id && !t.disabled);

        let step = match position {
            Some(idx) => &mut self.transformations[idx],
            None => {
                self.transformations
                    .push(DataTransformerConfig::calculate_to_row(&CalculateToRowOptions::default())?);
                let last = self.transformations.len() - 1;
                &mut self.transformations[last]
            }
        };

        let mut options: CalculateToRowOptions = if step.options.is_null() {
            CalculateToRowOptions::default()
        } else {
            serde_json::from_value(step.options.clone())
                .with_context(|| format!("invalid options for '{}'", step.id))?
        };
        for item in overrides {
            options.reducers.insert(item.field.clone(), item.reducers.clone());
        }
        step.options = serde_json::to_value(&options)?;
        Ok(())
    }
}

/// A `field=id,id` reducer selection from the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReduceOverride {
    pub field: String,
    pub reducers: Vec<String>,
}

impl FromStr for ReduceOverride {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (field, ids) = s
            .split_once('=')
            .ok_or_else(|| format!("expected FIELD=ID[,ID...], got '{}'", s))?;

        let field = field.trim();
        if field.is_empty() {
            return Err(format!("missing field name in '{}'", s));
        }

        let reducers = ids
            .split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .collect();

        Ok(Self {
            field: field.to_string(),
            reducers,
        })
    }
}
