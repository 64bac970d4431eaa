//! Load inputs, run the transformation chain and render the result

use std::borrow::Cow;

use anyhow::{Context, Result};
use clap::ValueEnum;
use tracing::{debug, info};

use dt_core::{DataFrame, FrameSource};
use dt_data::{pretty_format_frames, CsvSource, FileConfig};
use dt_transform::{transform_data_frames, DataTransformerConfig};

/// How results are written to stdout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

/// Load every input as frames, in order
pub async fn load_frames(inputs: &[FileConfig]) -> Result<Vec<DataFrame>> {
    let mut frames = Vec::new();
    for input in inputs {
        let source = CsvSource::new(input.clone());
        let loaded = source
            .frames()
            .await
            .with_context(|| format!("failed to load {}", source.source_name()))?;
        frames.extend(loaded);
    }
    info!("Loaded {} frame(s) from {} input(s)", frames.len(), inputs.len());
    Ok(frames)
}

/// Apply the transformation chain `repeat` times
pub fn run_transformations(
    mut frames: Vec<DataFrame>,
    configs: &[DataTransformerConfig],
    repeat: usize,
) -> Result<Vec<DataFrame>> {
    for pass in 1..=repeat {
        let changed = match transform_data_frames(&frames, configs).context("transformation failed")? {
            Cow::Borrowed(_) => None,
            Cow::Owned(output) => Some(output),
        };
        match changed {
            Some(output) => frames = output,
            None => {
                debug!("Pass {} left the frames unchanged", pass);
                break;
            }
        }
    }
    Ok(frames)
}

/// Render frames in the requested format
pub fn render(frames: &[DataFrame], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Table => Ok(pretty_format_frames(frames)?),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(frames)?),
    }
}
