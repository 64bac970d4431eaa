//! `calc-to-row`: load CSV frames, append reduced rows and print the result

use std::process::ExitCode;

use anyhow::{bail, Result};
use clap::Parser;
use tracing::{error, info};

use dt_core::all_field_display_names;
use dt_reduce::field_reducers;

mod cli;
mod config;
mod pipeline;

use crate::cli::Cli;
use crate::config::PipelineConfig;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(cli.log_level())
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    if cli.list_reducers {
        for reducer in field_reducers().all() {
            println!("{:<14} {:<18} {}", reducer.id.as_str(), reducer.name, reducer.description);
        }
        return Ok(());
    }

    let mut config = match &cli.config {
        Some(path) => PipelineConfig::from_json_file(path)?,
        None => PipelineConfig::default(),
    };
    for input in &cli.inputs {
        config.add_input(input);
    }
    config.apply_reduce_overrides(&cli.reduce)?;

    if config.inputs.is_empty() {
        bail!("no inputs given; pass --input or --config");
    }

    let frames = pipeline::load_frames(&config.inputs).await?;

    if cli.list_fields {
        for name in all_field_display_names(&frames) {
            println!("{}", name);
        }
        return Ok(());
    }

    info!(
        "Running {} transformation(s) x{}",
        config.transformations.len(),
        cli.repeat
    );
    let frames = pipeline::run_transformations(frames, &config.transformations, cli.repeat)?;
    println!("{}", pipeline::render(&frames, cli.format)?);
    Ok(())
}
