//! Command line arguments

use std::path::PathBuf;

use clap::{ArgAction, Parser};
use tracing::Level;

use crate::config::ReduceOverride;
use crate::pipeline::OutputFormat;

#[derive(Parser, Debug)]
#[command(
    name = "calc-to-row",
    version,
    about = "Append rows of reduced values (max, mean, last, ...) to CSV frames"
)]
pub struct Cli {
    /// Pipeline configuration (JSON) with inputs and transformations
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// CSV file to load; may be repeated
    #[arg(short, long = "input", value_name = "FILE")]
    pub inputs: Vec<PathBuf>,

    /// Reducers for a field, e.g. `cpu=max,mean`; may be repeated
    #[arg(short, long, value_name = "FIELD=ID,ID")]
    pub reduce: Vec<ReduceOverride>,

    /// Apply the transformation chain this many times
    #[arg(long, default_value_t = 1)]
    pub repeat: usize,

    /// Print the field names of the loaded frames and exit
    #[arg(long)]
    pub list_fields: bool,

    /// Print the available reducers and exit
    #[arg(long)]
    pub list_reducers: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t)]
    pub format: OutputFormat,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    pub fn log_level(&self) -> Level {
        match self.verbose {
            0 => Level::WARN,
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_command_line() {
        let cli = Cli::try_parse_from([
            "calc-to-row", "-i", "a.csv", "--input", "b.csv", "-r", "cpu=max,last",
            "--reduce", "mem=min", "--repeat", "2", "--format", "json", "-vv",
        ])
        .unwrap();

        assert_eq!(cli.inputs, vec![PathBuf::from("a.csv"), PathBuf::from("b.csv")]);
        assert_eq!(cli.reduce.len(), 2);
        assert_eq!(cli.reduce[0].reducers, vec!["max", "last"]);
        assert_eq!(cli.repeat, 2);
        assert_eq!(cli.format, OutputFormat::Json);
        assert_eq!(cli.log_level(), Level::DEBUG);
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["calc-to-row"]).unwrap();
        assert_eq!(cli.repeat, 1);
        assert_eq!(cli.format, OutputFormat::Table);
        assert_eq!(cli.log_level(), Level::WARN);
        assert!(!cli.list_fields);
    }

    #[test]
    fn test_bad_reduce_is_rejected() {
        assert!(Cli::try_parse_from(["calc-to-row", "--reduce", "cpu"]).is_err());
    }
}
