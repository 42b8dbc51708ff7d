//! # cellgrid-cli
//!
//! Command-line access to the cellgrid import/export engines, range
//! formulas and statistics. Every command prints JSON.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// cellgrid - spreadsheet import, export and analysis
#[derive(Parser)]
#[command(name = "cellgrid")]
#[command(author, version, about = "Spreadsheet import, export and analysis", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Input file plus the sheet to read when it is a workbook
#[derive(clap::Args)]
struct Input {
    /// csv, tsv or xlsx file
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Worksheet to read from an xlsx file (default: first)
    #[arg(short, long)]
    sheet: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Convert between csv, tsv and xlsx (format follows the extension)
    Convert {
        #[command(flatten)]
        input: Input,
        /// Output file
        #[arg(value_name = "OUT")]
        output: PathBuf,
    },
    /// List the sheets of an xlsx workbook
    Sheets {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Summary statistics per column
    Stats {
        #[command(flatten)]
        input: Input,
        /// Zero-based column indices
        #[arg(short, long, value_delimiter = ',', required = true)]
        columns: Vec<usize>,
    },
    /// Pearson correlation between two or more columns
    Correlate {
        #[command(flatten)]
        input: Input,
        #[arg(short, long, value_delimiter = ',', required = true)]
        columns: Vec<usize>,
    },
    /// Linear regression of one column on another
    Regress {
        #[command(flatten)]
        input: Input,
        /// Independent column
        #[arg(short)]
        x: usize,
        /// Dependent column
        #[arg(short)]
        y: usize,
    },
    /// Sum, product or difference (max - min) per column
    Custom {
        #[command(flatten)]
        input: Input,
        #[arg(short, long, value_delimiter = ',', required = true)]
        columns: Vec<usize>,
        #[arg(short, long, default_value = "sum")]
        op: String,
    },
    /// Evaluate a range formula such as =SUM(A1:B10)
    Eval {
        #[command(flatten)]
        input: Input,
        #[arg(value_name = "FORMULA", allow_hyphen_values = true)]
        formula: String,
    },
    /// Chart labels and series
    Chart {
        #[command(flatten)]
        input: Input,
        /// Label column
        #[arg(short)]
        x: usize,
        /// Series columns
        #[arg(short, value_delimiter = ',', required = true)]
        y: Vec<usize>,
    },
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run(command: Command) -> Result<()> {
    let load = |input: &Input| commands::load_table(&input.file, input.sheet.as_deref());

    match command {
        Command::Convert { input, output } => {
            print_json(&commands::convert(&input.file, &output, input.sheet.as_deref())?)
        }
        Command::Sheets { file } => print_json(&commands::sheets(&file)?),
        Command::Stats { input, columns } => print_json(&commands::stats(&load(&input)?, columns)?),
        Command::Correlate { input, columns } => {
            print_json(&commands::correlate(&load(&input)?, columns)?)
        }
        Command::Regress { input, x, y } => print_json(&commands::regress(&load(&input)?, x, y)?),
        Command::Custom { input, columns, op } => {
            print_json(&commands::custom(&load(&input)?, columns, &op)?)
        }
        Command::Eval { input, formula } => print_json(&commands::eval(&load(&input)?, &formula)),
        Command::Chart { input, x, y } => print_json(&commands::chart(&load(&input)?, x, &y)?),
    }
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    if cli.verbose {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .init();
    }

    if let Err(e) = run(cli.command) {
        eprintln!("{} {e:#}", "Error:".red().bold());
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_columns_list() {
        let cli = Cli::parse_from(["cellgrid", "stats", "data.csv", "--columns", "0,2,3"]);
        let Command::Stats { input, columns } = cli.command else {
            panic!("expected stats");
        };
        assert_eq!(input.file, PathBuf::from("data.csv"));
        assert_eq!(columns, vec![0, 2, 3]);
    }

    #[test]
    fn test_parse_regress_with_sheet() {
        let cli = Cli::parse_from(["cellgrid", "-v", "regress", "book.xlsx", "--sheet", "Q1", "-x", "0", "-y", "1"]);
        assert!(cli.verbose);
        let Command::Regress { input, x, y } = cli.command else {
            panic!("expected regress");
        };
        assert_eq!(input.sheet.as_deref(), Some("Q1"));
        assert_eq!((x, y), (0, 1));
    }

    #[test]
    fn test_custom_defaults_to_sum() {
        let cli = Cli::parse_from(["cellgrid", "custom", "d.csv", "-c", "1"]);
        let Command::Custom { op, .. } = cli.command else {
            panic!("expected custom");
        };
        assert_eq!(op, "sum");
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
