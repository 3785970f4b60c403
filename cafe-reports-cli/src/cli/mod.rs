//! Command-line interface definitions

pub mod commands;

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "cafe-reports", version, about = "Import daily coffee-shop report workbooks")]
pub struct Cli {
    /// Config file (default: <config dir>/cafe-reports/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Database file, overriding the config
    #[arg(long, global = true, value_name = "PATH")]
    pub database: Option<PathBuf>,

    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Parse a workbook and print the rows without storing them
    Parse(ParseArgs),
    /// Parse a workbook and store its rows
    Import(ImportArgs),
    /// Manage import batches
    #[command(subcommand)]
    Batches(BatchCommands),
    /// Show locations
    #[command(subcommand)]
    Locations(LocationCommands),
}

#[derive(Args, Debug)]
pub struct ParseArgs {
    /// Workbook to parse (.xlsx or .xls)
    pub file: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Only show this sheet
    #[arg(short, long)]
    pub sheet: Option<String>,
}

#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Workbook to import (.xlsx or .xls)
    pub file: PathBuf,

    /// Print the import summary as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum BatchCommands {
    /// List import batches, newest first
    List,
    /// Delete a batch and the reports it imported
    Delete {
        /// Batch id
        id: String,
    },
    /// Delete reports that belong to no batch
    PurgeOrphaned,
}

#[derive(Subcommand, Debug)]
pub enum LocationCommands {
    /// List locations with report counts
    List,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_args() {
        let cli = Cli::try_parse_from([
            "cafe-reports",
            "-vv",
            "parse",
            "report.xlsx",
            "--format",
            "csv",
            "--sheet",
            "Center",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Parse(args) => {
                assert_eq!(args.format, OutputFormat::Csv);
                assert_eq!(args.sheet.as_deref(), Some("Center"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_batch_subcommands() {
        let cli = Cli::try_parse_from(["cafe-reports", "batches", "delete", "abc"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Batches(BatchCommands::Delete { ref id }) if id == "abc"
        ));

        let cli = Cli::try_parse_from(["cafe-reports", "batches", "purge-orphaned"]).unwrap();
        assert!(matches!(cli.command, Commands::Batches(BatchCommands::PurgeOrphaned)));
    }
}
