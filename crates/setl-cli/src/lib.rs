//! setl CLI Library
//!
//! Command-line interface for the setl reconcile-and-aggregate pipeline.
//!
//! # Overview
//!
//! - **Pipeline runs**: reconcile sources and write both tables (`setl run`)
//! - **Schema inspection**: show shared columns and their roles (`setl schema`)
//! - **Configuration**: print the effective settings (`setl config show`)

pub mod commands;
pub mod config;
pub mod error;

// Re-export commonly used types
pub use config::Config;
pub use error::{CliError, Result};

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// setl - reconcile CSV, JSON and XML sources into TSV tables
#[derive(Parser, Debug)]
#[command(name = "setl")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file (TOML)
    #[arg(short, long, env = "SETL_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Print the CLI reference as markdown
    #[arg(long, hide = true)]
    pub markdown_help: bool,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Reconcile the sources and write the row-level and aggregate tables
    Run {
        /// Source files (.csv, .json or .xml)
        #[arg(short, long = "in-files", num_args = 1.., required = true)]
        in_files: Vec<PathBuf>,

        /// Row-level output file
        #[arg(long)]
        out_basic: Option<PathBuf>,

        /// Aggregate output file
        #[arg(long)]
        out_advanced: Option<PathBuf>,

        /// Column to order rows by (defaults to the smallest column name)
        #[arg(long)]
        sort_key: Option<String>,

        /// Leave out sources that fail to parse instead of aborting
        #[arg(long)]
        skip_malformed: bool,

        /// Write the run report as JSON to this file
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Show the columns shared by every source and their roles
    Schema {
        /// Source files (.csv, .json or .xml)
        #[arg(short, long = "in-files", num_args = 1.., required = true)]
        in_files: Vec<PathBuf>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// Configuration subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show the effective configuration as TOML
    Show,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_run_accepts_several_sources() {
        let cli = Cli::try_parse_from([
            "setl", "run", "-i", "a.csv", "b.json", "c.xml", "--sort-key", "D2",
        ])
        .unwrap();

        match cli.command {
            Some(Commands::Run {
                in_files, sort_key, ..
            }) => {
                assert_eq!(in_files.len(), 3);
                assert_eq!(sort_key.as_deref(), Some("D2"));
            },
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_run_requires_sources() {
        assert!(Cli::try_parse_from(["setl", "run"]).is_err());
    }
}
