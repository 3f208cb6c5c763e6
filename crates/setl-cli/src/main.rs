//! setl CLI - Main entry point

use clap::Parser;
use setl_cli::{Cli, Commands, Config, ConfigCommand};
use setl_common::logging::{init_logging, LogConfig, LogLevel, LogOutput};
use setl_ingest::MalformedPolicy;
use std::process;
use tracing::error;

fn main() {
    // Parse command-line arguments
    let cli = Cli::parse();

    // Handle markdown help generation
    if cli.markdown_help {
        println!("{}", clap_markdown::help_markdown::<Cli>());
        return;
    }

    // Ensure a command is provided
    if cli.command.is_none() {
        eprintln!("Error: A subcommand is required");
        eprintln!();
        eprintln!("For more information, try '--help'.");
        process::exit(2);
    }

    let log_config = LogConfig::builder()
        .level(if cli.verbose {
            LogLevel::Debug
        } else {
            LogLevel::Warn
        })
        .output(LogOutput::Console)
        .log_file_prefix("setl")
        .build();

    // Environment variables take precedence over the flag
    let log_config = match log_config.clone().with_env_overrides() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Warning: ignoring SETL_LOG_* settings: {}", e);
            log_config
        },
    };

    // The CLI works without logging
    let _ = init_logging(&log_config);

    if let Err(e) = execute_command(&cli) {
        error!(error = %e, "Command failed");
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Execute the CLI command
fn execute_command(cli: &Cli) -> setl_cli::Result<()> {
    let Some(ref command) = cli.command else {
        return Ok(());
    };

    let mut config = Config::load(cli.config.as_deref())?;

    if let Commands::Run {
        out_basic,
        out_advanced,
        sort_key,
        skip_malformed,
        ..
    } = command
    {
        if let Some(path) = out_basic {
            config.out_basic = path.clone();
        }
        if let Some(path) = out_advanced {
            config.out_advanced = path.clone();
        }
        if let Some(key) = sort_key {
            config.sort_key = Some(key.clone());
        }
        if *skip_malformed {
            config.on_malformed = MalformedPolicy::Skip;
        }
    }

    // Flags are the last layer, so validation happens only now
    config.validate()?;

    match command {
        Commands::Run {
            in_files, report, ..
        } => setl_cli::commands::run::run(&config, in_files.clone(), report.as_deref()),

        Commands::Schema { in_files, json } => {
            setl_cli::commands::schema::run(&config, in_files.clone(), *json)
        },

        Commands::Config { command } => match command {
            ConfigCommand::Show => setl_cli::commands::config::show(&config),
        },
    }
}
