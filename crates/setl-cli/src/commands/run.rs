//! `setl run` command implementation
//!
//! Runs the full pipeline and prints a summary.

use crate::config::Config;
use crate::error::Result;
use colored::Colorize;
use setl_ingest::pipeline::{Pipeline, PipelineRequest, RunReport};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Run the pipeline over `sources` and optionally write the JSON report
pub fn run(config: &Config, sources: Vec<PathBuf>, report: Option<&Path>) -> Result<()> {
    let request = PipelineRequest {
        sources,
        basic_output: config.out_basic.clone(),
        advanced_output: config.out_advanced.clone(),
    };
    debug!(?request, "Starting run");

    let outcome = Pipeline::new(config.pipeline_options()).run(&request)?;

    if let Some(path) = report {
        std::fs::write(path, serde_json::to_string_pretty(&outcome)?)?;
    }

    print_summary(&outcome, report);

    Ok(())
}

fn print_summary(report: &RunReport, report_path: Option<&Path>) {
    println!("{}", "Run complete".green().bold());
    println!();

    for source in &report.sources {
        match &source.skipped {
            Some(reason) => println!("  {} {} ({})", "skipped".yellow(), source.path, reason),
            None => println!(
                "  {} {} ({} records, {})",
                "read".green(),
                source.path,
                source.records,
                source.format
            ),
        }
    }

    println!();
    println!("{:<20} {}", "Columns:", report.columns.join(", "));
    println!("{:<20} {}", "Sort key:", report.sort_key);
    println!("{:<20} {} -> {}", "Rows:", report.rows, report.basic_output);
    println!("{:<20} {} -> {}", "Groups:", report.groups, report.advanced_output);

    if !report.coercion_failures.is_empty() {
        println!(
            "{:<20} {}",
            "Coercion failures:",
            report.coercion_failures.len().to_string().yellow()
        );
        for failure in &report.coercion_failures {
            println!("  {}", failure.to_error().to_string().yellow());
        }
    }

    if let Some(path) = report_path {
        println!("{:<20} {}", "Report:", path.display());
    }
}
