//! `setl schema` command implementation
//!
//! Shows the columns every source shares and the role each one plays.

use crate::config::Config;
use crate::error::Result;
use colored::Colorize;
use setl_ingest::pipeline::{Pipeline, SchemaReport};
use std::path::PathBuf;

/// Inspect the reconciled schema of `sources`
pub fn run(config: &Config, sources: Vec<PathBuf>, json: bool) -> Result<()> {
    let report = Pipeline::new(config.pipeline_options()).inspect(&sources)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&to_json(&report))?);
        return Ok(());
    }

    if report.columns.is_empty() {
        println!("{}", "The sources share no columns.".yellow());
        return Ok(());
    }

    print!("{}", format_as_table(&report));
    println!("{} records across {} sources", report.records, report.sources.len());

    Ok(())
}

/// Format the column roles as a table
fn format_as_table(report: &SchemaReport) -> String {
    use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Table};

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec!["Column", "Role"]);

    for (column, role) in &report.columns {
        table.add_row(vec![column.clone(), role.to_string()]);
    }

    format!("{}\n", table)
}

fn to_json(report: &SchemaReport) -> serde_json::Value {
    let columns: Vec<serde_json::Value> = report
        .columns
        .iter()
        .map(|(column, role)| serde_json::json!({ "column": column, "role": role.to_string() }))
        .collect();

    serde_json::json!({
        "sources": report.sources,
        "records": report.records,
        "columns": columns,
    })
}
