//! Build automation tasks for setl
//!
//! Currently generates the CLI reference from the clap definitions.

use clap::Parser;
use std::fs;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Build automation tasks for setl", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Generate the CLI reference in markdown
    GenerateCliDocs {
        /// Output directory for generated documentation
        #[arg(short, long, default_value = "docs")]
        output_dir: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::GenerateCliDocs { output_dir } => generate_cli_docs(&output_dir)?,
    }

    Ok(())
}

fn generate_cli_docs(output_dir: &str) -> anyhow::Result<()> {
    println!("Generating CLI documentation...");

    // Generate markdown from clap definitions
    let markdown = clap_markdown::help_markdown::<setl_cli::Cli>();

    let content = format!(
        r#"# setl CLI Reference

This documentation is generated from the CLI source code. Last updated: {}.

## Overview

setl reads CSV, JSON and XML files, keeps the columns they all share, and
writes two tab-separated tables: the sorted rows, and the rows summed per
unique combination of dimension (`D*`) columns with measure (`M*`) columns
renamed `MS*`.

## Quick Start

```bash
setl run -i data/in.csv data/in.json data/in.xml
setl schema -i data/in.csv data/in.json --json
setl config show
```

## Commands

{}

## Environment Variables

- `SETL_CONFIG` - Config file (default: `./setl.toml` when present)
- `SETL_OUT_BASIC`, `SETL_OUT_ADVANCED` - Output files
- `SETL_SORT_KEY` - Column to order rows by
- `SETL_DELIMITER` - Output delimiter (default: tab)
- `SETL_ON_MALFORMED` - `abort` or `skip`
- `SETL_LOG_LEVEL`, `SETL_LOG_OUTPUT`, `SETL_LOG_FORMAT`, `SETL_LOG_DIR`, `SETL_LOG_FILTER` - Logging

---

*To update, run `cargo xtask generate-cli-docs`.*
"#,
        chrono::Utc::now().format("%Y-%m-%d"),
        markdown
    );

    // Create output directory if it doesn't exist
    let output_path = PathBuf::from(output_dir);
    fs::create_dir_all(&output_path)?;

    let file_path = output_path.join("cli-reference.md");
    fs::write(&file_path, content)?;

    println!("✅ Generated CLI documentation at: {}", file_path.display());

    Ok(())
}
