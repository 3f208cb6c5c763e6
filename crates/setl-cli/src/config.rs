//! Configuration management for the setl CLI
//!
//! Settings are layered: built-in defaults, then a TOML file, then `SETL_*`
//! environment variables, then command-line flags.

use crate::error::{CliError, Result};
use serde::{Deserialize, Serialize};
use setl_ingest::pipeline::{
    MalformedPolicy, PipelineOptions, DEFAULT_ADVANCED_OUTPUT, DEFAULT_BASIC_OUTPUT,
};
use setl_ingest::PrefixClassifier;
use std::path::{Path, PathBuf};

// ============================================================================
// CLI Configuration Constants
// ============================================================================

/// Config file picked up from the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "setl.toml";

/// Default output field delimiter.
pub const DEFAULT_DELIMITER: char = '\t';

/// Default prefix marking dimension columns.
pub const DEFAULT_DIMENSION_PREFIX: char = 'D';

/// Default prefix marking measure columns.
pub const DEFAULT_MEASURE_PREFIX: char = 'M';

/// Default marker inserted into summed column names.
pub const DEFAULT_SUM_MARKER: char = 'S';

/// CLI configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Row-level output file
    pub out_basic: PathBuf,

    /// Aggregate output file
    pub out_advanced: PathBuf,

    /// Column to order rows by
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_key: Option<String>,

    pub delimiter: char,
    pub dimension_prefix: char,
    pub measure_prefix: char,
    pub sum_marker: char,

    /// What to do with a source that fails to parse
    pub on_malformed: MalformedPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            out_basic: PathBuf::from(DEFAULT_BASIC_OUTPUT),
            out_advanced: PathBuf::from(DEFAULT_ADVANCED_OUTPUT),
            sort_key: None,
            delimiter: DEFAULT_DELIMITER,
            dimension_prefix: DEFAULT_DIMENSION_PREFIX,
            measure_prefix: DEFAULT_MEASURE_PREFIX,
            sum_marker: DEFAULT_SUM_MARKER,
            on_malformed: MalformedPolicy::Abort,
        }
    }
}

impl Config {
    /// Load the file and environment layers.
    ///
    /// An explicit path must exist; `./setl.toml` is only used when present.
    /// Call [`Config::validate`] once command-line flags have been applied.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        dotenvy::dotenv().ok();

        let config = match explicit {
            Some(path) => Self::from_file(path)?,
            None => {
                let local = Path::new(DEFAULT_CONFIG_FILE);
                if local.is_file() {
                    Self::from_file(local)?
                } else {
                    Self::default()
                }
            },
        };

        config.with_overrides(|name| std::env::var(name).ok())
    }

    /// Parse a TOML config file; missing keys keep their defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            CliError::config(format!("cannot read config file '{}': {}", path.display(), e))
        })?;

        toml::from_str(&text).map_err(|e| CliError::ConfigParse {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }

    /// Apply `SETL_*` overrides looked up through `lookup`
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("SETL_OUT_BASIC") {
            self.out_basic = PathBuf::from(path);
        }

        if let Some(path) = lookup("SETL_OUT_ADVANCED") {
            self.out_advanced = PathBuf::from(path);
        }

        if let Some(key) = lookup("SETL_SORT_KEY") {
            self.sort_key = Some(key).filter(|k| !k.is_empty());
        }

        if let Some(delimiter) = lookup("SETL_DELIMITER") {
            self.delimiter = parse_char("SETL_DELIMITER", &delimiter)?;
        }

        if let Some(policy) = lookup("SETL_ON_MALFORMED") {
            self.on_malformed = policy.parse().map_err(CliError::config)?;
        }

        Ok(self)
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if !self.delimiter.is_ascii() || matches!(self.delimiter, '"' | '\n' | '\r') {
            anyhow::bail!(
                "Delimiter must be a single ASCII character other than a quote or line break, got {:?}",
                self.delimiter
            );
        }

        if self.dimension_prefix == self.measure_prefix {
            anyhow::bail!(
                "Dimension and measure prefixes must differ, both are '{}'",
                self.dimension_prefix
            );
        }

        if self.out_basic == self.out_advanced {
            anyhow::bail!(
                "Row-level and aggregate outputs must differ, both are '{}'",
                self.out_basic.display()
            );
        }

        Ok(())
    }

    /// Pipeline settings derived from this configuration
    pub fn pipeline_options(&self) -> PipelineOptions {
        PipelineOptions {
            sort_key: self.sort_key.clone(),
            // validate() guarantees an ASCII delimiter
            delimiter: self.delimiter as u8,
            classifier: PrefixClassifier {
                dimension_prefix: self.dimension_prefix,
                measure_prefix: self.measure_prefix,
            },
            sum_marker: self.sum_marker,
            on_malformed: self.on_malformed,
        }
    }

    /// Render as TOML
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string(self)?)
    }
}

/// Parse a one-character setting; `\t` and `tab` name the tab character
fn parse_char(name: &str, value: &str) -> Result<char> {
    if value == "\\t" || value.eq_ignore_ascii_case("tab") {
        return Ok('\t');
    }

    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(CliError::config(format!(
            "{} must be a single character, got '{}'",
            name, value
        ))),
    }
}
