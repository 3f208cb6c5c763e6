//! Source adapters
//!
//! Each adapter turns one file into a [`RecordSet`]. The format is chosen by
//! file extension; anything other than `.csv`, `.json` or `.xml` is rejected
//! with [`SetlError::UnsupportedFormat`].

pub mod csv;
pub mod json;
pub mod xml;

use serde::{Deserialize, Serialize};
use setl_common::{Record, RecordSet, Result, SetlError};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::{debug, warn};

/// Supported source format kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    /// Delimited text with a header line
    Csv,
    /// Object with a `fields` array of flat objects
    Json,
    /// `objects` elements holding named `value` children
    Xml,
}

impl SourceFormat {
    /// Detect the format from a file extension (case-insensitive)
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match extension.as_deref() {
            Some("csv") => Ok(SourceFormat::Csv),
            Some("json") => Ok(SourceFormat::Json),
            Some("xml") => Ok(SourceFormat::Xml),
            _ => Err(SetlError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

impl std::fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceFormat::Csv => write!(f, "csv"),
            SourceFormat::Json => write!(f, "json"),
            SourceFormat::Xml => write!(f, "xml"),
        }
    }
}

/// Read one source file in the given format
pub fn read_source(path: &Path, format: SourceFormat) -> Result<RecordSet> {
    let source_name = path.display().to_string();
    debug!(source = %source_name, format = %format, "Reading source");

    let file = File::open(path).map_err(|e| SetlError::SourceUnreadable {
        source_name: source_name.clone(),
        reason: e.to_string(),
    })?;
    let reader = BufReader::new(file);

    let set = match format {
        SourceFormat::Csv => csv::read_csv(reader, &source_name)?,
        SourceFormat::Json => json::read_json(reader, &source_name)?,
        SourceFormat::Xml => xml::read_xml(reader, &source_name)?,
    };

    if set.is_empty() {
        warn!(source = %source_name, "Source contained no records");
    } else {
        debug!(source = %source_name, records = set.len(), "Source read");
    }

    Ok(set)
}

/// Check that every record shares the first record's key set
pub(crate) fn ensure_uniform_keys(source_name: &str, records: &[Record]) -> Result<()> {
    let Some(first) = records.first() else {
        return Ok(());
    };

    for (position, record) in records.iter().enumerate().skip(1) {
        if !record.same_keys(first) {
            return Err(SetlError::malformed(
                source_name,
                format!(
                    "record {} has columns [{}] but the first record has [{}]",
                    position + 1,
                    record.keys().collect::<Vec<_>>().join(", "),
                    first.keys().collect::<Vec<_>>().join(", "),
                ),
            ));
        }
    }

    Ok(())
}
