//! Pipeline orchestration
//!
//! read -> reconcile -> sort -> classify -> coerce -> write rows -> aggregate
//! -> write aggregates. Every stage works on the full in-memory set.

use crate::aggregate::{aggregate, DEFAULT_SUM_MARKER};
use crate::classify::{classify_columns, Classification, ColumnRole, PrefixClassifier};
use crate::coerce::{coerce_measures, Coerced, CoercionFailure};
use crate::formats::{read_source, SourceFormat};
use crate::reconcile::reconcile;
use crate::sink::{write_file, DEFAULT_DELIMITER};
use crate::sort::{sort_records, SortOutcome};
use serde::{Deserialize, Serialize};
use setl_common::{RecordSet, Result, SetlError};
use std::path::{Path, PathBuf};
use tracing::{error, info, info_span};

/// Default destination for the row-level table
pub const DEFAULT_BASIC_OUTPUT: &str = "result_basic.tsv";

/// Default destination for the aggregate table
pub const DEFAULT_ADVANCED_OUTPUT: &str = "result_advanced.tsv";

/// What to do with a source that cannot be parsed in its claimed format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MalformedPolicy {
    /// Terminate the run
    #[default]
    Abort,
    /// Log the source and leave it out of the run
    Skip,
}

impl std::str::FromStr for MalformedPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "abort" => Ok(MalformedPolicy::Abort),
            "skip" => Ok(MalformedPolicy::Skip),
            _ => Err(format!("Invalid malformed-source policy: {} (expected abort or skip)", s)),
        }
    }
}

impl std::fmt::Display for MalformedPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MalformedPolicy::Abort => write!(f, "abort"),
            MalformedPolicy::Skip => write!(f, "skip"),
        }
    }
}

/// Tunables shared by every run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOptions {
    /// Column to order rows by; falls back to the smallest column name
    pub sort_key: Option<String>,
    pub delimiter: u8,
    pub classifier: PrefixClassifier,
    pub sum_marker: char,
    pub on_malformed: MalformedPolicy,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            sort_key: None,
            delimiter: DEFAULT_DELIMITER,
            classifier: PrefixClassifier::default(),
            sum_marker: DEFAULT_SUM_MARKER,
            on_malformed: MalformedPolicy::Abort,
        }
    }
}

/// Inputs and destinations of one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineRequest {
    pub sources: Vec<PathBuf>,
    pub basic_output: PathBuf,
    pub advanced_output: PathBuf,
}

impl PipelineRequest {
    /// Request writing to the default destinations
    pub fn new(sources: Vec<PathBuf>) -> Self {
        Self {
            sources,
            basic_output: PathBuf::from(DEFAULT_BASIC_OUTPUT),
            advanced_output: PathBuf::from(DEFAULT_ADVANCED_OUTPUT),
        }
    }
}

/// Per-source outcome of the read stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceSummary {
    pub path: String,
    pub format: SourceFormat,
    pub records: usize,
    /// Why the source was left out, if it was
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skipped: Option<String>,
}

/// Everything a run did, suitable for a JSON report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub sources: Vec<SourceSummary>,
    pub columns: Vec<String>,
    pub sort_key: String,
    pub dimension_keys: Vec<String>,
    pub measure_keys: Vec<String>,
    pub rows: usize,
    pub groups: usize,
    pub basic_output: String,
    pub advanced_output: String,
    pub coercion_failures: Vec<CoercionFailure>,
}

/// Reconciled columns and their roles, without writing anything
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaReport {
    pub sources: Vec<SourceSummary>,
    pub columns: Vec<(String, ColumnRole)>,
    pub records: usize,
}

/// Sorted, classified and coerced rows, ready to write and aggregate
#[derive(Debug, Clone)]
pub struct PreparedRows {
    pub sorted: SortOutcome,
    pub classification: Classification,
    pub coerced: Coerced,
}

/// Check every identifier before anything is opened
pub fn detect_formats(paths: &[PathBuf]) -> Result<Vec<SourceFormat>> {
    paths.iter().map(|p| SourceFormat::from_path(p)).collect()
}

/// Read every source, applying the malformed-source policy.
///
/// Skipped sources appear in the summaries but contribute no record set.
pub fn load_sources(paths: &[PathBuf], policy: MalformedPolicy) -> Result<(Vec<RecordSet>, Vec<SourceSummary>)> {
    let formats = detect_formats(paths)?;

    let mut sets = Vec::with_capacity(paths.len());
    let mut summaries = Vec::with_capacity(paths.len());

    for (path, format) in paths.iter().zip(formats) {
        match read_source(path, format) {
            Ok(set) => {
                summaries.push(SourceSummary {
                    path: path.display().to_string(),
                    format,
                    records: set.len(),
                    skipped: None,
                });
                sets.push(set);
            },
            Err(err @ SetlError::MalformedSource { .. }) if policy == MalformedPolicy::Skip => {
                error!(error = %err, "Skipping malformed source");
                summaries.push(SourceSummary {
                    path: path.display().to_string(),
                    format,
                    records: 0,
                    skipped: Some(err.to_string()),
                });
            },
            Err(err) => return Err(err),
        }
    }

    Ok((sets, summaries))
}

/// Reconcile, sort, classify and coerce
pub fn prepare(sets: &[RecordSet], options: &PipelineOptions) -> Result<PreparedRows> {
    let reconciled = reconcile(sets)?;
    let sorted = sort_records(&reconciled, options.sort_key.as_deref())?;
    let classification = classify_columns(&sorted.set.keys, &options.classifier);
    let coerced = coerce_measures(&sorted.set.records, &classification);

    Ok(PreparedRows {
        sorted,
        classification,
        coerced,
    })
}

/// The reconcile-and-aggregate pipeline
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    options: PipelineOptions,
}

impl Pipeline {
    pub fn new(options: PipelineOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Run every stage and write both outputs.
    ///
    /// The row-level output is written before aggregation starts.
    pub fn run(&self, request: &PipelineRequest) -> Result<RunReport> {
        let span = info_span!("run", sources = request.sources.len());
        let _enter = span.enter();

        let (sets, sources) = load_sources(&request.sources, self.options.on_malformed)?;
        let prepared = prepare(&sets, &self.options)?;

        let rows = write_file(
            &prepared.coerced.records,
            &request.basic_output,
            self.options.delimiter,
        )?;

        let aggregates = aggregate(
            &prepared.coerced.records,
            &prepared.classification,
            self.options.sum_marker,
        )?;
        let groups = write_file(&aggregates, &request.advanced_output, self.options.delimiter)?;

        info!(
            rows,
            groups,
            coercion_failures = prepared.coerced.failures.len(),
            "Run complete"
        );

        Ok(RunReport {
            sources,
            columns: prepared.sorted.set.keys,
            sort_key: prepared.sorted.sort_key,
            dimension_keys: prepared.classification.dimension_keys,
            measure_keys: prepared.classification.measure_keys,
            rows,
            groups,
            basic_output: display(&request.basic_output),
            advanced_output: display(&request.advanced_output),
            coercion_failures: prepared.coerced.failures,
        })
    }

    /// Read and reconcile the sources and report each shared column's role.
    pub fn inspect(&self, paths: &[PathBuf]) -> Result<SchemaReport> {
        let (sets, sources) = load_sources(paths, self.options.on_malformed)?;
        let reconciled = reconcile(&sets)?;

        let mut keys = reconciled.keys.clone();
        keys.sort();
        let classification = classify_columns(&keys, &self.options.classifier);

        let columns = keys
            .into_iter()
            .map(|key| {
                let role = classification.role_of(&key);
                (key, role)
            })
            .collect();

        Ok(SchemaReport {
            sources,
            columns,
            records: reconciled.len(),
        })
    }
}

fn display(path: &Path) -> String {
    path.display().to_string()
}
