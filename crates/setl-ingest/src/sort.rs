//! Deterministic ordering
//!
//! Two phases: entries inside each record are reordered by column name, then
//! records are stably sorted by the value at one column.

use setl_common::{ReconciledSet, Record, Result, SetlError, Stage};
use tracing::debug;

/// Sorted records plus the column they were actually ordered by
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortOutcome {
    pub set: ReconciledSet,
    pub sort_key: String,
}

/// Resolve the requested sort key against the available columns.
///
/// A missing, empty or unknown key falls back to the lexicographically
/// smallest column name.
pub fn resolve_sort_key(keys: &[String], requested: Option<&str>) -> Option<String> {
    match requested {
        Some(key) if !key.is_empty() && keys.iter().any(|k| k == key) => Some(key.to_string()),
        _ => keys.iter().min().cloned(),
    }
}

/// Sort a reconciled set.
///
/// Fails with [`SetlError::EmptyInput`] when there are no records or no
/// shared columns to sort by.
pub fn sort_records(set: &ReconciledSet, requested: Option<&str>) -> Result<SortOutcome> {
    if set.is_empty() {
        return Err(SetlError::empty_input(
            Stage::Sort,
            "no records were read from any source",
        ));
    }

    let sort_key = resolve_sort_key(&set.keys, requested).ok_or_else(|| {
        SetlError::empty_input(Stage::Sort, "the sources share no common columns")
    })?;

    if requested.is_some_and(|r| r != sort_key) {
        debug!(
            requested = requested.unwrap_or_default(),
            used = %sort_key,
            "Sort key not present, using smallest column name"
        );
    }

    let mut keys = set.keys.clone();
    keys.sort();

    let mut records: Vec<Record> = set.records.iter().map(|r| with_sorted_keys(r, &keys)).collect();

    // `sort_by` is stable: equal values keep their input order.
    records.sort_by(|a, b| a.get(&sort_key).cmp(&b.get(&sort_key)));

    Ok(SortOutcome {
        set: ReconciledSet { keys, records },
        sort_key,
    })
}

/// Rebuild a record with its entries in `sorted_keys` order
fn with_sorted_keys(record: &Record, sorted_keys: &[String]) -> Record {
    let rebuilt: Record = sorted_keys
        .iter()
        .filter_map(|key| record.get(key).map(|value| (key.as_str(), value.clone())))
        .collect();

    match record.origin() {
        Some(origin) => rebuilt.with_origin(origin.clone()),
        None => rebuilt,
    }
}
