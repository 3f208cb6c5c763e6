//! Schema reconciliation
//!
//! Intersects the column sets of every source and projects all records onto
//! the shared columns.

use setl_common::{ReconciledSet, Record, RecordSet, Result, SetlError, Stage};
use std::collections::HashSet;
use tracing::{debug, info};

/// Columns shared by the first record of every set.
///
/// Order follows the first set's first record. An empty set, or no sets at
/// all, yields no shared columns.
pub fn intersect_keys(sets: &[RecordSet]) -> Vec<String> {
    let Some(first) = sets.first() else {
        return Vec::new();
    };

    let others: Vec<HashSet<&str>> = sets[1..]
        .iter()
        .map(|set| set.key_basis().into_iter().collect())
        .collect();

    first
        .key_basis()
        .into_iter()
        .filter(|key| others.iter().all(|keys| keys.contains(key)))
        .map(str::to_string)
        .collect()
}

/// Project every record of every set onto the shared columns.
///
/// Records keep their cross-set concatenation order. A record lacking one of
/// the shared columns breaks the adapter contract and is a schema mismatch.
pub fn reconcile(sets: &[RecordSet]) -> Result<ReconciledSet> {
    let keys = intersect_keys(sets);
    debug!(shared = ?keys, sources = sets.len(), "Computed shared columns");

    let total: usize = sets.iter().map(RecordSet::len).sum();
    let mut records = Vec::with_capacity(total);

    for set in sets {
        for (position, record) in set.records.iter().enumerate() {
            records.push(project(record, &keys).map_err(|column| {
                SetlError::schema_mismatch(
                    Stage::Reconcile,
                    format!(
                        "{} record {} has no column '{}'",
                        set.source,
                        position + 1,
                        column
                    ),
                )
            })?);
        }
    }

    info!(
        columns = keys.len(),
        records = records.len(),
        "Reconciled sources"
    );

    Ok(ReconciledSet { keys, records })
}

/// Build a new record holding only `keys`, in `keys` order.
///
/// Returns the first missing column on failure.
fn project(record: &Record, keys: &[String]) -> std::result::Result<Record, String> {
    let mut projected = keys
        .iter()
        .map(|key| {
            record
                .get(key)
                .map(|value| (key.as_str(), value.clone()))
                .ok_or_else(|| key.clone())
        })
        .collect::<std::result::Result<Record, String>>()?;

    if let Some(origin) = record.origin() {
        projected = projected.with_origin(origin.clone());
    }
    Ok(projected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use setl_common::Value;

    fn record(entries: &[(&str, &str)]) -> Record {
        entries
            .iter()
            .map(|(k, v)| (*k, Value::from(*v)))
            .collect()
    }

    fn csv_set() -> RecordSet {
        RecordSet::new(
            "a.csv",
            vec![
                record(&[("D1", "a"), ("D2", "b"), ("M1", "1"), ("M2", "1")]),
                record(&[("D1", "b"), ("D2", "a"), ("M1", "0"), ("M2", "0")]),
            ],
        )
    }

    fn json_set() -> RecordSet {
        RecordSet::new(
            "b.json",
            vec![
                [("D1", Value::from("a")), ("D2", Value::from("a")), ("M1", Value::Integer(2))]
                    .into_iter()
                    .collect(),
                [("D1", Value::from("b")), ("D2", Value::from("b")), ("M1", Value::Integer(1))]
                    .into_iter()
                    .collect(),
            ],
        )
    }

    #[test]
    fn test_intersection_projects_in_concatenation_order() {
        let result = reconcile(&[csv_set(), json_set()]).unwrap();

        assert_eq!(result.keys, vec!["D1", "D2", "M1"]);
        assert_eq!(result.len(), 4);
        assert_eq!(result.records[0], record(&[("D1", "a"), ("D2", "b"), ("M1", "1")]));
        assert_eq!(result.records[2].get("M1"), Some(&Value::Integer(2)));
    }

    #[test]
    fn test_empty_set_collapses_intersection() {
        let empty = RecordSet::new("empty.csv", Vec::new());
        let result = reconcile(&[csv_set(), empty]).unwrap();

        assert!(result.keys.is_empty());
        assert_eq!(result.len(), 2);
        assert!(result.records.iter().all(Record::is_empty));
    }

    #[test]
    fn test_no_sets() {
        let result = reconcile(&[]).unwrap();
        assert!(result.keys.is_empty());
        assert!(result.is_empty());
    }

    #[test]
    fn test_missing_shared_column_is_schema_mismatch() {
        let broken = RecordSet::new(
            "broken.json",
            vec![
                record(&[("D1", "a"), ("M1", "1")]),
                record(&[("D1", "b")]),
            ],
        );

        let err = reconcile(&[broken]).unwrap_err();
        assert!(matches!(err, SetlError::SchemaMismatch { stage: Stage::Reconcile, .. }));
        assert!(err.to_string().contains("broken.json record 2"));
    }

    #[test]
    fn test_projection_keeps_origin() {
        let stamped = RecordSet::new(
            "c.csv",
            vec![record(&[("D1", "a")]).with_origin(setl_common::RecordOrigin {
                source: "c.csv".into(),
                index: 1,
            })],
        );

        let result = reconcile(&[stamped]).unwrap();
        assert_eq!(result.records[0].origin().unwrap().source, "c.csv");
    }
}
