//! Grouped summation
//!
//! Records with equal dimension values form one group; each measure column is
//! summed per group. Groups are emitted in the order they were first seen.

use crate::classify::Classification;
use indexmap::IndexMap;
use setl_common::{Record, Result, SetlError, Stage, Value};
use tracing::info;

/// Marker inserted after the classification prefix of summed columns
pub const DEFAULT_SUM_MARKER: char = 'S';

/// Dimension values of one record, in dimension-key order
pub type GroupKey = Vec<Value>;

/// Name of a summed measure column: the marker goes right after the first
/// character (`M1` -> `MS1`).
pub fn summed_column_name(measure_key: &str, marker: char) -> String {
    let mut chars = measure_key.chars();
    match chars.next() {
        Some(prefix) => {
            let mut name = String::with_capacity(measure_key.len() + marker.len_utf8());
            name.push(prefix);
            name.push(marker);
            name.push_str(chars.as_str());
            name
        },
        None => marker.to_string(),
    }
}

/// Sum measure columns per unique dimension tuple.
///
/// Input must already be coerced: every measure value has to be an integer.
/// Empty key partitions, missing columns and uncoerced values are schema
/// errors; an i64 overflow is a [`SetlError::MeasureOverflow`].
pub fn aggregate(records: &[Record], classification: &Classification, marker: char) -> Result<Vec<Record>> {
    if classification.dimension_keys.is_empty() {
        return Err(SetlError::schema_mismatch(
            Stage::Aggregate,
            "no dimension columns to group by",
        ));
    }
    if classification.measure_keys.is_empty() {
        return Err(SetlError::schema_mismatch(
            Stage::Aggregate,
            "no measure columns to sum",
        ));
    }

    let mut groups: IndexMap<GroupKey, Vec<i64>> = IndexMap::new();

    for record in records {
        let key = classification
            .dimension_keys
            .iter()
            .map(|column| required(record, column).cloned())
            .collect::<Result<GroupKey>>()?;

        let measures = classification
            .measure_keys
            .iter()
            .map(|column| {
                required(record, column)?.as_integer().ok_or_else(|| {
                    SetlError::schema_mismatch(
                        Stage::Aggregate,
                        format!("{}: column '{}' was not coerced to an integer", record.location(), column),
                    )
                })
            })
            .collect::<Result<Vec<i64>>>()?;

        match groups.get_mut(&key) {
            Some(sums) => {
                for (position, (sum, value)) in sums.iter_mut().zip(measures).enumerate() {
                    *sum = sum.checked_add(value).ok_or_else(|| SetlError::MeasureOverflow {
                        column: classification.measure_keys[position].clone(),
                    })?;
                }
            },
            None => {
                groups.insert(key, measures);
            },
        }
    }

    let summed_names: Vec<String> = classification
        .measure_keys
        .iter()
        .map(|key| summed_column_name(key, marker))
        .collect();

    let output: Vec<Record> = groups
        .into_iter()
        .map(|(key, sums)| {
            let dimensions = classification.dimension_keys.iter().cloned().zip(key);
            let measures = summed_names
                .iter()
                .cloned()
                .zip(sums.into_iter().map(Value::Integer));
            dimensions.chain(measures).collect::<Record>()
        })
        .collect();

    info!(
        input = records.len(),
        groups = output.len(),
        "Aggregated records"
    );

    Ok(output)
}

fn required<'r>(record: &'r Record, column: &str) -> Result<&'r Value> {
    record.get(column).ok_or_else(|| {
        SetlError::schema_mismatch(
            Stage::Aggregate,
            format!("{} has no column '{}'", record.location(), column),
        )
    })
}
