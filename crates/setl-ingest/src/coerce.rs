//! Measure type coercion
//!
//! Converts measure values to integers. A value that cannot be converted is
//! replaced by zero and reported; it never aborts the run.

use crate::classify::Classification;
use serde::Serialize;
use setl_common::{Record, SetlError, Value};
use tracing::warn;

/// One measure value that could not be converted
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoercionFailure {
    /// Source the record came from, when known
    pub source: Option<String>,
    /// 1-based record position within that source
    pub record_index: Option<usize>,
    /// 0-based position in the coerced sequence
    pub row: usize,
    pub column: String,
    pub raw: String,
}

impl CoercionFailure {
    /// The failure rendered as the error it was recovered from
    pub fn to_error(&self) -> SetlError {
        let location = match (&self.source, self.record_index) {
            (Some(source), Some(index)) => format!("{} record {}", source, index),
            _ => format!("row {}", self.row + 1),
        };
        SetlError::ValueCoercion {
            location,
            column: self.column.clone(),
            raw: self.raw.clone(),
        }
    }
}

/// Coerced records plus every recovered failure
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Coerced {
    pub records: Vec<Record>,
    pub failures: Vec<CoercionFailure>,
}

/// Parse a single measure value.
///
/// Surrounding whitespace and a leading sign are accepted.
pub fn parse_measure(value: &Value) -> std::result::Result<i64, String> {
    match value {
        Value::Integer(n) => Ok(*n),
        Value::Text(raw) => raw.trim().parse::<i64>().map_err(|_| raw.clone()),
    }
}

/// Convert every measure value to an integer.
///
/// Dimension and unclassified values pass through untouched.
pub fn coerce_measures(records: &[Record], classification: &Classification) -> Coerced {
    let mut coerced = Coerced {
        records: Vec::with_capacity(records.len()),
        failures: Vec::new(),
    };

    for (row, record) in records.iter().enumerate() {
        let mut converted = Record::new();

        for (column, value) in record.iter() {
            if !classification.is_measure(column) {
                converted.insert(column, value.clone());
                continue;
            }

            let number = match parse_measure(value) {
                Ok(n) => n,
                Err(raw) => {
                    let failure = CoercionFailure {
                        source: record.origin().map(|o| o.source.clone()),
                        record_index: record.origin().map(|o| o.index),
                        row,
                        column: column.to_string(),
                        raw,
                    };
                    warn!(error = %failure.to_error(), "Measure value replaced with 0");
                    coerced.failures.push(failure);
                    0
                },
            };
            converted.insert(column, Value::Integer(number));
        }

        if let Some(origin) = record.origin() {
            converted = converted.with_origin(origin.clone());
        }
        coerced.records.push(converted);
    }

    coerced
}
