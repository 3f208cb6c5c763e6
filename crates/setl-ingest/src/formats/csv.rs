//! Delimited-text adapter

use setl_common::{Record, RecordOrigin, RecordSet, Result, SetlError, Value};
use std::io::Read;

/// Read comma-delimited text with a header line.
///
/// Every value is kept as text. An empty input or a header-only input yields
/// an empty set; a row whose field count differs from the header is malformed.
pub fn read_csv<R: Read>(reader: R, source_name: &str) -> Result<RecordSet> {
    let mut rdr = ::csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(reader);

    let headers = rdr
        .headers()
        .map_err(|e| SetlError::malformed(source_name, e.to_string()))?
        .clone();

    let mut records = Vec::new();
    for (position, row) in rdr.records().enumerate() {
        let row = row.map_err(|e| SetlError::malformed(source_name, e.to_string()))?;

        let record: Record = headers
            .iter()
            .zip(row.iter())
            .map(|(column, value)| (column, Value::from(value)))
            .collect();

        records.push(record.with_origin(RecordOrigin {
            source: source_name.to_string(),
            index: position + 1,
        }));
    }

    super::ensure_uniform_keys(source_name, &records)?;

    Ok(RecordSet::new(source_name, records))
}
