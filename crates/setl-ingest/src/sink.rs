//! Flat delimited output

use setl_common::{Record, Result, SetlError, Stage};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::info;

/// Field delimiter used when none is configured
pub const DEFAULT_DELIMITER: u8 = b'\t';

/// Write a header line from the first record's key order, then one line per
/// record. Returns the number of data rows written.
pub fn write_records<W: Write>(records: &[Record], writer: W, delimiter: u8, destination: &str) -> Result<usize> {
    let first = records.first().ok_or_else(|| SetlError::EmptyOutput {
        destination: destination.to_string(),
    })?;
    let header: Vec<&str> = first.keys().collect();

    let sink_error = |e: ::csv::Error| SetlError::Sink {
        destination: destination.to_string(),
        reason: e.to_string(),
    };

    let mut wtr = ::csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(writer);

    wtr.write_record(&header).map_err(sink_error)?;

    for record in records {
        let row = header
            .iter()
            .map(|column| {
                record.get(column).map(ToString::to_string).ok_or_else(|| {
                    SetlError::schema_mismatch(
                        Stage::Write,
                        format!("{} has no column '{}' for '{}'", record.location(), column, destination),
                    )
                })
            })
            .collect::<Result<Vec<String>>>()?;
        wtr.write_record(&row).map_err(sink_error)?;
    }

    wtr.flush().map_err(|e| SetlError::Sink {
        destination: destination.to_string(),
        reason: e.to_string(),
    })?;
    Ok(records.len())
}

/// Write records to a file.
///
/// Emptiness is checked before the file is created, so an empty sequence
/// leaves nothing behind.
pub fn write_file(records: &[Record], path: &Path, delimiter: u8) -> Result<usize> {
    let destination = path.display().to_string();
    if records.is_empty() {
        return Err(SetlError::EmptyOutput { destination });
    }

    let file = File::create(path).map_err(|e| SetlError::Sink {
        destination: destination.clone(),
        reason: e.to_string(),
    })?;
    let rows = write_records(records, file, delimiter, &destination)?;

    info!(path = %destination, rows, "Wrote output");
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use setl_common::Value;

    fn rows() -> Vec<Record> {
        vec![
            [("D1", Value::from("a")), ("MS1", Value::Integer(3))].into_iter().collect(),
            [("MS1", Value::Integer(0)), ("D1", Value::from("c"))].into_iter().collect(),
        ]
    }

    #[test]
    fn test_header_follows_first_record_order() {
        let mut out = Vec::new();
        let written = write_records(&rows(), &mut out, DEFAULT_DELIMITER, "mem").unwrap();

        assert_eq!(written, 2);
        assert_eq!(String::from_utf8(out).unwrap(), "D1\tMS1\na\t3\nc\t0\n");
    }

    #[test]
    fn test_fields_containing_delimiter_are_quoted() {
        let records: Vec<Record> = vec![[("D1", Value::from("a\tb"))].into_iter().collect()];
        let mut out = Vec::new();
        write_records(&records, &mut out, DEFAULT_DELIMITER, "mem").unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), "D1\n\"a\tb\"\n");
    }

    #[test]
    fn test_custom_delimiter() {
        let mut out = Vec::new();
        write_records(&rows(), &mut out, b';', "mem").unwrap();
        assert!(String::from_utf8(out).unwrap().starts_with("D1;MS1\n"));
    }

    #[test]
    fn test_empty_sequence_is_rejected() {
        let err = write_records(&[], Vec::new(), DEFAULT_DELIMITER, "out.tsv").unwrap_err();
        assert!(matches!(err, SetlError::EmptyOutput { ref destination } if destination == "out.tsv"));
    }

    #[test]
    fn test_missing_column_is_schema_mismatch() {
        let records: Vec<Record> = vec![
            [("D1", Value::from("a")), ("M1", Value::Integer(1))].into_iter().collect(),
            [("D1", Value::from("b"))].into_iter().collect(),
        ];
        let err = write_records(&records, Vec::new(), DEFAULT_DELIMITER, "mem").unwrap_err();
        assert!(matches!(err, SetlError::SchemaMismatch { stage: Stage::Write, .. }));
    }

    #[test]
    fn test_write_file_does_not_create_empty_output() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.tsv");

        assert!(write_file(&[], &path, DEFAULT_DELIMITER).is_err());
        assert!(!path.exists());

        write_file(&rows(), &path, DEFAULT_DELIMITER).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "D1\tMS1\na\t3\nc\t0\n");
    }

    #[test]
    fn test_create_failure_names_destination() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no_such_dir").join("out.tsv");

        let err = write_file(&rows(), &path, DEFAULT_DELIMITER).unwrap_err();

        assert!(matches!(err, SetlError::Sink { ref destination, .. } if destination.ends_with("out.tsv")));
        assert!(err.to_string().starts_with("[write] failed writing"));
    }
}
