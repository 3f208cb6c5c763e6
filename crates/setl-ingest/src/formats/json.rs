//! Structured-object adapter
//!
//! Expected document shape:
//!
//! ```json
//! { "fields": [ { "D1": "a", "M1": 2 }, { "D1": "b", "M1": "1" } ] }
//! ```

use serde_json::Value as JsonValue;
use setl_common::{Record, RecordOrigin, RecordSet, Result, SetlError, Value};
use std::io::Read;

/// Read a JSON document holding a `fields` array of flat objects.
pub fn read_json<R: Read>(reader: R, source_name: &str) -> Result<RecordSet> {
    let document: JsonValue = serde_json::from_reader(reader)
        .map_err(|e| SetlError::malformed(source_name, format!("invalid JSON: {}", e)))?;

    let fields = document
        .get("fields")
        .ok_or_else(|| SetlError::malformed(source_name, "missing top-level 'fields' array"))?
        .as_array()
        .ok_or_else(|| SetlError::malformed(source_name, "'fields' is not an array"))?;

    let mut records = Vec::with_capacity(fields.len());
    for (position, element) in fields.iter().enumerate() {
        let object = element.as_object().ok_or_else(|| {
            SetlError::malformed(
                source_name,
                format!("element {} of 'fields' is not an object", position + 1),
            )
        })?;

        let record: Record = object
            .iter()
            .map(|(column, value)| (column.as_str(), scalar_value(value)))
            .collect();

        records.push(record.with_origin(RecordOrigin {
            source: source_name.to_string(),
            index: position + 1,
        }));
    }

    super::ensure_uniform_keys(source_name, &records)?;

    Ok(RecordSet::new(source_name, records))
}

/// Map a JSON value onto the record value model.
///
/// Integers that fit in i64 stay typed; everything else becomes text.
fn scalar_value(value: &JsonValue) -> Value {
    match value {
        JsonValue::String(s) => Value::Text(s.clone()),
        JsonValue::Number(n) => match n.as_i64() {
            Some(i) => Value::Integer(i),
            None => Value::Text(n.to_string()),
        },
        JsonValue::Bool(b) => Value::Text(b.to_string()),
        JsonValue::Null => Value::Text(String::new()),
        nested @ (JsonValue::Array(_) | JsonValue::Object(_)) => Value::Text(nested.to_string()),
    }
}
