//! Record model shared by every pipeline stage
//!
//! Records are produced by the source adapters and never mutated afterwards:
//! each stage builds new records from the previous stage's output.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

// ============================================================================
// Values
// ============================================================================

/// A single cell value.
///
/// Equality and hashing are exact, so `Text("1")` and `Integer(1)` never group
/// together. Ordering compares integers numerically and text by bytes; every
/// integer sorts before every text value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Text(String),
    Integer(i64),
}

impl Value {
    /// The integer payload, if this is an integer value
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            Value::Text(_) => None,
        }
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => a.cmp(b),
            (Value::Text(a), Value::Text(b)) => a.cmp(b),
            (Value::Integer(_), Value::Text(_)) => Ordering::Less,
            (Value::Text(_), Value::Integer(_)) => Ordering::Greater,
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Text(s) => f.write_str(s),
            Value::Integer(n) => write!(f, "{}", n),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

// ============================================================================
// Records
// ============================================================================

/// Where a record was read from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordOrigin {
    /// Source identifier (usually the file path)
    pub source: String,

    /// 1-based position of the record within its source
    pub index: usize,
}

impl std::fmt::Display for RecordOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} record {}", self.source, self.index)
    }
}

/// An ordered mapping from column name to value.
///
/// Equality compares entries in order and ignores the origin.
#[derive(Debug, Clone, Default)]
pub struct Record {
    fields: IndexMap<String, Value>,
    origin: Option<RecordOrigin>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach provenance to this record
    pub fn with_origin(mut self, origin: RecordOrigin) -> Self {
        self.origin = Some(origin);
        self
    }

    pub fn origin(&self) -> Option<&RecordOrigin> {
        self.origin.as_ref()
    }

    /// Human-readable location used in diagnostics
    pub fn location(&self) -> String {
        match &self.origin {
            Some(origin) => origin.to_string(),
            None => "<derived record>".to_string(),
        }
    }

    /// Append an entry, replacing the value if the column already exists.
    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(column.into(), value.into())
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.fields.get(column)
    }

    pub fn contains_key(&self, column: &str) -> bool {
        self.fields.contains_key(column)
    }

    /// Column names in entry order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Whether both records carry exactly the same column names, in any order
    pub fn same_keys(&self, other: &Record) -> bool {
        self.len() == other.len() && self.keys().all(|k| other.contains_key(k))
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.fields.len() == other.fields.len() && self.fields.iter().eq(other.fields.iter())
    }
}

impl Eq for Record {}

impl<K: Into<String>> FromIterator<(K, Value)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
            origin: None,
        }
    }
}

// ============================================================================
// Record collections
// ============================================================================

/// Records read from a single source, in read order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSet {
    pub source: String,
    pub records: Vec<Record>,
}

impl RecordSet {
    pub fn new(source: impl Into<String>, records: Vec<Record>) -> Self {
        Self {
            source: source.into(),
            records,
        }
    }

    /// Key set of the first record; empty when the set has no records.
    pub fn key_basis(&self) -> Vec<&str> {
        self.records
            .first()
            .map(|r| r.keys().collect())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Records that all share exactly the column set `keys`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconciledSet {
    pub keys: Vec<String>,
    pub records: Vec<Record>,
}

impl ReconciledSet {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
