//! Error types for setl

use thiserror::Error;

/// Result type alias for setl operations
pub type Result<T> = std::result::Result<T, SetlError>;

/// Pipeline stage an error was raised in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Reconcile,
    Sort,
    Aggregate,
    Write,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Reconcile => write!(f, "reconcile"),
            Stage::Sort => write!(f, "sort"),
            Stage::Aggregate => write!(f, "aggregate"),
            Stage::Write => write!(f, "write"),
        }
    }
}

/// Main error type for setl
///
/// `ValueCoercion` is the only variant the pipeline recovers from; every other
/// variant terminates the run.
#[derive(Error, Debug)]
pub enum SetlError {
    #[error("[read] unsupported format: '{0}' (expected a .csv, .json or .xml file)")]
    UnsupportedFormat(String),

    #[error("[read] cannot open source '{source_name}': {reason}")]
    SourceUnreadable { source_name: String, reason: String },

    #[error("[read] malformed source '{source_name}': {reason}")]
    MalformedSource { source_name: String, reason: String },

    #[error("[{stage}] no input records: {reason}")]
    EmptyInput { stage: Stage, reason: String },

    #[error("[write] nothing to write to '{destination}': the record sequence is empty")]
    EmptyOutput { destination: String },

    #[error("[coerce] column '{column}' in {location}: cannot convert '{raw}' to an integer")]
    ValueCoercion {
        location: String,
        column: String,
        raw: String,
    },

    #[error("[{stage}] schema mismatch: {reason}")]
    SchemaMismatch { stage: Stage, reason: String },

    #[error("[aggregate] integer overflow while summing column '{column}'")]
    MeasureOverflow { column: String },

    #[error("[write] failed writing '{destination}': {reason}")]
    Sink { destination: String, reason: String },
}

impl SetlError {
    /// Create a malformed source error
    pub fn malformed(source_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedSource {
            source_name: source_name.into(),
            reason: reason.into(),
        }
    }

    /// Create an empty input error
    pub fn empty_input(stage: Stage, reason: impl Into<String>) -> Self {
        Self::EmptyInput {
            stage,
            reason: reason.into(),
        }
    }

    /// Create a schema mismatch error
    pub fn schema_mismatch(stage: Stage, reason: impl Into<String>) -> Self {
        Self::SchemaMismatch {
            stage,
            reason: reason.into(),
        }
    }

    /// Whether the pipeline may recover from this error locally
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::ValueCoercion { .. })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_stage_and_source() {
        let err = SetlError::malformed("data/in.json", "missing 'fields' array");
        assert_eq!(
            err.to_string(),
            "[read] malformed source 'data/in.json': missing 'fields' array"
        );

        let err = SetlError::empty_input(Stage::Sort, "no shared columns");
        assert_eq!(err.to_string(), "[sort] no input records: no shared columns");

        let err = SetlError::schema_mismatch(Stage::Aggregate, "no dimension keys");
        assert!(err.to_string().starts_with("[aggregate]"));

        let err = SetlError::SourceUnreadable {
            source_name: "data/nope.csv".into(),
            reason: "No such file or directory".into(),
        };
        assert_eq!(
            err.to_string(),
            "[read] cannot open source 'data/nope.csv': No such file or directory"
        );
    }

    #[test]
    fn test_only_coercion_is_recoverable() {
        let coercion = SetlError::ValueCoercion {
            location: "a.csv record 2".into(),
            column: "M1".into(),
            raw: "x".into(),
        };
        assert!(coercion.is_recoverable());
        assert!(!SetlError::UnsupportedFormat("a.tsv".into()).is_recoverable());
        assert!(!SetlError::MeasureOverflow { column: "M1".into() }.is_recoverable());
    }
}
