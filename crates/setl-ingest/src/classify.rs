//! Column classification
//!
//! Splits column names into dimension keys (grouping identity) and measure
//! keys (summed). The policy sits behind [`ColumnClassifier`] so it can be
//! replaced and tested on its own.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Role of a column in aggregation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnRole {
    Dimension,
    Measure,
    Unclassified,
}

impl std::fmt::Display for ColumnRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColumnRole::Dimension => write!(f, "dimension"),
            ColumnRole::Measure => write!(f, "measure"),
            ColumnRole::Unclassified => write!(f, "unclassified"),
        }
    }
}

/// Decides the role of a column from its name
pub trait ColumnClassifier {
    fn classify(&self, column: &str) -> ColumnRole;
}

/// Naming-convention classifier: a leading character marks the role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrefixClassifier {
    pub dimension_prefix: char,
    pub measure_prefix: char,
}

impl Default for PrefixClassifier {
    fn default() -> Self {
        Self {
            dimension_prefix: 'D',
            measure_prefix: 'M',
        }
    }
}

impl ColumnClassifier for PrefixClassifier {
    fn classify(&self, column: &str) -> ColumnRole {
        if column.starts_with(self.dimension_prefix) {
            ColumnRole::Dimension
        } else if column.starts_with(self.measure_prefix) {
            ColumnRole::Measure
        } else {
            ColumnRole::Unclassified
        }
    }
}

/// Dimension and measure keys, each in input order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub dimension_keys: Vec<String>,
    pub measure_keys: Vec<String>,
}

impl Classification {
    /// Role of a column under this classification
    pub fn role_of(&self, column: &str) -> ColumnRole {
        if self.dimension_keys.iter().any(|k| k == column) {
            ColumnRole::Dimension
        } else if self.measure_keys.iter().any(|k| k == column) {
            ColumnRole::Measure
        } else {
            ColumnRole::Unclassified
        }
    }

    pub fn is_measure(&self, column: &str) -> bool {
        self.measure_keys.iter().any(|k| k == column)
    }
}

/// Partition column names with the given classifier.
///
/// Unclassified names are left out of both partitions.
pub fn classify_columns<S, C>(columns: &[S], classifier: &C) -> Classification
where
    S: AsRef<str>,
    C: ColumnClassifier + ?Sized,
{
    let mut classification = Classification::default();

    for column in columns.iter().map(AsRef::as_ref) {
        match classifier.classify(column) {
            ColumnRole::Dimension => classification.dimension_keys.push(column.to_string()),
            ColumnRole::Measure => classification.measure_keys.push(column.to_string()),
            ColumnRole::Unclassified => {
                debug!(column = %column, "Column matches no classification prefix");
            },
        }
    }

    classification
}
