//! setl Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared data model, error taxonomy, and logging setup for the setl workspace.
//!
//! # Overview
//!
//! - **Types**: `Value`, `Record`, `RecordSet` and `ReconciledSet`, the shapes every
//!   pipeline stage consumes and produces
//! - **Error Handling**: `SetlError` and the `Result` alias
//! - **Logging**: `tracing` subscriber initialisation shared by all binaries
//!
//! # Example
//!
//! ```
//! use setl_common::types::{Record, Value};
//!
//! let record: Record = [("D1", Value::from("a")), ("M1", Value::Integer(3))]
//!     .into_iter()
//!     .collect();
//! assert_eq!(record.get("M1"), Some(&Value::Integer(3)));
//! ```

pub mod error;
pub mod logging;
pub mod types;

// Re-export commonly used types
pub use error::{Result, SetlError, Stage};
pub use types::{ReconciledSet, Record, RecordOrigin, RecordSet, Value};
