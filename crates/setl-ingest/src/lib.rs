//! setl Ingest Library
//!
//! Reads tabular records from heterogeneous files, reconciles them onto their
//! shared columns, and produces a row-level table plus a grouped aggregate.
//!
//! # Supported Formats
//!
//! - **CSV**: header line plus delimited rows
//! - **JSON**: an object with a `fields` array of flat objects
//! - **XML**: `objects` elements holding named `value` children
//!
//! # Stages
//!
//! [`reconcile`] -> [`sort`] -> [`classify`] -> [`coerce`] -> [`aggregate`],
//! with [`sink`] writing each table. [`pipeline`] wires them together.
//!
//! # Example
//!
//! ```no_run
//! use setl_ingest::pipeline::{Pipeline, PipelineOptions, PipelineRequest};
//! use std::path::PathBuf;
//!
//! fn main() -> setl_common::Result<()> {
//!     let request = PipelineRequest::new(vec![
//!         PathBuf::from("data/sales.csv"),
//!         PathBuf::from("data/sales.json"),
//!     ]);
//!     let report = Pipeline::new(PipelineOptions::default()).run(&request)?;
//!     println!("{} rows, {} groups", report.rows, report.groups);
//!     Ok(())
//! }
//! ```

pub mod aggregate;
pub mod classify;
pub mod coerce;
pub mod formats;
pub mod pipeline;
pub mod reconcile;
pub mod sink;
pub mod sort;

pub use classify::{ColumnClassifier, ColumnRole, PrefixClassifier};
pub use formats::SourceFormat;
pub use pipeline::{MalformedPolicy, Pipeline, PipelineOptions, PipelineRequest, RunReport};
