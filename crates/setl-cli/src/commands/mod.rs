//! CLI command implementations
//!
//! Each subcommand has its own module with a `run` function.

pub mod config;
pub mod run;
pub mod schema;
