//! CLI support for attr-search
//!
//! Provides programmatic access to the `attr-search` commands so they can be
//! embedded in other tools.

mod check;
mod convert;

pub use check::{CheckOptions, CheckResult, CompileCommand, execute_check, execute_compile};
pub use convert::{filter_to_json, value_to_json};

use std::io;

use thiserror::Error;

/// Errors that can occur during CLI operations
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Parse error: {0}")]
    Parse(#[from] crate::ParseError),

    #[error("Search error: {0}")]
    Search(#[from] crate::SearchError),

    #[error("Registry error: {0}")]
    Registry(#[from] crate::SpecificationError),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("No query provided. Pass it as an argument or pipe it to stdin.")]
    NoQuery,
}
