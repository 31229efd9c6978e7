//! Merging of per-tool benchmark result files into one comparison table.
//!
//! Each input starts with a `#<tool name>` line followed by a `;`-separated
//! table whose header names a key column (`aut` by default). Rows of all
//! tables are grouped by key, in the order keys are first seen, and the
//! selected columns of every table are concatenated in input order.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod merge;
mod table;

pub use merge::{MergeConfig, Merged, MergedRow};
pub use table::{ResultTable, load_tables};

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or merging result files.
#[derive(Error, Debug)]
pub enum MergeError {
    /// A result file cannot be opened or read.
    #[error("cannot open the file '{path}'")]
    Open {
        /// The offending path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// Some of the result files could not be opened.
    #[error("{} result file(s) could not be opened", .0.len())]
    Unreadable(Vec<PathBuf>),
    /// The table has no header row.
    #[error("result table '{0}' has no header")]
    MissingHeader(String),
    /// The header does not name the key column.
    #[error("result table '{table}' has no '{key}' column")]
    MissingKeyColumn {
        /// Display name of the table.
        table: String,
        /// Expected key column.
        key: String,
    },
    /// A data row has no value for the key column.
    #[error("row {line} of '{table}' has no key")]
    MissingKey {
        /// Display name of the table.
        table: String,
        /// Line of the row in the file, if known.
        line: u64,
    },
    /// Malformed delimited data.
    #[error("CSV error")]
    Csv(#[from] csv::Error),
    /// I/O error.
    #[error("I/O error")]
    Io(#[from] std::io::Error),
}
