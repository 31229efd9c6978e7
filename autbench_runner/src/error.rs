use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

/// Errors that abort a benchmark batch.
///
/// Timeouts are not errors: they are reported as [`crate::Outcome::TimedOut`].
#[derive(Error, Debug)]
pub enum RunnerError {
    /// The input folder cannot be listed.
    #[error("cannot read input folder '{path}'")]
    ReadDir {
        /// Folder that was being listed.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// The tool binary could not be started or waited on.
    #[error("cannot run '{binary}'")]
    Spawn {
        /// Tool binary.
        binary: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// The tool terminated with a failure status.
    #[error("'{binary}' exited with {status}:\n{output}")]
    ToolFailed {
        /// Tool binary.
        binary: String,
        /// Exit status of the process.
        status: ExitStatus,
        /// Captured output.
        output: String,
    },
    /// Tool output does not follow the expected line convention.
    #[error("unexpected tool output: {0}")]
    ParseMismatch(String),
    /// Tool output is not a well-formed XML document.
    #[error("malformed XML output")]
    MalformedXml(#[from] quick_xml::Error),
    /// Tool output XML is unbalanced or has no root element.
    #[error("malformed XML output: {0}")]
    XmlStructure(String),
    /// Writing the report failed.
    #[error("cannot write report")]
    Csv(#[from] csv::Error),
    /// I/O error writing the report.
    #[error("I/O error")]
    Io(#[from] std::io::Error),
}
