//! Batch runner for external automata tools.
//!
//! A [`Runner`] invokes one tool binary per input automaton file, under a
//! wall-clock timeout, and turns whatever the tool prints into a
//! [`BenchmarkRecord`]. Records are written out as a `;`-separated table
//! (or as LaTeX table rows) ready to be merged by `autbench_merge`.
//!
//! Timeouts are an expected outcome and yield a sentinel row; any other
//! failure (tool crash, unexpected output) aborts the batch.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod exec;
mod parse;
mod record;
mod report;
mod runner;
mod select;
mod tool;

pub use error::RunnerError;
pub use exec::{Outcome, execute};
pub use parse::{count_states, parse_trailing_lines};
pub use record::{BenchmarkRecord, Metric, TIMEOUT_SENTINEL};
pub use report::{OutputFormat, Report};
pub use runner::{RunConfig, Runner};
pub use select::select_files;
pub use tool::{Family, ToolKind};
