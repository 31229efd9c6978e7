//! autbench runs automata complementation tools over benchmark folders and
//! merges their results into comparison tables.
//!
//! - `run`: one tool, one folder, one `;`-separated row per automaton
//!   (see [`autbench_runner`])
//! - `aggregate`: several result files merged by automaton
//!   (see [`autbench_merge`])
//! - `convert`: GFF to BA conversion of input automata

mod cli;
pub mod gff;

pub use autbench_merge;
pub use autbench_runner;
pub use cli::Cli;
