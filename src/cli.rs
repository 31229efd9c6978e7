use crate::gff::BaAutomaton;
use anyhow::Context;
use autbench_merge::{MergeConfig, MergeError, Merged, load_tables};
use autbench_runner::{OutputFormat, RunConfig, Runner, ToolKind};
use clap::{ArgGroup, Args, Parser, Subcommand};
use log::info;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

/// Benchmarking harness for Büchi automata complementation tools
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a tool on every automaton of a folder and print one row per file
    Run(RunArgs),
    /// Merge result files of several tools by automaton
    Aggregate(AggregateArgs),
    /// Print a GFF automaton in BA format
    Convert {
        /// GFF file to convert
        #[arg(value_hint = clap::ValueHint::FilePath)]
        gff: PathBuf,
    },
}

#[derive(Args)]
#[command(group(
    ArgGroup::new("tool")
        .required(true)
        .args(["rnk", "safra", "piterman", "schewe"])
))]
struct RunArgs {
    /// Tool binary
    #[arg(value_hint = clap::ValueHint::FilePath)]
    binary: PathBuf,
    /// Folder of input automata
    #[arg(value_hint = clap::ValueHint::DirPath)]
    folder: PathBuf,
    /// Rank-based complementation (`.ba` inputs)
    #[arg(long)]
    rnk: bool,
    /// Safra's construction (`.gff` inputs)
    #[arg(long)]
    safra: bool,
    /// Piterman's construction (`.gff` inputs)
    #[arg(long)]
    piterman: bool,
    /// Schewe's construction (`.gff` inputs)
    #[arg(long)]
    schewe: bool,
    /// Print LaTeX table rows
    #[arg(short, long)]
    tex: bool,
    /// Process at most N automata
    #[arg(long = "aut", value_name = "N")]
    limit: Option<usize>,
    /// Timeout per automaton, in seconds [default: 100 for --rnk, 300 otherwise]
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,
    /// Tool name written on the first line, as expected by `aggregate`
    #[arg(long)]
    name: Option<String>,
    /// Extra argument passed to the tool after the input file (repeatable)
    #[arg(long = "arg", value_name = "ARG", allow_hyphen_values = true)]
    extra_args: Vec<String>,
}

impl RunArgs {
    fn tool(&self) -> ToolKind {
        if self.rnk {
            ToolKind::Rank
        } else if self.safra {
            ToolKind::Safra
        } else if self.piterman {
            ToolKind::Piterman
        } else {
            ToolKind::Schewe
        }
    }

    fn config(&self) -> RunConfig {
        let mut config = RunConfig::new(self.binary.clone(), self.tool());
        if let Some(secs) = self.timeout {
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(limit) = self.limit {
            config.limit = limit;
        }
        if self.tex {
            config.format = OutputFormat::Tex;
        }
        config.name = self.name.clone();
        config.extra_args = self.extra_args.clone();
        config
    }
}

#[derive(Args)]
struct AggregateArgs {
    /// Result files, each starting with a `#<tool name>` line
    #[arg(required = true, value_hint = clap::ValueHint::FilePath)]
    files: Vec<PathBuf>,
    /// Key column correlating rows across files
    #[arg(short, long, default_value = MergeConfig::DEFAULT_KEY)]
    key: String,
    /// Columns to merge, in order
    #[arg(
        short,
        long,
        value_delimiter = ',',
        default_values = MergeConfig::DEFAULT_COLUMNS
    )]
    columns: Vec<String>,
}

impl Cli {
    pub fn run(&self) -> anyhow::Result<()> {
        match &self.command {
            Commands::Run(args) => {
                let runner = Runner::new(args.config());
                info!(
                    "running {:?} on '{}' with timeout {}s",
                    runner.config().tool,
                    args.folder.display(),
                    runner.config().timeout.as_secs()
                );
                runner
                    .run(&args.folder, std::io::stdout().lock())
                    .with_context(|| format!("benchmark of '{}' failed", args.folder.display()))?;
            }
            Commands::Aggregate(args) => {
                let config = MergeConfig {
                    key: args.key.clone(),
                    columns: args.columns.clone(),
                };
                let tables = match load_tables(&args.files, &config.key) {
                    Err(MergeError::Unreadable(paths)) => {
                        for path in &paths {
                            eprintln!("Cannot open the file {}", path.display());
                        }
                        return Err(MergeError::Unreadable(paths))
                            .context("failed to load result files");
                    }
                    result => result.context("failed to load result files")?,
                };
                Merged::merge(&tables, &config)
                    .write(std::io::stdout().lock())
                    .context("failed to write merged table")?;
            }
            Commands::Convert { gff } => {
                let aut = BaAutomaton::load(gff)
                    .with_context(|| format!("failed to convert '{}'", gff.display()))?;
                let mut out = std::io::stdout().lock();
                write!(out, "{aut}")?;
                out.flush()?;
            }
        }
        Ok(())
    }
}
