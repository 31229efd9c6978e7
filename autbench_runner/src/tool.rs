use crate::{BenchmarkRecord, Metric, RunnerError, parse};
use std::time::Duration;

/// Output convention shared by a group of tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    /// Metrics sit on labelled lines at the end of the output.
    TrailingLines,
    /// The whole output is an XML automaton document.
    XmlDocument,
}

/// The external tools the runner knows how to drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolKind {
    /// Rank-based complementation (`ranker`).
    Rank,
    /// Safra's construction, run through GOAL.
    Safra,
    /// Piterman's construction, run through GOAL.
    Piterman,
    /// Schewe's construction, run through GOAL.
    Schewe,
}

impl ToolKind {
    const RANK_TIMEOUT: Duration = Duration::from_secs(100);
    const CONSTRUCTION_TIMEOUT: Duration = Duration::from_secs(300);

    /// Output convention of the tool.
    pub fn family(self) -> Family {
        match self {
            ToolKind::Rank => Family::TrailingLines,
            ToolKind::Safra | ToolKind::Piterman | ToolKind::Schewe => Family::XmlDocument,
        }
    }

    /// File extension (without dot) of the inputs the tool accepts.
    pub fn extension(self) -> &'static str {
        match self.family() {
            Family::TrailingLines => "ba",
            Family::XmlDocument => "gff",
        }
    }

    /// Wall-clock limit applied to one invocation unless overridden.
    pub fn default_timeout(self) -> Duration {
        match self.family() {
            Family::TrailingLines => Self::RANK_TIMEOUT,
            Family::XmlDocument => Self::CONSTRUCTION_TIMEOUT,
        }
    }

    /// Arguments placed between the binary and the input file.
    pub fn subcommand_args(self) -> &'static [&'static str] {
        match self {
            ToolKind::Rank => &[],
            ToolKind::Safra => &["complement", "-m", "safra"],
            ToolKind::Piterman => &["complement", "-m", "piterman"],
            ToolKind::Schewe => &["complement", "-m", "rank", "-tr"],
        }
    }

    /// Name of the column holding the tool's main metric.
    ///
    /// Doubles as the tool's name in result files.
    pub fn metric_column(self) -> &'static str {
        match self {
            ToolKind::Rank => "rnk",
            ToolKind::Safra => "safra",
            ToolKind::Piterman => "piterman",
            ToolKind::Schewe => "schewe",
        }
    }

    /// Metric columns, in output order.
    pub fn columns(self) -> Vec<&'static str> {
        match self.family() {
            Family::TrailingLines => vec![self.metric_column(), "time", "check"],
            Family::XmlDocument => vec![self.metric_column(), "time"],
        }
    }

    /// Extracts the metrics of a completed run.
    ///
    /// `elapsed` is the measured run time, used by tools that do not report
    /// their own.
    pub fn parse(
        self,
        key: String,
        output: &str,
        elapsed: Duration,
    ) -> Result<BenchmarkRecord, RunnerError> {
        let columns = self.columns();
        let values = match self.family() {
            Family::TrailingLines => {
                let (states, check, time) = parse::parse_trailing_lines(output)?;
                vec![
                    Metric::Count(states),
                    Metric::Seconds(time),
                    Metric::Word(check),
                ]
            }
            Family::XmlDocument => {
                let states = parse::count_states(output)?;
                vec![
                    Metric::Count(states),
                    Metric::Seconds(parse::round2(elapsed.as_secs_f64())),
                ]
            }
        };
        Ok(BenchmarkRecord::new(
            key,
            columns.into_iter().zip(values.into_iter().map(Some)),
        ))
    }
}
