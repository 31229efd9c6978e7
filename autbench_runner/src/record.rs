use crate::ToolKind;
use std::fmt;

/// Token written in place of a metric the tool did not produce in time.
pub const TIMEOUT_SENTINEL: &str = "TO";

/// A single metric value extracted from tool output.
#[derive(Debug, Clone, PartialEq)]
pub enum Metric {
    /// A count, e.g. the number of states.
    Count(usize),
    /// A duration in seconds, already rounded.
    Seconds(f64),
    /// A verbatim word, e.g. a check result.
    Word(String),
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Metric::Count(n) => write!(f, "{n}"),
            Metric::Seconds(secs) => write!(f, "{secs:.2}"),
            Metric::Word(word) => f.write_str(word),
        }
    }
}

/// Metrics of one tool run on one input file.
///
/// A metric is `None` when the run timed out.
#[derive(Debug, Clone, PartialEq)]
pub struct BenchmarkRecord {
    key: String,
    metrics: Vec<(&'static str, Option<Metric>)>,
}

impl BenchmarkRecord {
    /// Builds a record from `(column, value)` pairs, in column order.
    pub fn new<I>(key: String, metrics: I) -> Self
    where
        I: IntoIterator<Item = (&'static str, Option<Metric>)>,
    {
        Self {
            key,
            metrics: metrics.into_iter().collect(),
        }
    }

    /// The record of a run that hit the timeout: every metric is missing.
    pub fn timed_out(key: String, tool: ToolKind) -> Self {
        Self::new(key, tool.columns().into_iter().map(|column| (column, None)))
    }

    /// Identifier of the input file.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Names of the metric columns.
    pub fn columns(&self) -> Vec<&'static str> {
        self.metrics.iter().map(|(column, _)| *column).collect()
    }

    /// Looks up a metric by column name.
    pub fn get(&self, column: &str) -> Option<&Metric> {
        self.metrics
            .iter()
            .find(|(name, _)| *name == column)
            .and_then(|(_, value)| value.as_ref())
    }

    /// Whether this record stands for a timed-out run.
    pub fn is_timeout(&self) -> bool {
        self.metrics.iter().all(|(_, value)| value.is_none())
    }

    /// Metric values as written in reports, with missing ones as [`TIMEOUT_SENTINEL`].
    pub fn rendered(&self) -> Vec<String> {
        self.metrics
            .iter()
            .map(|(_, value)| match value {
                Some(metric) => metric.to_string(),
                None => TIMEOUT_SENTINEL.to_string(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_renders_sentinel() {
        let record = BenchmarkRecord::timed_out("a.ba".to_string(), ToolKind::Rank);
        assert!(record.is_timeout());
        assert_eq!(record.rendered(), vec!["TO", "TO", "TO"]);
        assert_eq!(record.get("rnk"), None);
    }

    #[test]
    fn seconds_keep_two_decimals() {
        assert_eq!(Metric::Seconds(3.0).to_string(), "3.00");
        assert_eq!(Metric::Seconds(0.5).to_string(), "0.50");
    }
}
