use crate::{BenchmarkRecord, RunnerError};
use std::io::Write;

/// Layout of the produced report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// `;`-separated rows, `#` comments.
    #[default]
    Csv,
    /// LaTeX table rows, `%` comments.
    Tex,
}

enum Sink<W: Write> {
    Csv(csv::Writer<W>),
    Tex(W),
}

/// Streams a benchmark report to a writer.
pub struct Report<W: Write> {
    sink: Sink<W>,
}

impl<W: Write> Report<W> {
    const DELIMITER: u8 = b';';
    const TEX_SEPARATOR: &str = " & ";
    const TEX_END: &str = " \\\\";

    /// Creates a report in the given format.
    pub fn new(format: OutputFormat, out: W) -> Self {
        let sink = match format {
            OutputFormat::Csv => Sink::Csv(
                csv::WriterBuilder::new()
                    .delimiter(Self::DELIMITER)
                    .flexible(true)
                    .from_writer(out),
            ),
            OutputFormat::Tex => Sink::Tex(out),
        };
        Self { sink }
    }

    /// Writes a comment line.
    pub fn comment(&mut self, text: &str) -> Result<(), RunnerError> {
        match &mut self.sink {
            Sink::Csv(writer) => writer.write_record([format!("#{text}")])?,
            Sink::Tex(out) => writeln!(out, "%{text}")?,
        }
        Ok(())
    }

    /// Writes a row of plain cells.
    pub fn row<I, S>(&mut self, cells: I) -> Result<(), RunnerError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        match &mut self.sink {
            Sink::Csv(writer) => {
                writer.write_record(cells.into_iter().map(|c| c.as_ref().to_owned()))?
            }
            Sink::Tex(out) => {
                let cells: Vec<String> =
                    cells.into_iter().map(|c| c.as_ref().to_owned()).collect();
                writeln!(out, "{}{}", cells.join(Self::TEX_SEPARATOR), Self::TEX_END)?;
            }
        }
        Ok(())
    }

    /// Writes the row of one record: its key, then its rendered metrics.
    pub fn record(&mut self, record: &BenchmarkRecord) -> Result<(), RunnerError> {
        self.row(std::iter::once(record.key().to_string()).chain(record.rendered()))
    }

    /// Flushes buffered rows to the underlying writer.
    pub fn flush(&mut self) -> Result<(), RunnerError> {
        match &mut self.sink {
            Sink::Csv(writer) => writer.flush()?,
            Sink::Tex(out) => out.flush()?,
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Metric, ToolKind};

    fn records() -> Vec<BenchmarkRecord> {
        vec![
            BenchmarkRecord::new(
                "a.ba".to_string(),
                [
                    ("rnk", Some(Metric::Count(12))),
                    ("time", Some(Metric::Seconds(0.4))),
                    ("check", Some(Metric::Word("sat".to_string()))),
                ],
            ),
            BenchmarkRecord::timed_out("b.ba".to_string(), ToolKind::Rank),
        ]
    }

    fn write(format: OutputFormat) -> String {
        let mut buf = Vec::new();
        {
            let mut report = Report::new(format, &mut buf);
            report.comment("Timeout: 100").unwrap();
            report.row(["aut", "rnk", "time", "check"]).unwrap();
            for record in records() {
                report.record(&record).unwrap();
            }
            report.flush().unwrap();
        }
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn csv_rows() {
        assert_eq!(
            write(OutputFormat::Csv),
            "#Timeout: 100\naut;rnk;time;check\na.ba;12;0.40;sat\nb.ba;TO;TO;TO\n"
        );
    }

    #[test]
    fn comments_between_rows() {
        let mut buf = Vec::new();
        {
            let mut report = Report::new(OutputFormat::Csv, &mut buf);
            report.comment("ranker").unwrap();
            report.row(["aut", "rnk"]).unwrap();
            report.comment("Number of files: 1").unwrap();
            report.row(["a.ba", "3"]).unwrap();
            report.flush().unwrap();
        }
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "#ranker\naut;rnk\n#Number of files: 1\na.ba;3\n"
        );
    }

    #[test]
    fn tex_rows() {
        assert_eq!(
            write(OutputFormat::Tex),
            "%Timeout: 100\n\
             aut & rnk & time & check \\\\\n\
             a.ba & 12 & 0.40 & sat \\\\\n\
             b.ba & TO & TO & TO \\\\\n"
        );
    }
}
