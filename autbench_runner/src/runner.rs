use crate::{
    BenchmarkRecord, Outcome, OutputFormat, Report, RunnerError, ToolKind, execute, select_files,
};
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, trace};
use std::ffi::OsString;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Settings of one benchmark batch.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Tool binary to invoke.
    pub binary: PathBuf,
    /// Which tool the binary is, deciding arguments and output parsing.
    pub tool: ToolKind,
    /// Per-file wall-clock limit.
    pub timeout: Duration,
    /// Maximum number of input files to process.
    pub limit: usize,
    /// Report layout.
    pub format: OutputFormat,
    /// Name written as the first comment line, if any.
    pub name: Option<String>,
    /// Extra arguments appended after the input file.
    pub extra_args: Vec<String>,
}

impl RunConfig {
    /// Default settings for `tool` run through `binary`.
    pub fn new(binary: PathBuf, tool: ToolKind) -> Self {
        Self {
            binary,
            tool,
            timeout: tool.default_timeout(),
            limit: usize::MAX,
            format: OutputFormat::default(),
            name: None,
            extra_args: Vec::new(),
        }
    }
}

/// Runs a tool over a folder of automata, one file at a time.
#[derive(Debug, Clone)]
pub struct Runner {
    config: RunConfig,
}

impl Runner {
    const KEY_COLUMN: &str = "aut";

    /// Creates a runner.
    pub fn new(config: RunConfig) -> Self {
        Self { config }
    }

    /// The settings this runner was created with.
    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Command line for `file`: binary, tool sub-command, file, extra arguments.
    pub fn command_line(&self, file: &Path) -> Vec<OsString> {
        std::iter::once(self.config.binary.clone().into_os_string())
            .chain(self.config.tool.subcommand_args().iter().map(OsString::from))
            .chain(std::iter::once(file.as_os_str().to_owned()))
            .chain(self.config.extra_args.iter().map(OsString::from))
            .collect()
    }

    /// Benchmarks a single file.
    ///
    /// A timeout yields a record with every metric missing; any other
    /// failure is returned as an error.
    pub fn run_file(&self, file: &Path) -> Result<BenchmarkRecord, RunnerError> {
        let key = file
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| file.display().to_string());
        let argv = self.command_line(file);
        match execute(&argv, self.config.timeout)? {
            Outcome::Completed { output, elapsed } => {
                trace!(target: "runner", "output of '{key}':\n{output}");
                self.config.tool.parse(key, &output, elapsed)
            }
            Outcome::TimedOut => {
                info!(target: "runner", "'{key}' timed out");
                Ok(BenchmarkRecord::timed_out(key, self.config.tool))
            }
        }
    }

    /// Benchmarks every selected file of `dir`, streaming the report to `out`.
    ///
    /// The report opens with the optional name line, the timeout and the
    /// number of files as comments, and the column header.
    pub fn run<W: Write>(&self, dir: &Path, out: W) -> Result<(), RunnerError> {
        let files = select_files(dir, self.config.tool, self.config.limit)?;
        let mut report = Report::new(self.config.format, out);

        if let Some(name) = &self.config.name {
            report.comment(name)?;
        }
        report.comment(&format!("Timeout: {}", self.config.timeout.as_secs()))?;
        report.comment(&format!("Number of files: {}", files.len()))?;
        report.row(std::iter::once(Self::KEY_COLUMN).chain(self.config.tool.columns()))?;
        report.flush()?;

        let style = ProgressStyle::with_template("[{elapsed_precise}] {pos}/{len} {wide_bar} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        let bar = ProgressBar::new(files.len() as u64).with_style(style);
        let mut timeouts = 0;
        for file in &files {
            if let Some(name) = file.file_name() {
                bar.set_message(name.to_string_lossy().into_owned());
            }
            let record = self.run_file(file)?;
            if record.is_timeout() {
                timeouts += 1;
            }
            report.record(&record)?;
            // Keep finished rows visible while long batches run.
            report.flush()?;
            bar.inc(1);
        }
        bar.finish_and_clear();
        info!(target: "runner", "processed {} file(s), {timeouts} timeout(s)", files.len());
        Ok(())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::fs;

    // Each automaton file is itself a shell script, so running `/bin/sh`
    // as the tool makes it print whatever output the test needs.
    const DONE: &str = "echo 'Generated states: 10'\n\
                        echo 'States: 3'\n\
                        echo 'Check: true'\n\
                        echo 'Time: 0.10'\n";
    const SLOW: &str = "sleep 5\n";
    const GARBAGE: &str = "echo 'Segmentation fault'\n";

    fn runner(timeout: Duration) -> Runner {
        let mut config = RunConfig::new(PathBuf::from("/bin/sh"), ToolKind::Rank);
        config.timeout = timeout;
        config.name = Some("ranker".to_string());
        Runner::new(config)
    }

    fn run(runner: &Runner, dir: &Path) -> Result<String, RunnerError> {
        let mut out = Vec::new();
        runner.run(dir, &mut out)?;
        Ok(String::from_utf8(out).unwrap())
    }

    #[test]
    fn command_line_layout() {
        let mut config = RunConfig::new(PathBuf::from("goal"), ToolKind::Safra);
        config.extra_args = vec!["-o".to_string(), "out.gff".to_string()];
        let argv = Runner::new(config).command_line(Path::new("dir/a.gff"));
        assert_eq!(
            argv,
            ["goal", "complement", "-m", "safra", "dir/a.gff", "-o", "out.gff"]
                .map(OsString::from)
                .to_vec()
        );
    }

    #[test]
    fn timeout_does_not_abort_batch() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.ba"), DONE).unwrap();
        fs::write(dir.path().join("b-slow.ba"), SLOW).unwrap();
        fs::write(dir.path().join("c.ba"), DONE).unwrap();

        let output = run(&runner(Duration::from_millis(300)), dir.path()).unwrap();
        assert_eq!(
            output,
            "#ranker\n#Timeout: 0\n#Number of files: 3\naut;rnk;time;check\n\
             a.ba;3;0.10;true\nb-slow.ba;TO;TO;TO\nc.ba;3;0.10;true\n"
        );
    }

    #[test]
    fn respects_file_limit() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["c.ba", "a.ba", "b.ba"] {
            fs::write(dir.path().join(name), DONE).unwrap();
        }
        let mut runner = runner(Duration::from_secs(10));
        runner.config.limit = 2;
        runner.config.name = None;
        let output = run(&runner, dir.path()).unwrap();
        assert_eq!(
            output,
            "#Timeout: 10\n#Number of files: 2\naut;rnk;time;check\n\
             a.ba;3;0.10;true\nb.ba;3;0.10;true\n"
        );
    }

    #[test]
    fn unexpected_output_aborts_batch() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.ba"), DONE).unwrap();
        fs::write(dir.path().join("b.ba"), GARBAGE).unwrap();
        let result = run(&runner(Duration::from_secs(10)), dir.path());
        assert!(matches!(result, Err(RunnerError::ParseMismatch(_))));
    }
}
