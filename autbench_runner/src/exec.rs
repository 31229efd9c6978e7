use crate::RunnerError;
use log::{debug, warn};
use std::ffi::OsStr;
use std::io::Read;
use std::process::{Command, Stdio};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// How a single tool invocation ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The tool exited successfully within the deadline.
    Completed {
        /// Interleaved stdout and stderr.
        output: String,
        /// Wall-clock run time.
        elapsed: Duration,
    },
    /// The tool was killed at the deadline.
    TimedOut,
}

/// Runs `argv[0]` with the remaining arguments, blocking until it exits or
/// `timeout` elapses.
///
/// Stdout and stderr share one pipe so their lines keep the order the tool
/// wrote them in. A timed-out process is killed and reaped; its output is
/// discarded. A non-zero exit status is an error.
pub fn execute<S: AsRef<OsStr>>(argv: &[S], timeout: Duration) -> Result<Outcome, RunnerError> {
    let (binary, args) = argv.split_first().ok_or_else(|| RunnerError::Spawn {
        binary: String::new(),
        source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty command line"),
    })?;
    let binary_name = binary.as_ref().to_string_lossy().into_owned();
    let spawn_err = |source| RunnerError::Spawn {
        binary: binary_name.clone(),
        source,
    };

    let (mut reader, writer) = std::io::pipe().map_err(spawn_err)?;
    let start = Instant::now();
    let mut child = {
        // The command owns the write ends of the pipe and must be dropped
        // once the child holds its copies, or the reader never sees EOF.
        let mut command = Command::new(binary);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(writer.try_clone().map_err(spawn_err)?)
            .stderr(writer);
        debug!(target: "runner", "spawning {command:?}");
        command.spawn().map_err(spawn_err)?
    };

    let (sender, collected) = mpsc::channel();
    thread::spawn(move || {
        let mut buf = Vec::new();
        // The receiver is gone once the deadline passed.
        let _ = sender.send(reader.read_to_end(&mut buf).map(|_| buf));
    });

    let status = loop {
        if let Some(status) = child.try_wait().map_err(spawn_err)? {
            break status;
        }
        if start.elapsed() >= timeout {
            warn!(target: "runner", "'{binary_name}' killed after {}s", timeout.as_secs_f64());
            if let Err(err) = child.kill() {
                warn!(target: "runner", "failed to kill '{binary_name}': {err}");
            }
            child.wait().map_err(spawn_err)?;
            return Ok(Outcome::TimedOut);
        }
        thread::sleep(POLL_INTERVAL);
    };

    // Descendants of the tool may keep the pipe open after it exits; the
    // deadline covers them too.
    let output = match collected.recv_timeout(timeout.saturating_sub(start.elapsed())) {
        Ok(result) => result.map_err(spawn_err)?,
        Err(RecvTimeoutError::Timeout) => {
            warn!(
                target: "runner",
                "output of '{binary_name}' still open after {}s",
                timeout.as_secs_f64()
            );
            return Ok(Outcome::TimedOut);
        }
        Err(RecvTimeoutError::Disconnected) => {
            return Err(spawn_err(std::io::Error::other("output collector panicked")));
        }
    };
    let elapsed = start.elapsed();
    let output = String::from_utf8_lossy(&output).into_owned();

    if !status.success() {
        return Err(RunnerError::ToolFailed {
            binary: binary_name,
            status,
            output,
        });
    }
    Ok(Outcome::Completed { output, elapsed })
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn captures_both_streams_in_order() {
        let outcome = execute(
            &["/bin/sh", "-c", "echo one; echo two >&2; echo three"],
            Duration::from_secs(10),
        )
        .unwrap();
        match outcome {
            Outcome::Completed { output, .. } => assert_eq!(output, "one\ntwo\nthree\n"),
            Outcome::TimedOut => panic!("unexpected timeout"),
        }
    }

    #[test]
    fn kills_at_deadline() {
        let start = Instant::now();
        let outcome = execute(&["/bin/sh", "-c", "sleep 5"], Duration::from_millis(200)).unwrap();
        assert_eq!(outcome, Outcome::TimedOut);
        assert!(start.elapsed() < Duration::from_secs(4));
    }

    #[test]
    fn deadline_covers_background_descendants() {
        let start = Instant::now();
        let outcome = execute(
            &["/bin/sh", "-c", "sleep 4 & echo hi"],
            Duration::from_millis(500),
        )
        .unwrap();
        assert_eq!(outcome, Outcome::TimedOut);
        assert!(start.elapsed() < Duration::from_secs(3));
    }

    #[test]
    fn failure_status_is_error() {
        let result = execute(&["/bin/sh", "-c", "echo boom; exit 3"], Duration::from_secs(10));
        match result {
            Err(RunnerError::ToolFailed { output, .. }) => assert_eq!(output, "boom\n"),
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[test]
    fn missing_binary_is_error() {
        let result = execute(&["/nonexistent/tool"], Duration::from_secs(1));
        assert!(matches!(result, Err(RunnerError::Spawn { .. })));
    }
}
