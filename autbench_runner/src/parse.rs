//! Interpreters for the two tool output conventions.

use crate::RunnerError;
use log::trace;
use quick_xml::Reader;
use quick_xml::events::Event;
use regex::Regex;
use std::sync::LazyLock;

const STATES_LINE: usize = 3;
const CHECK_LINE: usize = 2;
const TIME_LINE: usize = 1;

static STATES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"States: ([0-9]+)").expect("valid regex"));
static CHECK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Check: ([a-zA-Z]+)").expect("valid regex"));
static TIME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Time: ([0-9]+\.[0-9]+)").expect("valid regex"));

const TAG_STATESET: &[u8] = b"stateset";
const TAG_STATE: &[u8] = b"state";

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Reads `(states, check, time)` from the last non-empty lines of `output`.
///
/// The states count is three lines from the end, the check result two, and
/// the time (in seconds, rounded to two decimals) is the last line.
pub fn parse_trailing_lines(output: &str) -> Result<(usize, String, f64), RunnerError> {
    let lines: Vec<&str> = output.lines().filter(|line| !line.is_empty()).collect();

    let states = capture(&lines, STATES_LINE, &STATES)?;
    let states = states
        .parse()
        .map_err(|_| RunnerError::ParseMismatch(format!("state count '{states}'")))?;
    let check = capture(&lines, CHECK_LINE, &CHECK)?.to_string();
    let time = capture(&lines, TIME_LINE, &TIME)?;
    let time: f64 = time
        .parse()
        .map_err(|_| RunnerError::ParseMismatch(format!("time '{time}'")))?;

    Ok((states, check, round2(time)))
}

fn capture<'a>(
    lines: &[&'a str],
    from_end: usize,
    pattern: &Regex,
) -> Result<&'a str, RunnerError> {
    let line = lines
        .len()
        .checked_sub(from_end)
        .map(|idx| lines[idx])
        .ok_or_else(|| {
            RunnerError::ParseMismatch(format!(
                "expected at least {from_end} non-empty lines, found {}",
                lines.len()
            ))
        })?;
    pattern
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .ok_or_else(|| {
            RunnerError::ParseMismatch(format!(
                "line '{line}' does not match '{}'",
                pattern.as_str()
            ))
        })
}

/// Counts the `stateset/state` elements below the root of an XML automaton.
///
/// Tag names are matched case-insensitively: the whole document is
/// lower-cased before parsing, since tool versions disagree on casing.
pub fn count_states(output: &str) -> Result<usize, RunnerError> {
    let normalized = output.to_lowercase();
    let mut reader = Reader::from_str(&normalized);
    reader.config_mut().trim_text(true);

    // Names of the currently open elements, root first.
    let mut path: Vec<Vec<u8>> = Vec::new();
    let mut seen_root = false;
    let mut count = 0;
    loop {
        match reader.read_event()? {
            Event::Start(tag) => {
                if path.is_empty() && seen_root {
                    return Err(RunnerError::XmlStructure("multiple root elements".into()));
                }
                seen_root = true;
                let name = tag.name().as_ref().to_vec();
                if is_state(&path, &name) {
                    count += 1;
                }
                path.push(name);
            }
            Event::Empty(tag) => {
                if path.is_empty() && seen_root {
                    return Err(RunnerError::XmlStructure("multiple root elements".into()));
                }
                seen_root = true;
                if is_state(&path, tag.name().as_ref()) {
                    count += 1;
                }
            }
            Event::End(_) => {
                path.pop();
            }
            Event::Text(text) if path.is_empty() => {
                if !text.iter().all(u8::is_ascii_whitespace) {
                    return Err(RunnerError::XmlStructure(
                        "text outside the root element".into(),
                    ));
                }
            }
            Event::CData(_) if path.is_empty() => {
                return Err(RunnerError::XmlStructure(
                    "CDATA outside the root element".into(),
                ));
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !path.is_empty() {
        return Err(RunnerError::XmlStructure(format!(
            "{} unclosed element(s)",
            path.len()
        )));
    }
    if !seen_root {
        return Err(RunnerError::XmlStructure("no root element".into()));
    }
    trace!(target: "runner", "counted {count} states");
    Ok(count)
}

fn is_state(path: &[Vec<u8>], name: &[u8]) -> bool {
    path.len() == 2 && path[1] == TAG_STATESET && name == TAG_STATE
}
