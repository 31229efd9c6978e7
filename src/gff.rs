//! Conversion of GOAL's GFF automata to the BA text format.

use log::{debug, info};
use quick_xml::Reader;
use quick_xml::events::Event;
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GffError {
    #[error("XML error")]
    Xml(#[from] quick_xml::Error),
    #[error("I/O error")]
    Io(#[from] std::io::Error),
    #[error("transition {0} lacks a `{1}` element")]
    IncompleteTransition(usize, &'static str),
}

const TAG_INITIAL_SET: &str = "initialStateSet";
const TAG_TRANSITION_SET: &str = "transitionSet";
const TAG_TRANSITION: &str = "transition";
const TAG_ACC: &str = "acc";
const TAG_STATE_ID: &str = "stateID";
const TAG_READ: &str = "read";
const TAG_FROM: &str = "from";
const TAG_TO: &str = "to";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub symbol: String,
    pub from: String,
    pub to: String,
}

#[derive(Debug, Default)]
struct PartialTransition {
    symbol: Option<String>,
    from: Option<String>,
    to: Option<String>,
}

impl PartialTransition {
    fn complete(self, idx: usize) -> Result<Transition, GffError> {
        Ok(Transition {
            symbol: self
                .symbol
                .ok_or(GffError::IncompleteTransition(idx, TAG_READ))?,
            from: self.from.ok_or(GffError::IncompleteTransition(idx, TAG_FROM))?,
            to: self.to.ok_or(GffError::IncompleteTransition(idx, TAG_TO))?,
        })
    }
}

/// A Büchi automaton as listed in BA files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BaAutomaton {
    pub initial: Vec<String>,
    pub transitions: Vec<Transition>,
    pub accepting: Vec<String>,
}

impl BaAutomaton {
    /// Reads the initial states, transitions and accepting states of a GFF
    /// document. Everything else in the document is ignored.
    pub fn from_gff<R: BufRead>(reader: R) -> Result<Self, GffError> {
        let mut reader = Reader::from_reader(reader);
        reader.config_mut().trim_text(true);

        let mut aut = BaAutomaton::default();
        let mut path: Vec<String> = Vec::new();
        let mut current: Option<PartialTransition> = None;
        let mut buf = Vec::new();
        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(tag) => {
                    let name = String::from_utf8_lossy(tag.name().as_ref()).into_owned();
                    if is_transition(&path, &name) {
                        current = Some(PartialTransition::default());
                    }
                    path.push(name);
                }
                Event::Empty(tag) => {
                    let name = String::from_utf8_lossy(tag.name().as_ref()).into_owned();
                    if is_transition(&path, &name) {
                        PartialTransition::default().complete(aut.transitions.len())?;
                    }
                }
                Event::End(_) => {
                    path.pop();
                    if path.len() == 2 && path[1] == TAG_TRANSITION_SET {
                        if let Some(partial) = current.take() {
                            let transition = partial.complete(aut.transitions.len())?;
                            aut.transitions.push(transition);
                        }
                    }
                }
                Event::Text(text) => {
                    let text = text.unescape()?.into_owned();
                    aut.text(&path, text, current.as_mut());
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }
        debug!(
            target: "gff",
            "{} initial, {} transition(s), {} accepting",
            aut.initial.len(),
            aut.transitions.len(),
            aut.accepting.len()
        );
        Ok(aut)
    }

    /// Reads the GFF file at `path`.
    pub fn load(path: &Path) -> Result<Self, GffError> {
        info!(target: "gff", "parsing GFF file '{}'", path.display());
        let file = File::open(path)?;
        Self::from_gff(BufReader::new(file))
    }

    fn text(&mut self, path: &[String], text: String, current: Option<&mut PartialTransition>) {
        let Some((last, parents)) = path.split_last() else {
            return;
        };
        match (parents.get(1).map(String::as_str), last.as_str()) {
            (Some(TAG_INITIAL_SET), TAG_STATE_ID) if parents.len() == 2 => self.initial.push(text),
            (Some(TAG_ACC), TAG_STATE_ID) if parents.len() == 2 => self.accepting.push(text),
            (Some(TAG_TRANSITION_SET), field) if parents.len() == 3 => {
                if let Some(current) = current {
                    match field {
                        TAG_READ => current.symbol = Some(text),
                        TAG_FROM => current.from = Some(text),
                        TAG_TO => current.to = Some(text),
                        _ => {}
                    }
                }
            }
            _ => {}
        }
    }
}

fn is_transition(path: &[String], name: &str) -> bool {
    path.len() == 2 && path[1] == TAG_TRANSITION_SET && name == TAG_TRANSITION
}

fn state(id: &str) -> String {
    format!("[{id}]")
}

impl fmt::Display for BaAutomaton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for id in &self.initial {
            writeln!(f, "{}", state(id))?;
        }
        for tr in &self.transitions {
            writeln!(f, "a{},{}->{}", tr.symbol, state(&tr.from), state(&tr.to))?;
        }
        for id in &self.accepting {
            writeln!(f, "{}", state(id))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GFF: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="no"?>
<structure label-on="transition" type="fa">
  <alphabet type="classical"><symbol>0</symbol><symbol>1</symbol></alphabet>
  <stateSet><state sid="0"/><state sid="1"/></stateSet>
  <initialStateSet><stateID>0</stateID></initialStateSet>
  <transitionSet complete="false">
    <transition tid="0"><from>0</from><to>1</to><read>0</read></transition>
    <transition tid="1"><from>1</from><to>1</to><read>1</read></transition>
  </transitionSet>
  <acc type="buchi"><stateID>1</stateID></acc>
</structure>
"#;

    #[test]
    fn converts_to_ba() {
        let aut = BaAutomaton::from_gff(GFF.as_bytes()).unwrap();
        assert_eq!(aut.initial, ["0"]);
        assert_eq!(aut.accepting, ["1"]);
        assert_eq!(aut.to_string(), "[0]\na0,[0]->[1]\na1,[1]->[1]\n[1]\n");
    }

    #[test]
    fn incomplete_transition() {
        let gff = "<s><transitionSet>\
                   <transition><from>0</from><read>a</read></transition>\
                   </transitionSet></s>";
        let err = BaAutomaton::from_gff(gff.as_bytes()).unwrap_err();
        assert!(matches!(err, GffError::IncompleteTransition(0, "to")));
    }
}
