use crate::MergeError;
use log::{debug, error, info};
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

/// One tool's results, as read from a result file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultTable {
    name: String,
    header: Vec<String>,
    rows: Vec<Vec<String>>,
    key_idx: usize,
}

impl ResultTable {
    const DELIMITER: u8 = b';';
    const COMMENT: u8 = b'#';

    /// Reads a result table.
    ///
    /// The first line is the tool's display name (a leading `#` is
    /// dropped). The remainder is a `;`-separated table with a header row;
    /// lines starting with `#` are skipped. `key` must be one of the header
    /// columns.
    pub fn from_reader<R: Read>(reader: R, key: &str) -> Result<Self, MergeError> {
        let mut reader = BufReader::new(reader);
        let mut first = String::new();
        reader.read_line(&mut first)?;
        let first = first.trim();
        let name = first.strip_prefix('#').unwrap_or(first).to_string();

        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(Self::DELIMITER)
            .comment(Some(Self::COMMENT))
            .flexible(true)
            .has_headers(true)
            .from_reader(reader);

        let header: Vec<String> = csv_reader.headers()?.iter().map(str::to_string).collect();
        if header.is_empty() {
            return Err(MergeError::MissingHeader(name));
        }
        let key_idx = header
            .iter()
            .position(|column| column == key)
            .ok_or_else(|| MergeError::MissingKeyColumn {
                table: name.clone(),
                key: key.to_string(),
            })?;

        let mut rows = Vec::new();
        for record in csv_reader.records() {
            let record = record?;
            if record.get(key_idx).is_none() {
                return Err(MergeError::MissingKey {
                    table: name,
                    line: record.position().map_or(0, |pos| pos.line()),
                });
            }
            rows.push(record.iter().map(str::to_string).collect());
        }
        debug!(
            target: "merge",
            "table '{name}': {} column(s), {} row(s)",
            header.len(),
            rows.len()
        );

        Ok(Self {
            name,
            header,
            rows,
            key_idx,
        })
    }

    /// Opens and reads the result file at `path`.
    pub fn open(path: &Path, key: &str) -> Result<Self, MergeError> {
        let file = File::open(path).map_err(|source| MergeError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        info!(target: "merge", "reading '{}'", path.display());
        Self::from_reader(file, key)
    }

    /// Display name of the tool that produced the table.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Column names.
    pub fn header(&self) -> &[String] {
        &self.header
    }

    /// Index of `column` in the header, if present.
    pub fn column(&self, column: &str) -> Option<usize> {
        self.header.iter().position(|name| name == column)
    }

    /// Iterates over `(key, row)` pairs in file order.
    pub fn rows(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.rows
            .iter()
            .map(|row| (row[self.key_idx].as_str(), row.as_slice()))
    }
}

/// Reads every result file in `paths`.
///
/// All paths are attempted; if any cannot be opened, nothing is returned
/// and [`MergeError::Unreadable`] lists every such path.
pub fn load_tables(paths: &[PathBuf], key: &str) -> Result<Vec<ResultTable>, MergeError> {
    let mut tables = Vec::with_capacity(paths.len());
    let mut unreadable = Vec::new();
    for path in paths {
        match ResultTable::open(path, key) {
            Ok(table) => tables.push(table),
            Err(err @ MergeError::Open { .. }) => {
                error!(target: "merge", "{err}");
                unreadable.push(path.clone());
            }
            Err(err) => return Err(err),
        }
    }
    if !unreadable.is_empty() {
        return Err(MergeError::Unreadable(unreadable));
    }
    Ok(tables)
}
