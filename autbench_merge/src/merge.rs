use crate::{MergeError, ResultTable};
use log::{debug, warn};
use std::collections::HashMap;
use std::io::Write;

/// Which columns are merged, and on which key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeConfig {
    /// Column correlating rows across tables.
    pub key: String,
    /// Columns copied from each table, in this order, when present.
    pub columns: Vec<String>,
}

impl MergeConfig {
    /// Key column of every result file.
    pub const DEFAULT_KEY: &str = "aut";
    /// Columns merged by default: the rank-based state count, the
    /// Piterman-construction state count and the check result.
    pub const DEFAULT_COLUMNS: [&str; 3] = ["rnk", "piterman", "check"];
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            key: Self::DEFAULT_KEY.to_string(),
            columns: Self::DEFAULT_COLUMNS.map(String::from).to_vec(),
        }
    }
}

/// Values gathered for one key across all tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedRow {
    /// The key value.
    pub key: String,
    /// Selected values of every table containing the key, in table order.
    pub values: Vec<String>,
}

/// The merged comparison table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Merged {
    key: String,
    names: Vec<String>,
    rows: Vec<MergedRow>,
    // Position of each key in `rows`.
    index: HashMap<String, usize>,
}

impl Merged {
    const DELIMITER: u8 = b';';

    /// Merges `tables` under `config`.
    ///
    /// A column missing from a table, or from a short row, contributes
    /// nothing: rows of different keys may thus end up with different
    /// lengths. A key occurring twice appends twice.
    pub fn merge(tables: &[ResultTable], config: &MergeConfig) -> Self {
        let mut merged = Self {
            key: config.key.clone(),
            names: tables.iter().map(|t| t.name().to_string()).collect(),
            rows: Vec::new(),
            index: HashMap::new(),
        };
        for table in tables {
            let selected: Vec<usize> = config
                .columns
                .iter()
                .filter_map(|column| table.column(column))
                .collect();
            if selected.is_empty() {
                warn!(target: "merge", "table '{}' has none of the selected columns", table.name());
            }
            for (key, row) in table.rows() {
                let values = selected.iter().filter_map(|&idx| row.get(idx).cloned());
                merged.entry(key).extend(values);
            }
        }
        debug!(
            target: "merge",
            "merged {} key(s) from {} table(s)",
            merged.rows.len(),
            tables.len()
        );
        merged
    }

    fn entry(&mut self, key: &str) -> &mut Vec<String> {
        let idx = match self.index.get(key) {
            Some(&idx) => idx,
            None => {
                self.rows.push(MergedRow {
                    key: key.to_string(),
                    values: Vec::new(),
                });
                self.index.insert(key.to_string(), self.rows.len() - 1);
                self.rows.len() - 1
            }
        };
        &mut self.rows[idx].values
    }

    /// Merged rows, in the order their keys were first seen.
    pub fn rows(&self) -> &[MergedRow] {
        &self.rows
    }

    /// Looks up the merged values of `key`.
    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.index
            .get(key)
            .map(|&idx| self.rows[idx].values.as_slice())
    }

    /// Writes the table: the key column name followed by the tool names,
    /// then one line per key. Every line ends with a `;`.
    ///
    /// Values are copied verbatim unless they need CSV quoting: a value
    /// holding `;`, `"` or a line break is written quoted, e.g. `x"y` as
    /// `"x""y"`.
    pub fn write<W: Write>(&self, out: W) -> Result<(), MergeError> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(Self::DELIMITER)
            .flexible(true)
            .from_writer(out);
        // The trailing empty field yields the closing delimiter.
        writer.write_record(
            std::iter::once(self.key.as_str())
                .chain(self.names.iter().map(String::as_str))
                .chain(std::iter::once("")),
        )?;
        for row in &self.rows {
            writer.write_record(
                std::iter::once(row.key.as_str())
                    .chain(row.values.iter().map(String::as_str))
                    .chain(std::iter::once("")),
            )?;
        }
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(data: &str) -> ResultTable {
        ResultTable::from_reader(data.as_bytes(), "aut").unwrap()
    }

    fn render(merged: &Merged) -> String {
        let mut out = Vec::new();
        merged.write(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn two_tools() {
        let a = table("#toolA\naut;rnk;time\nf1.ba;3;0.5\n");
        let b = table("#toolB\naut;piterman;time\nf1.ba;TO;TO\n");
        let merged = Merged::merge(&[a, b], &MergeConfig::default());
        assert_eq!(render(&merged), "aut;toolA;toolB;\nf1.ba;3;TO;\n");
    }

    #[test]
    fn same_file_twice_duplicates_values() {
        let data = "#toolA\naut;rnk;check\nf1.ba;3;sat\nf2.ba;4;unsat\n";
        let merged = Merged::merge(&[table(data), table(data)], &MergeConfig::default());
        assert_eq!(merged.get("f1.ba").unwrap(), ["3", "sat", "3", "sat"]);
        assert_eq!(
            render(&merged),
            "aut;toolA;toolA;\nf1.ba;3;sat;3;sat;\nf2.ba;4;unsat;4;unsat;\n"
        );
    }

    #[test]
    fn missing_columns_are_omitted() {
        let a = table("#toolA\naut;rnk;check\nf1.ba;3;sat\nf2.ba;5\n");
        let b = table("#toolB\naut;time\nf1.ba;0.1\n");
        let merged = Merged::merge(&[a, b], &MergeConfig::default());
        assert_eq!(merged.get("f1.ba").unwrap(), ["3", "sat"]);
        assert_eq!(merged.get("f2.ba").unwrap(), ["5"]);
    }

    #[test]
    fn keys_keep_first_seen_order() {
        let a = table("#toolA\naut;rnk\nz.ba;1\nm.ba;2\n");
        let b = table("#toolB\naut;rnk\na.ba;3\nz.ba;4\n");
        let merged = Merged::merge(&[a, b], &MergeConfig::default());
        let keys: Vec<_> = merged.rows().iter().map(|row| row.key.as_str()).collect();
        assert_eq!(keys, ["z.ba", "m.ba", "a.ba"]);
        assert_eq!(merged.get("z.ba").unwrap(), ["1", "4"]);
    }

    #[test]
    fn special_values_are_quoted() {
        let a = table("#toolA\naut;rnk\nf1.ba;\"x\"\"y\"\n");
        let merged = Merged::merge(&[a], &MergeConfig::default());
        assert_eq!(merged.get("f1.ba").unwrap(), ["x\"y"]);
        assert_eq!(render(&merged), "aut;toolA;\nf1.ba;\"x\"\"y\";\n");
    }

    #[test]
    fn custom_columns() {
        let a = table("#ranker\naut;states;time;check\nf1.ba;3;0.5;true\n");
        let b = table("#old\naut;rnk;time;aux\nf1.ba;4;0.7;x\n");
        let config = MergeConfig {
            key: "aut".to_string(),
            columns: vec!["states".to_string(), "rnk".to_string(), "aux".to_string()],
        };
        let merged = Merged::merge(&[a, b], &config);
        assert_eq!(merged.get("f1.ba").unwrap(), ["3", "4", "x"]);
    }
}
