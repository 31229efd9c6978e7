use crate::{RunnerError, ToolKind};
use log::{debug, info};
use std::path::{Path, PathBuf};

/// Lists the input files of `tool` in `dir`.
///
/// Only regular files whose name ends in the tool's extension are kept. They
/// are sorted by name and at most `limit` of them are returned.
pub fn select_files(dir: &Path, tool: ToolKind, limit: usize) -> Result<Vec<PathBuf>, RunnerError> {
    let read_dir_err = |source| RunnerError::ReadDir {
        path: dir.to_path_buf(),
        source,
    };
    let suffix = format!(".{}", tool.extension());

    let mut names = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(read_dir_err)? {
        let entry = entry.map_err(read_dir_err)?;
        let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
            debug!(target: "runner", "skipping non UTF-8 file name {:?}", entry.file_name());
            continue;
        };
        if name.ends_with(&suffix) && entry.path().is_file() {
            names.push(name);
        }
    }
    names.sort();
    names.truncate(limit);
    info!(target: "runner", "selected {} '{suffix}' file(s) in '{}'", names.len(), dir.display());

    Ok(names.into_iter().map(|name| dir.join(name)).collect())
}
