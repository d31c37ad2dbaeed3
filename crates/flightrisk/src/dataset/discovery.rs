//! Locating the input tables by file name convention.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Find the table in `dir` whose file name starts with `prefix` and ends
/// with `suffix`.
///
/// When several files match, the lexicographically first one wins so the
/// choice does not depend on directory iteration order.
///
/// # Errors
///
/// Returns [`Error::DataFileNotFound`] if the directory is missing or holds
/// no matching file, and [`Error::Io`] for other directory read failures.
pub fn find_table(dir: &Path, prefix: &str, suffix: &str) -> Result<PathBuf> {
    let not_found = || Error::DataFileNotFound {
        dir: dir.to_path_buf(),
        prefix: prefix.to_string(),
        suffix: suffix.to_string(),
    };

    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Err(not_found()),
        Err(e) => return Err(e.into()),
    };

    let mut matches = Vec::new();
    for entry in entries {
        let entry = entry?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if name.starts_with(prefix) && name.ends_with(suffix) && entry.path().is_file() {
            matches.push(entry.path());
        }
    }
    matches.sort();

    if matches.len() > 1 {
        warn!(
            "{} files match '{}*{}', using {}",
            matches.len(),
            prefix,
            suffix,
            matches[0].display()
        );
    }

    let path = matches.into_iter().next().ok_or_else(not_found)?;
    debug!("Found '{}*{}' at {}", prefix, suffix, path.display());
    Ok(path)
}
