//! Small filesystem helpers shared by package handlers.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Name of the per-directory dependency list file.
pub const DEPENDENCY_FILE: &str = "dependency";

/// Read the newline-delimited package list from `<dir>/dependency`.
///
/// Blank lines and surrounding whitespace are discarded.
///
/// # Errors
///
/// A missing or unreadable file is a [`ConfigError`]: the dependency list is
/// part of the package definition, so its absence is fatal at the binary
/// boundary (unlike [`file2set`], where absence means empty).
pub fn get_dependencies(dir: &Path) -> Result<Vec<String>, ConfigError> {
    let path = dir.join(DEPENDENCY_FILE);
    let contents = std::fs::read_to_string(&path)
        .map_err(|_| ConfigError::MissingDependencyFile(path.clone()))?;
    Ok(contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(ToString::to_string)
        .collect())
}

/// The set of non-blank trimmed lines in `path`, or the empty set when the
/// file does not exist.
#[must_use]
pub fn file2set(path: &Path) -> HashSet<String> {
    std::fs::read_to_string(path).map_or_else(
        |_| HashSet::new(),
        |contents| {
            contents
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(ToString::to_string)
                .collect()
        },
    )
}

/// Whether the origin user may write `path`.
///
/// True iff the origin user owns the file (and the owner write bit is set)
/// or the process belongs to the file's group (and the group write bit is
/// set). A missing file is not writable.
#[cfg(unix)]
#[must_use]
pub fn user_has_write_permission(path: &Path, origin_uid: u32) -> bool {
    use std::os::unix::fs::MetadataExt as _;

    let Ok(meta) = std::fs::metadata(path) else {
        return false;
    };
    if meta.uid() == origin_uid && meta.mode() & 0o200 != 0 {
        return true;
    }
    let in_group = nix::unistd::getgroups()
        .is_ok_and(|groups| groups.iter().any(|g| g.as_raw() == meta.gid()));
    in_group && meta.mode() & 0o020 != 0
}

/// Fallback write check where Unix ownership semantics do not apply.
#[cfg(not(unix))]
#[must_use]
pub fn user_has_write_permission(path: &Path, _origin_uid: u32) -> bool {
    std::fs::metadata(path).is_ok_and(|meta| !meta.permissions().readonly())
}

/// Expand a leading `~` against `home`.
///
/// Only the bare `~` and the `~/...` forms are expanded; `~other` is left
/// untouched.
#[must_use]
pub fn expanduser(path: &str, home: &Path) -> PathBuf {
    if path == "~" {
        home.to_path_buf()
    } else if let Some(rest) = path.strip_prefix("~/") {
        home.join(rest)
    } else {
        PathBuf::from(path)
    }
}
