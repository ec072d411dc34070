//! Numbered archive files next to the active log file

use kitlog_core::{constants::ARCHIVE_INDEX_WIDTH, Error, FileOp, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::rotation::ErrorHandler;

/// A rotated-out log file, `<base>.<index>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Archive {
    /// 1 is the newest archive
    pub index: usize,
    pub path: PathBuf,
}

/// Get the path for an archived log file
pub fn archive_path(active: &Path, index: usize) -> PathBuf {
    let name = active
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    active.with_file_name(format!("{}.{:0width$}", name, index, width = ARCHIVE_INDEX_WIDTH))
}

/// List the archives of `active`, sorted by index (newest first)
///
/// Directory order is never trusted; any `<base>.<digits>` file counts,
/// whatever the width of its suffix.
pub fn list_archives(active: &Path) -> Result<Vec<Archive>> {
    let base = active
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| Error::config(format!("Invalid log file path: {}", active.display())))?;
    let dir = match active.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let pattern = glob::Pattern::new(&format!("{}.[0-9]*", glob::Pattern::escape(base)))
        .map_err(|e| Error::config(format!("Invalid archive pattern for {}: {}", base, e)))?;

    let entries = fs::read_dir(dir).map_err(|e| Error::file_op(FileOp::List, dir, e))?;

    let mut archives = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| Error::file_op(FileOp::List, dir, e))?;
        let file_name = entry.file_name();
        let Some(name) = file_name.to_str() else {
            continue;
        };
        if !pattern.matches(name) {
            continue;
        }
        let suffix = &name[base.len() + 1..];
        if !suffix.bytes().all(|b| b.is_ascii_digit()) {
            continue;
        }
        if let Ok(index) = suffix.parse::<usize>() {
            archives.push(Archive {
                index,
                path: entry.path(),
            });
        }
    }

    archives.sort_by_key(|a| a.index);
    Ok(archives)
}

/// Move the (already closed) active file into the archive set
///
/// Prunes the oldest archives so that, once the active file becomes
/// archive 1, at most `max_files` remain. Survivors are renumbered to a
/// contiguous run starting at 2. Prune failures are reported and skipped;
/// list, shift and archive failures are reported too.
pub(crate) fn archive_active(active: &Path, max_files: usize, on_error: &ErrorHandler) {
    let mut archives = match list_archives(active) {
        Ok(archives) => archives,
        Err(e) => {
            on_error.report(&e);
            Vec::new()
        }
    };

    // Prune oldest
    while !archives.is_empty() && archives.len() >= max_files {
        if let Some(oldest) = archives.pop() {
            debug!("Removing archive {}", oldest.path.display());
            if let Err(e) = fs::remove_file(&oldest.path) {
                on_error.report(&Error::file_op(FileOp::Remove, &oldest.path, e));
            }
        }
    }

    // Position p moves to index p + 2. Moves toward lower indices (gap
    // closing) go first in ascending order, then moves toward higher
    // indices in descending order, so no rename lands on an unmoved file.
    let moves: Vec<(usize, &Archive)> = archives
        .iter()
        .enumerate()
        .map(|(pos, archive)| (pos + 2, archive))
        .filter(|(target, archive)| *target != archive.index)
        .collect();

    let down = moves.iter().filter(|(target, a)| *target < a.index);
    let up = moves.iter().filter(|(target, a)| *target > a.index).rev();

    for (target, archive) in down.chain(up) {
        let new_path = archive_path(active, *target);
        if let Err(e) = fs::rename(&archive.path, &new_path) {
            on_error.report(&Error::file_op(FileOp::Rename, &archive.path, e));
        }
    }

    let first = archive_path(active, 1);
    if let Err(e) = fs::rename(active, &first) {
        on_error.report(&Error::file_op(FileOp::Rename, active, e));
    }
}
