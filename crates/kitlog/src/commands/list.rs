//! List command implementation

use anyhow::Result;
use kitlog_logs::list_archives;
use std::path::Path;

use crate::output::{print_file_table, LogFileJson};

pub async fn execute(path: &Path) -> Result<()> {
    print_file_table(&collect(path)?);
    Ok(())
}

/// The active file first, then archives newest to oldest
fn collect(path: &Path) -> Result<Vec<LogFileJson>> {
    let mut files = Vec::new();
    if path.exists() {
        files.push(LogFileJson::from_path(None, path));
    }

    let dir_exists = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.is_dir(),
        _ => true,
    };
    if dir_exists {
        for archive in list_archives(path)? {
            files.push(LogFileJson::from_path(Some(archive.index), &archive.path));
        }
    }

    Ok(files)
}
