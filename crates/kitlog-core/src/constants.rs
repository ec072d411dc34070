//! Constants and default values for kitlog

use std::path::PathBuf;

/// One kilobyte
pub const KB: u64 = 1024;

/// One megabyte
pub const MB: u64 = KB * 1024;

/// One gigabyte
pub const GB: u64 = MB * 1024;

/// Smallest accepted rotation threshold
pub const MIN_FILE_SIZE: u64 = KB;

/// Largest accepted rotation threshold
pub const MAX_FILE_SIZE: u64 = 10 * GB;

/// Smallest accepted retention count
pub const MIN_FILE_COUNT: usize = 2;

/// Default rotation threshold (1MB)
pub const DEFAULT_FILE_SIZE: u64 = MB;

/// Default number of archives to keep
pub const DEFAULT_FILE_COUNT: usize = 5;

/// Default capacity of the pending-line queue
pub const DEFAULT_QUEUE_CAPACITY: usize = 10_000;

/// Width of the zero-padded archive index suffix
pub const ARCHIVE_INDEX_WIDTH: usize = 3;

/// Timestamp layout used by the text formatter
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f";

/// Program name used by the default global logger
pub const DEFAULT_PROGRAM: &str = "default";

/// Default kitlog home directory name
pub const KITLOG_DIR: &str = ".kitlog";

/// Default log directory name
pub const LOGS_DIR: &str = "logs";

/// Default config file names to search for (in priority order)
pub const CONFIG_FILES: &[&str] = &["kitlog.toml", "kitlog.yaml", "kitlog.yml", "kitlog.json"];

/// Get the kitlog home directory
pub fn kitlog_home() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(KITLOG_DIR))
        .unwrap_or_else(|| PathBuf::from(KITLOG_DIR))
}

/// Get the logs directory
pub fn logs_dir() -> PathBuf {
    kitlog_home().join(LOGS_DIR)
}

/// Get the default log file path for a program
pub fn log_path(program: &str) -> PathBuf {
    logs_dir().join(format!("{}.log", program))
}
