//! Error types for kitlog

use std::fmt;
use std::path::PathBuf;

/// File-system operation that failed while the writer was running
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOp {
    Close,
    List,
    Remove,
    Rename,
    Create,
}

impl FileOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileOp::Close => "close",
            FileOp::List => "list",
            FileOp::Remove => "remove",
            FileOp::Rename => "rename",
            FileOp::Create => "create",
        }
    }
}

impl fmt::Display for FileOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// kitlog error type
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid file-size: {0} (expected 1KB..=10GB)")]
    InvalidFileSize(u64),

    #[error("Invalid file-count: {0} (expected at least 2)")]
    InvalidFileCount(usize),

    #[error("Invalid queue capacity: {0}")]
    InvalidQueueCapacity(usize),

    #[error("Invalid size: {0}")]
    InvalidSize(String),

    #[error("Invalid level: {0}")]
    InvalidLevel(String),

    #[error("{op} {path}: {source}")]
    FileOp {
        op: FileOp,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Queue full (capacity {capacity})")]
    QueueFull { capacity: usize },

    #[error("Writer closed")]
    WriterClosed,

    #[error("Writer thread panicked")]
    WriterPanicked,

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Config file not found: {0}")]
    ConfigNotFound(PathBuf),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("YAML parse error: {0}")]
    YamlError(#[from] serde_yaml::Error),
}

/// Result type alias for kitlog
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Error::ConfigError(msg.into())
    }

    pub fn file_op<P: Into<PathBuf>>(op: FileOp, path: P, source: std::io::Error) -> Self {
        Error::FileOp {
            op,
            path: path.into(),
            source,
        }
    }

    /// Whether this error comes from a construction-time bound check
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            Error::InvalidFileSize(_)
                | Error::InvalidFileCount(_)
                | Error::InvalidQueueCapacity(_)
                | Error::InvalidSize(_)
                | Error::ConfigError(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::InvalidFileCount(1);
        assert_eq!(err.to_string(), "Invalid file-count: 1 (expected at least 2)");
    }

    #[test]
    fn test_file_op_display() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = Error::file_op(FileOp::Rename, "/var/log/app.log", io_err);
        assert_eq!(err.to_string(), "rename /var/log/app.log: denied");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::IoError(_)));
        assert!(!err.is_config());
    }
}
