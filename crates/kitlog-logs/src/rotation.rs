//! Log rotation configuration

use kitlog_core::{constants, Error, RotateSection, Result};
use std::fmt;
use std::sync::Arc;
use tracing::error;

/// Callback for file-system failures hit by the background writer
///
/// Rotation cannot hand errors back to the caller that queued the line, so
/// they are routed here instead. The default handler aborts the process.
#[derive(Clone)]
pub struct ErrorHandler(Arc<dyn Fn(&Error) + Send + Sync>);

impl ErrorHandler {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Error) + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Log the error and abort the process
    pub fn abort() -> Self {
        Self::new(|err| {
            error!("Log file operation failed, aborting: {}", err);
            std::process::abort();
        })
    }

    /// Log the error and keep going
    pub fn log() -> Self {
        Self::new(|err| error!("Log file operation failed: {}", err))
    }

    pub(crate) fn report(&self, err: &Error) {
        (self.0)(err)
    }
}

impl Default for ErrorHandler {
    fn default() -> Self {
        Self::abort()
    }
}

impl fmt::Debug for ErrorHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ErrorHandler")
    }
}

/// Log rotation configuration
#[derive(Debug, Clone)]
pub struct RotationConfig {
    /// Size in bytes at which the active file is archived
    pub max_size_bytes: u64,
    /// Maximum number of archives to keep
    pub max_files: usize,
    /// Capacity of the pending-line queue
    pub queue_capacity: usize,
    /// Receives rotation failures
    pub on_error: ErrorHandler,
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            max_size_bytes: constants::DEFAULT_FILE_SIZE,
            max_files: constants::DEFAULT_FILE_COUNT,
            queue_capacity: constants::DEFAULT_QUEUE_CAPACITY,
            on_error: ErrorHandler::default(),
        }
    }
}

impl RotationConfig {
    pub fn new(max_size_bytes: u64, max_files: usize) -> Self {
        Self {
            max_size_bytes,
            max_files,
            ..Default::default()
        }
    }

    /// Build from the `[rotate]` section of a config file
    pub fn from_section(section: &RotateSection) -> Self {
        Self {
            max_size_bytes: section.max_file_size(),
            max_files: section.max_files(),
            queue_capacity: section.queue_capacity(),
            ..Default::default()
        }
    }

    pub fn with_error_handler(mut self, handler: ErrorHandler) -> Self {
        self.on_error = handler;
        self
    }

    /// Check the bounds; called before anything touches the file system
    pub fn validate(&self) -> Result<()> {
        if !(constants::MIN_FILE_SIZE..=constants::MAX_FILE_SIZE).contains(&self.max_size_bytes) {
            return Err(Error::InvalidFileSize(self.max_size_bytes));
        }
        if self.max_files < constants::MIN_FILE_COUNT {
            return Err(Error::InvalidFileCount(self.max_files));
        }
        if self.queue_capacity == 0 {
            return Err(Error::InvalidQueueCapacity(self.queue_capacity));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kitlog_core::{ByteSize, GB, KB};
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_default_is_valid() {
        let config = RotationConfig::default();
        assert_eq!(config.max_size_bytes, 1024 * 1024);
        assert_eq!(config.max_files, 5);
        assert_eq!(config.queue_capacity, 10_000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_size_bounds() {
        assert!(RotationConfig::new(KB, 2).validate().is_ok());
        assert!(RotationConfig::new(10 * GB, 2).validate().is_ok());
        assert!(matches!(
            RotationConfig::new(KB - 1, 2).validate(),
            Err(Error::InvalidFileSize(1023))
        ));
        assert!(matches!(
            RotationConfig::new(10 * GB + 1, 2).validate(),
            Err(Error::InvalidFileSize(_))
        ));
    }

    #[test]
    fn test_count_bounds() {
        assert!(matches!(
            RotationConfig::new(KB, 1).validate(),
            Err(Error::InvalidFileCount(1))
        ));
        let mut config = RotationConfig::new(KB, 2);
        config.queue_capacity = 0;
        assert!(matches!(config.validate(), Err(Error::InvalidQueueCapacity(0))));
    }

    #[test]
    fn test_from_section() {
        let section = RotateSection {
            path: PathBuf::from("app.log"),
            max_file_size: Some(ByteSize::kb(4)),
            max_files: None,
            queue_capacity: Some(16),
        };
        let config = RotationConfig::from_section(&section);
        assert_eq!(config.max_size_bytes, 4096);
        assert_eq!(config.max_files, 5);
        assert_eq!(config.queue_capacity, 16);
    }

    #[test]
    fn test_custom_handler_is_called() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = calls.clone();
        let handler = ErrorHandler::new(move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        });
        handler.report(&Error::WriterClosed);
        handler.clone().report(&Error::WriterClosed);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
