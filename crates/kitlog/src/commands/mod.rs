//! Command implementations

pub mod demo;
pub mod exec;
pub mod list;
pub mod pipe;
pub mod tail;

use kitlog_core::ConfigFile;
use kitlog_logs::{ErrorHandler, RotationConfig};

use crate::cli::RotateArgs;

/// Rotation settings: config file section first, then command-line overrides
///
/// The CLI keeps running on rotation failures and reports them through
/// tracing instead of aborting.
pub fn rotation_config(args: &RotateArgs, config: Option<&ConfigFile>) -> RotationConfig {
    let mut rotation = config
        .and_then(|c| c.rotate.as_ref())
        .map(RotationConfig::from_section)
        .unwrap_or_default();

    if let Some(size) = args.max_size {
        rotation.max_size_bytes = size;
    }
    if let Some(files) = args.max_files {
        rotation.max_files = files;
    }
    if let Some(capacity) = args.queue_capacity {
        rotation.queue_capacity = capacity;
    }

    rotation.with_error_handler(ErrorHandler::log())
}
