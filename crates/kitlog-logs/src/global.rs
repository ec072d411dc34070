//! Process-wide logger
//!
//! Prefer passing a [`Logger`] down the call chain. The global exists for
//! the entry point and for code that has no handle: install one at startup,
//! close it on the way out.

use kitlog_core::{constants::DEFAULT_PROGRAM, Result};
use once_cell::sync::Lazy;
use parking_lot::RwLock;

use crate::logger::Logger;
use crate::sink::ConsoleSink;

static GLOBAL: Lazy<RwLock<Logger>> =
    Lazy::new(|| RwLock::new(Logger::new(DEFAULT_PROGRAM, ConsoleSink::new())));

/// Replace the global logger, returning the previous one
pub fn install(logger: Logger) -> Logger {
    std::mem::replace(&mut *GLOBAL.write(), logger)
}

/// Get a handle to the current global logger
pub fn logger() -> Logger {
    GLOBAL.read().clone()
}

/// Close the sink of the current global logger
pub fn close() -> Result<()> {
    logger().close()
}
