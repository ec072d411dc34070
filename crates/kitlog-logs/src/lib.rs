//! kitlog Logs - Rotating file writer, sinks, logger facade and readers
//!
//! The [`RotatingWriter`] is the heart of the crate: lines are queued from any
//! thread and appended by a single background thread which also archives the
//! active file once it crosses the configured size.

mod archive;
mod capture;
pub mod global;
mod logger;
mod reader;
mod rotation;
mod sink;
mod subscriber;
mod writer;

pub use archive::{archive_path, list_archives, Archive};
pub use capture::LogCapture;
pub use logger::{Hook, Log, Logger};
pub use reader::LogReader;
pub use rotation::{ErrorHandler, RotationConfig};
pub use sink::{
    ColorFormatter, ConsoleSink, FileSink, FilterSink, Formatter, MultiSink, Sink, TextFormatter,
};
pub use subscriber::EventWriter;
pub use writer::{RotatingWriter, RotatingWriterBuilder, WriterStats};

pub use kitlog_core::{Entry, Error, Level, Result};
