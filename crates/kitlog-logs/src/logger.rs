//! Logger facade over a sink

use kitlog_core::{ConfigFile, Entry, Level, Result};
use std::backtrace::Backtrace;
use std::fmt;
use std::sync::Arc;

use crate::rotation::RotationConfig;
use crate::sink::{ConsoleSink, FileSink, FilterSink, MultiSink, Sink};
use crate::writer::RotatingWriter;

/// Level helpers on top of a single `log` method
pub trait Log {
    fn log(&self, entry: Entry);

    fn debug(&self, msg: impl fmt::Display) {
        self.log(Entry::new(Level::Debug, msg.to_string()));
    }

    fn info(&self, msg: impl fmt::Display) {
        self.log(Entry::new(Level::Info, msg.to_string()));
    }

    fn warn(&self, msg: impl fmt::Display) {
        self.log(Entry::new(Level::Warn, msg.to_string()));
    }

    fn error(&self, msg: impl fmt::Display) {
        self.log(Entry::new(Level::Error, msg.to_string()));
    }

    fn important(&self, msg: impl fmt::Display) {
        self.log(Entry::new(Level::Important, msg.to_string()));
    }

    fn access(&self, msg: impl fmt::Display) {
        self.log(Entry::new(Level::Access, msg.to_string()));
    }

    /// Log a fatal entry, then panic with the same message
    fn fatal(&self, msg: impl fmt::Display) -> ! {
        let msg = msg.to_string();
        self.log(Entry::new(Level::Fatal, msg.clone()));
        panic!("{}", msg);
    }

    /// Log the current call stack at debug level, one entry per line
    fn debug_stack(&self) {
        let trace = Backtrace::force_capture().to_string();
        for (i, line) in trace.lines().enumerate() {
            self.debug(format_args!("stack {:03}: {}", i, line));
        }
    }
}

/// Named handle to a shared sink
///
/// Entries without a program get the logger's name.
#[derive(Clone)]
pub struct Logger {
    name: Arc<str>,
    sink: Arc<dyn Sink>,
}

impl Logger {
    pub fn new(name: impl Into<String>, sink: impl Sink + 'static) -> Self {
        Self::from_shared(name, Arc::new(sink))
    }

    pub fn from_shared(name: impl Into<String>, sink: Arc<dyn Sink>) -> Self {
        Self {
            name: Arc::from(name.into()),
            sink,
        }
    }

    /// Build the sink chain a config file describes
    ///
    /// Console, plain file and rotating file are combined; a level list
    /// wraps the lot in a filter. With nothing configured the console is used.
    pub fn from_config(config: &ConfigFile) -> Result<Self> {
        let rotation = config
            .rotate
            .as_ref()
            .map(RotationConfig::from_section)
            .unwrap_or_default();
        Self::from_config_with(config, rotation)
    }

    /// Like [`from_config`](Self::from_config), with the rotating sink's
    /// settings supplied by the caller
    pub fn from_config_with(config: &ConfigFile, rotation: RotationConfig) -> Result<Self> {
        let mut multi = MultiSink::default();

        if let Some(rotate) = &config.rotate {
            multi.push(RotatingWriter::open(&rotate.path, rotation)?);
        }
        if let Some(path) = &config.file {
            multi.push(FileSink::open(path)?);
        }
        if config.console || multi.is_empty() {
            multi.push(ConsoleSink::new());
        }

        let logger = if config.levels.is_empty() {
            Self::new(config.program(), multi)
        } else {
            let filter = FilterSink::levels(config.levels.iter().copied(), multi);
            Self::new(config.program(), filter)
        };
        Ok(logger)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Return a hook that stamps `component` on every entry
    pub fn component(&self, component: impl Into<String>) -> Hook {
        let component = component.into();
        self.with_hook(move |mut e| {
            e.component = component.clone();
            e
        })
    }

    /// Return a hook that transforms entries before they are logged
    pub fn with_hook<F>(&self, f: F) -> Hook
    where
        F: Fn(Entry) -> Entry + Send + Sync + 'static,
    {
        Hook {
            logger: self.clone(),
            hook: Arc::new(f),
        }
    }

    pub fn close(&self) -> Result<()> {
        self.sink.close()
    }
}

impl Log for Logger {
    fn log(&self, mut entry: Entry) {
        if entry.program.is_empty() {
            entry.program = self.name.to_string();
        }
        self.sink.write(&entry);
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger").field("name", &self.name).finish()
    }
}

/// A logger that amends entries before passing them on
#[derive(Clone)]
pub struct Hook {
    logger: Logger,
    hook: Arc<dyn Fn(Entry) -> Entry + Send + Sync>,
}

impl Log for Hook {
    fn log(&self, entry: Entry) {
        self.logger.log((self.hook)(entry));
    }
}

impl fmt::Debug for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hook").field("logger", &self.logger).finish()
    }
}
