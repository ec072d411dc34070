//! Entry sinks: console, plain file, fan-out and filtering

use colored::Colorize;
use kitlog_core::{Entry, Level, Result};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::warn;

/// Anything that accepts log entries
pub trait Sink: Send + Sync {
    fn write(&self, entry: &Entry);

    /// Flush and release resources
    fn close(&self) -> Result<()> {
        Ok(())
    }
}

impl<S: Sink + ?Sized> Sink for Box<S> {
    fn write(&self, entry: &Entry) {
        (**self).write(entry)
    }

    fn close(&self) -> Result<()> {
        (**self).close()
    }
}

impl<S: Sink + ?Sized> Sink for Arc<S> {
    fn write(&self, entry: &Entry) {
        (**self).write(entry)
    }

    fn close(&self) -> Result<()> {
        (**self).close()
    }
}

/// Renders an entry to a single line
pub trait Formatter: Send + Sync {
    fn format(&self, entry: &Entry) -> String;
}

/// Plain `<time> [<program>] [<component>] [<level>] <message>` lines
#[derive(Debug, Clone, Copy, Default)]
pub struct TextFormatter;

impl Formatter for TextFormatter {
    fn format(&self, entry: &Entry) -> String {
        entry.render()
    }
}

/// Text lines colored by level, for terminals
#[derive(Debug, Clone, Copy, Default)]
pub struct ColorFormatter;

impl Formatter for ColorFormatter {
    fn format(&self, entry: &Entry) -> String {
        let line = entry.render();
        let colored = match entry.level {
            Level::Debug => line.white(),
            Level::Info | Level::Access => line.cyan(),
            Level::Warn => line.yellow(),
            Level::Error => line.red(),
            Level::Fatal => line.magenta(),
            Level::Important => line.blue(),
        };
        colored.to_string()
    }
}

/// Writes entries to stdout (or any stream)
pub struct ConsoleSink {
    out: Mutex<Box<dyn Write + Send>>,
    formatter: Box<dyn Formatter>,
}

impl ConsoleSink {
    /// Stdout, colored when it is a terminal
    pub fn new() -> Self {
        let formatter: Box<dyn Formatter> = if atty::is(atty::Stream::Stdout) {
            Box::new(ColorFormatter)
        } else {
            Box::new(TextFormatter)
        };
        Self {
            out: Mutex::new(Box::new(io::stdout())),
            formatter,
        }
    }

    pub fn with_stream(mut self, stream: impl Write + Send + 'static) -> Self {
        self.out = Mutex::new(Box::new(stream));
        self
    }

    pub fn with_formatter(mut self, formatter: impl Formatter + 'static) -> Self {
        self.formatter = Box::new(formatter);
        self
    }
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new()
    }
}

impl Sink for ConsoleSink {
    fn write(&self, entry: &Entry) {
        let line = self.formatter.format(entry);
        let mut out = self.out.lock();
        // A closed stdout is not worth a panic
        let _ = writeln!(out, "{}", line);
    }

    fn close(&self) -> Result<()> {
        self.out.lock().flush()?;
        Ok(())
    }
}

/// Appends entries to a single file, no rotation
pub struct FileSink {
    path: PathBuf,
    file: Mutex<File>,
}

impl FileSink {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Sink for FileSink {
    fn write(&self, entry: &Entry) {
        let line = format!("{}\n", entry.render());
        if let Err(e) = self.file.lock().write_all(line.as_bytes()) {
            warn!("Failed to write {}: {}", self.path.display(), e);
        }
    }

    fn close(&self) -> Result<()> {
        self.file.lock().flush()?;
        Ok(())
    }
}

/// Fans every entry out to several sinks, in order
#[derive(Default)]
pub struct MultiSink {
    targets: Vec<Box<dyn Sink>>,
}

impl MultiSink {
    pub fn new(targets: Vec<Box<dyn Sink>>) -> Self {
        Self { targets }
    }

    pub fn push(&mut self, target: impl Sink + 'static) {
        self.targets.push(Box::new(target));
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

impl Sink for MultiSink {
    fn write(&self, entry: &Entry) {
        for target in &self.targets {
            target.write(entry);
        }
    }

    /// Closes every target; reports the first failure
    fn close(&self) -> Result<()> {
        let mut first_err = None;
        for target in &self.targets {
            if let Err(e) = target.close() {
                first_err.get_or_insert(e);
            }
        }
        first_err.map_or(Ok(()), Err)
    }
}

type Accept = Box<dyn Fn(&Entry) -> bool + Send + Sync>;

/// Forwards only the entries a predicate accepts
pub struct FilterSink {
    accept: Accept,
    next: Box<dyn Sink>,
}

impl FilterSink {
    pub fn new<F>(accept: F, next: impl Sink + 'static) -> Self
    where
        F: Fn(&Entry) -> bool + Send + Sync + 'static,
    {
        Self {
            accept: Box::new(accept),
            next: Box::new(next),
        }
    }

    /// Accept only the given levels
    pub fn levels(levels: impl IntoIterator<Item = Level>, next: impl Sink + 'static) -> Self {
        let allowed: HashSet<Level> = levels.into_iter().collect();
        Self::new(move |e| allowed.contains(&e.level), next)
    }
}

impl Sink for FilterSink {
    fn write(&self, entry: &Entry) {
        if (self.accept)(entry) {
            self.next.write(entry);
        }
    }

    fn close(&self) -> Result<()> {
        self.next.close()
    }
}

/// Collects entries in memory
#[cfg(test)]
#[derive(Default)]
pub(crate) struct MemorySink {
    pub entries: Mutex<Vec<Entry>>,
    pub closed: std::sync::atomic::AtomicBool,
}

#[cfg(test)]
impl Sink for MemorySink {
    fn write(&self, entry: &Entry) {
        self.entries.lock().push(entry.clone());
    }

    fn close(&self) -> Result<()> {
        self.closed.store(true, std::sync::atomic::Ordering::SeqCst);
        Ok(())
    }
}
