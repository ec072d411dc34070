//! Rotating log writer
//!
//! Producers push pre-rendered lines into a bounded queue. A dedicated
//! thread owns the active file: it appends each line, and once the file
//! has reached the size threshold it archives it and starts a fresh one.
//! Nothing but that thread ever touches the file handle.

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use kitlog_core::{Entry, Error, FileOp, Result};
use parking_lot::{Mutex, RwLock, RwLockReadGuard};
use std::cell::Cell;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, warn};

use crate::archive;
use crate::rotation::{ErrorHandler, RotationConfig};
use crate::sink::Sink;

thread_local! {
    static ON_DRAIN_THREAD: Cell<bool> = const { Cell::new(false) };
}

/// Snapshot of a writer's counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriterStats {
    pub lines_written: u64,
    pub bytes_written: u64,
    pub rotations: u64,
    pub write_errors: u64,
    /// Lines rejected because the writer was closed
    pub lines_dropped: u64,
}

#[derive(Debug, Default)]
struct Counters {
    lines_written: AtomicU64,
    bytes_written: AtomicU64,
    rotations: AtomicU64,
    write_errors: AtomicU64,
    lines_dropped: AtomicU64,
}

impl Counters {
    fn snapshot(&self) -> WriterStats {
        WriterStats {
            lines_written: self.lines_written.load(Ordering::Relaxed),
            bytes_written: self.bytes_written.load(Ordering::Relaxed),
            rotations: self.rotations.load(Ordering::Relaxed),
            write_errors: self.write_errors.load(Ordering::Relaxed),
            lines_dropped: self.lines_dropped.load(Ordering::Relaxed),
        }
    }
}

type DrainHandle = JoinHandle<Option<BufWriter<File>>>;

struct Shared {
    path: PathBuf,
    capacity: usize,
    /// `None` once closing has begun
    tx: RwLock<Option<Sender<String>>>,
    drain: Mutex<Option<DrainHandle>>,
    counters: Arc<Counters>,
}

impl Shared {
    /// Lock the sender for submitting a line
    ///
    /// A pending `shutdown` parks plain readers. The drain thread must not
    /// park: producers blocked in `send` only leave once it consumes, and
    /// only then can `shutdown` take the write lock.
    fn read_sender(&self, on_drain: bool) -> RwLockReadGuard<'_, Option<Sender<String>>> {
        if on_drain {
            self.tx.read_recursive()
        } else {
            self.tx.read()
        }
    }

    fn shutdown(&self) -> Result<()> {
        // Taking the write lock waits for producers blocked in `send`; the
        // drain loop keeps consuming, so they always get through.
        let tx = self.tx.write().take();
        drop(tx);

        // Held across the join so a concurrent close waits for the same end
        let mut drain = self.drain.lock();
        let Some(handle) = drain.take() else {
            return Ok(());
        };

        match handle.join() {
            Ok(Some(mut file)) => file
                .flush()
                .map_err(|e| Error::file_op(FileOp::Close, &self.path, e)),
            Ok(None) => Ok(()),
            Err(_) => Err(Error::WriterPanicked),
        }
    }
}

impl Drop for Shared {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            warn!("Failed to close {}: {}", self.path.display(), e);
        }
    }
}

/// Asynchronous, size-bounded, rotating file writer
///
/// Cloning yields another handle to the same writer. The writer shuts down
/// when [`close`](Self::close) is called or the last handle is dropped.
#[derive(Clone)]
pub struct RotatingWriter {
    shared: Arc<Shared>,
}

impl RotatingWriter {
    /// Start configuring a writer for `path`
    pub fn builder(path: impl Into<PathBuf>) -> RotatingWriterBuilder {
        RotatingWriterBuilder {
            path: path.into(),
            config: RotationConfig::default(),
        }
    }

    /// Open `path` for appending and start the drain thread
    ///
    /// The configuration is validated before the directory or file is
    /// touched.
    pub fn open(path: impl Into<PathBuf>, config: RotationConfig) -> Result<Self> {
        config.validate()?;

        let path = path.into();
        if path.file_name().is_none() {
            return Err(Error::config(format!("Invalid log file path: {}", path.display())));
        }

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = open_active(&path)?;
        let current_size = file.metadata()?.len();

        let (tx, rx) = bounded(config.queue_capacity);
        let counters = Arc::new(Counters::default());
        let capacity = config.queue_capacity;

        let drain = Drain {
            path: path.clone(),
            max_size_bytes: config.max_size_bytes,
            max_files: config.max_files,
            on_error: config.on_error,
            file: Some(BufWriter::new(file)),
            current_size,
            counters: counters.clone(),
        };

        let handle = thread::Builder::new()
            .name("kitlog-rotate".to_string())
            .spawn(move || drain.run(rx))?;

        debug!("Opened rotating log {}", path.display());

        Ok(Self {
            shared: Arc::new(Shared {
                path,
                capacity,
                tx: RwLock::new(Some(tx)),
                drain: Mutex::new(Some(handle)),
                counters,
            }),
        })
    }

    /// Queue a line for appending; a newline is added by the writer
    ///
    /// Blocks while the queue is full. Lines written after `close` are
    /// dropped.
    pub fn write_line(&self, line: impl Into<String>) {
        let line = line.into();
        let on_drain = ON_DRAIN_THREAD.with(Cell::get);
        let guard = self.shared.read_sender(on_drain);
        let Some(tx) = guard.as_ref() else {
            drop(guard);
            // Only the first: this event may itself be routed back here
            if self.shared.counters.lines_dropped.fetch_add(1, Ordering::Relaxed) == 0 {
                debug!("Ignoring lines written after close of {}", self.shared.path.display());
            }
            return;
        };

        // The drain thread can't wait on its own queue
        let sent = if on_drain {
            tx.try_send(line).is_ok()
        } else {
            tx.send(line).is_ok()
        };
        if !sent {
            self.shared.counters.lines_dropped.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Queue a line without blocking
    pub fn try_write_line(&self, line: impl Into<String>) -> Result<()> {
        let guard = self.shared.read_sender(ON_DRAIN_THREAD.with(Cell::get));
        let tx = guard.as_ref().ok_or(Error::WriterClosed)?;
        tx.try_send(line.into()).map_err(|e| match e {
            TrySendError::Full(_) => Error::QueueFull {
                capacity: self.shared.capacity,
            },
            TrySendError::Disconnected(_) => Error::WriterClosed,
        })
    }

    /// Stop accepting lines, persist everything already queued, release the file
    ///
    /// Calling it again is a no-op.
    pub fn close(&self) -> Result<()> {
        self.shared.shutdown()
    }

    pub fn is_closed(&self) -> bool {
        self.shared.tx.read().is_none()
    }

    /// Get the active log file path
    pub fn path(&self) -> &Path {
        &self.shared.path
    }

    pub fn stats(&self) -> WriterStats {
        self.shared.counters.snapshot()
    }
}

impl Sink for RotatingWriter {
    fn write(&self, entry: &Entry) {
        self.write_line(entry.render());
    }

    fn close(&self) -> Result<()> {
        RotatingWriter::close(self)
    }
}

impl std::fmt::Debug for RotatingWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RotatingWriter")
            .field("path", &self.shared.path)
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// Builder for [`RotatingWriter`]
#[derive(Debug)]
pub struct RotatingWriterBuilder {
    path: PathBuf,
    config: RotationConfig,
}

impl RotatingWriterBuilder {
    /// Rotation threshold in bytes (1KB..=10GB, default 1MB)
    pub fn max_file_size(mut self, bytes: u64) -> Self {
        self.config.max_size_bytes = bytes;
        self
    }

    /// Number of archives to keep (at least 2, default 5)
    pub fn max_files(mut self, count: usize) -> Self {
        self.config.max_files = count;
        self
    }

    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.config.queue_capacity = capacity;
        self
    }

    /// Handle file-system failures during rotation (default: abort)
    pub fn on_file_error<F>(mut self, f: F) -> Self
    where
        F: Fn(&Error) + Send + Sync + 'static,
    {
        self.config.on_error = ErrorHandler::new(f);
        self
    }

    pub fn error_handler(mut self, handler: ErrorHandler) -> Self {
        self.config.on_error = handler;
        self
    }

    pub fn open(self) -> Result<RotatingWriter> {
        RotatingWriter::open(self.path, self.config)
    }
}

fn open_active(path: &Path) -> std::io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

/// State owned by the drain thread
struct Drain {
    path: PathBuf,
    max_size_bytes: u64,
    max_files: usize,
    on_error: ErrorHandler,
    /// `None` only after a failed reopen
    file: Option<BufWriter<File>>,
    current_size: u64,
    counters: Arc<Counters>,
}

impl Drain {
    /// Consume until every sender is gone and the queue is empty, then hand
    /// the file back to the owner
    fn run(mut self, rx: Receiver<String>) -> Option<BufWriter<File>> {
        ON_DRAIN_THREAD.with(|flag| flag.set(true));

        while let Ok(line) = rx.recv() {
            self.append(&line);
            if rx.is_empty() {
                self.flush();
            }
        }

        debug!("Drain loop for {} stopped", self.path.display());
        self.file
    }

    fn append(&mut self, line: &str) {
        if self.file.is_none() {
            self.reopen();
        }
        let Some(file) = self.file.as_mut() else {
            self.counters.write_errors.fetch_add(1, Ordering::Relaxed);
            return;
        };

        let result = file
            .write_all(line.as_bytes())
            .and_then(|_| file.write_all(b"\n"));
        if let Err(e) = result {
            warn!("Failed to append to {}: {}", self.path.display(), e);
            self.counters.write_errors.fetch_add(1, Ordering::Relaxed);
            return;
        }

        let written = line.len() as u64 + 1;
        self.current_size += written;
        self.counters.lines_written.fetch_add(1, Ordering::Relaxed);
        self.counters.bytes_written.fetch_add(written, Ordering::Relaxed);

        if self.current_size >= self.max_size_bytes {
            self.rotate();
        }
    }

    fn flush(&mut self) {
        if let Some(file) = self.file.as_mut() {
            if let Err(e) = file.flush() {
                warn!("Failed to flush {}: {}", self.path.display(), e);
                self.counters.write_errors.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    fn rotate(&mut self) {
        debug!("Rotating log file: {}", self.path.display());

        // Flush and close current file
        if let Some(mut file) = self.file.take() {
            if let Err(e) = file.flush() {
                self.on_error
                    .report(&Error::file_op(FileOp::Close, &self.path, e));
            }
        }

        archive::archive_active(&self.path, self.max_files, &self.on_error);

        match open_active(&self.path) {
            Ok(file) => self.file = Some(BufWriter::new(file)),
            Err(e) => self
                .on_error
                .report(&Error::file_op(FileOp::Create, &self.path, e)),
        }

        self.current_size = 0;
        self.counters.rotations.fetch_add(1, Ordering::Relaxed);
    }

    fn reopen(&mut self) {
        match open_active(&self.path) {
            Ok(file) => {
                self.current_size = file.metadata().map(|m| m.len()).unwrap_or(0);
                self.file = Some(BufWriter::new(file));
            }
            Err(e) => warn!("Failed to reopen {}: {}", self.path.display(), e),
        }
    }
}
