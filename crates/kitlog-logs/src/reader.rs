//! Reading a rotated log set: tail, full read and follow

use kitlog_core::{Error, Result};
use std::collections::VecDeque;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::mpsc as std_mpsc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::debug;

use crate::archive::list_archives;

/// Reader over an active log file and its archives
pub struct LogReader {
    path: PathBuf,
}

impl LogReader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Every existing file of the set, oldest archive first, active file last
    pub fn files(&self) -> Result<Vec<PathBuf>> {
        let mut files: Vec<PathBuf> = match list_archives(&self.path) {
            Ok(archives) => archives.into_iter().rev().map(|a| a.path).collect(),
            Err(Error::FileOp { .. }) => Vec::new(),
            Err(e) => return Err(e),
        };
        if self.path.exists() {
            files.push(self.path.clone());
        }
        Ok(files)
    }

    /// Read every line of the set in write order
    pub fn read_all(&self) -> Result<Vec<String>> {
        let mut lines = Vec::new();
        for path in self.files()? {
            let reader = BufReader::new(File::open(&path)?);
            for line in reader.lines() {
                lines.push(line?);
            }
        }
        Ok(lines)
    }

    /// Read the last N lines, reaching into archives when the active file
    /// holds fewer
    pub fn tail(&self, n: usize) -> Result<Vec<String>> {
        let mut collected: VecDeque<String> = VecDeque::with_capacity(n);

        for path in self.files()?.iter().rev() {
            if collected.len() >= n {
                break;
            }
            let lines = tail_file(path, n - collected.len())?;
            for line in lines.into_iter().rev() {
                collected.push_front(line);
            }
        }

        Ok(collected.into())
    }

    /// Follow the active file (like tail -f), across rotations
    ///
    /// Must be called from within a tokio runtime. The background task stops
    /// when the receiver is dropped.
    pub fn follow(&self) -> Result<mpsc::Receiver<String>> {
        let path = self.path.clone();
        let mut file = File::open(&path)?;
        let position = file.seek(SeekFrom::End(0))?;
        let (tx, rx) = mpsc::channel(100);

        tokio::task::spawn_blocking(move || {
            if let Err(e) = follow_file(&path, file, position, &tx) {
                debug!("Follow ended: {}", e);
            }
        });

        Ok(rx)
    }

    /// Check if the active log file exists
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Get the active file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Total size of the active file and its archives
    pub fn size(&self) -> Result<u64> {
        let mut total = 0;
        for path in self.files()? {
            total += fs::metadata(&path)?.len();
        }
        Ok(total)
    }
}

/// Read the last N lines of one file, seeking backwards from the end
fn tail_file(path: &Path, n: usize) -> Result<Vec<String>> {
    let mut file = File::open(path)?;
    let file_size = file.metadata()?.len();

    if file_size == 0 || n == 0 {
        return Ok(vec![]);
    }

    // Start reading from end, chunk by chunk
    let chunk_size = 8192u64;
    let mut lines = Vec::new();
    let mut position = file_size;
    let mut partial: Vec<u8> = Vec::new();

    while position > 0 && lines.len() < n {
        let read_size = std::cmp::min(chunk_size, position);
        position -= read_size;

        file.seek(SeekFrom::Start(position))?;
        let mut buffer = vec![0u8; read_size as usize];
        file.read_exact(&mut buffer)?;

        // Bytes, not str: a chunk boundary may split a UTF-8 sequence
        buffer.extend_from_slice(&partial);
        let mut pieces: Vec<&[u8]> = buffer.split(|b| *b == b'\n').collect();

        // Trailing newline of the file yields an empty last piece
        if position + read_size == file_size && pieces.last() == Some(&&b""[..]) {
            pieces.pop();
        }

        // The first piece may continue in the previous chunk
        let head = if position > 0 { pieces.remove(0).to_vec() } else { Vec::new() };

        for piece in pieces.into_iter().rev() {
            if lines.len() >= n {
                break;
            }
            lines.push(String::from_utf8_lossy(piece).into_owned());
        }
        partial = head;
    }

    if position == 0 && !partial.is_empty() && lines.len() < n {
        lines.push(String::from_utf8_lossy(&partial).into_owned());
    }

    lines.reverse();
    Ok(lines)
}

/// Stream lines appended to `path`; reopen when the file is rotated away
fn follow_file(
    path: &Path,
    mut file: File,
    mut position: u64,
    tx: &mpsc::Sender<String>,
) -> Result<()> {
    use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};

    let file_name = path.file_name().map(|n| n.to_os_string());
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };

    // The active file gets renamed on rotation, so watch its directory
    let (watch_tx, watch_rx) = std_mpsc::channel();
    let mut watcher = RecommendedWatcher::new(
        move |res| {
            let _ = watch_tx.send(res);
        },
        notify::Config::default(),
    )
    .map_err(|e| Error::ConfigError(format!("Failed to create watcher: {}", e)))?;

    watcher
        .watch(&dir, RecursiveMode::NonRecursive)
        .map_err(|e| Error::ConfigError(format!("Failed to watch {}: {}", dir.display(), e)))?;

    let mut partial = String::new();

    loop {
        let mut recreated = false;
        match watch_rx.recv_timeout(Duration::from_millis(500)) {
            Ok(Ok(event)) => {
                recreated = matches!(event.kind, EventKind::Create(_))
                    && event
                        .paths
                        .iter()
                        .any(|p| p.file_name().map(|n| n.to_os_string()) == file_name);
            }
            Ok(Err(e)) => {
                debug!("Watch error: {}", e);
                continue;
            }
            Err(std_mpsc::RecvTimeoutError::Timeout) => {
                if tx.is_closed() {
                    break;
                }
            }
            Err(std_mpsc::RecvTimeoutError::Disconnected) => break,
        }

        // Finish whatever the old handle still holds
        if !read_appended(&mut file, &mut position, &mut partial, tx)? {
            return Ok(());
        }

        let current_len = fs::metadata(path).map(|m| m.len()).unwrap_or(0);
        if recreated || current_len < position {
            let Ok(reopened) = File::open(path) else {
                continue;
            };
            debug!("Log file rotated, reopening {}", path.display());
            file = reopened;
            position = 0;
            if !partial.is_empty() && tx.blocking_send(std::mem::take(&mut partial)).is_err() {
                return Ok(());
            }
            if !read_appended(&mut file, &mut position, &mut partial, tx)? {
                return Ok(());
            }
        }
    }

    Ok(())
}

/// Send complete lines past `position`; `false` once the receiver is gone
fn read_appended(
    file: &mut File,
    position: &mut u64,
    partial: &mut String,
    tx: &mpsc::Sender<String>,
) -> Result<bool> {
    file.seek(SeekFrom::Start(*position))?;
    let mut buf = Vec::new();
    let n = file.read_to_end(&mut buf)?;
    *position += n as u64;
    partial.push_str(&String::from_utf8_lossy(&buf));

    while let Some(idx) = partial.find('\n') {
        let mut line: String = partial.drain(..=idx).collect();
        line.pop();
        if tx.blocking_send(line).is_err() {
            return Ok(false);
        }
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::archive_path;
    use crate::writer::RotatingWriter;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_lines(path: &Path, lines: impl IntoIterator<Item = String>) {
        let mut file = File::create(path).unwrap();
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }
    }

    #[test]
    fn test_tail_empty_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.log");
        File::create(&path).unwrap();

        let reader = LogReader::new(path);
        assert!(reader.tail(10).unwrap().is_empty());
    }

    #[test]
    fn test_tail_nonexistent_file() {
        let reader = LogReader::new(PathBuf::from("/nonexistent/file.log"));
        assert!(reader.tail(10).unwrap().is_empty());
        assert!(!reader.exists());
        assert_eq!(reader.size().unwrap(), 0);
    }

    #[test]
    fn test_tail_single_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("test.log");
        write_lines(&path, (1..=20).map(|i| format!("Line {}", i)));

        let lines = LogReader::new(path).tail(5).unwrap();
        assert_eq!(lines, vec!["Line 16", "Line 17", "Line 18", "Line 19", "Line 20"]);
    }

    #[test]
    fn test_tail_large_file_spans_chunks() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("test.log");
        write_lines(
            &path,
            (1..=2000).map(|i| format!("Line {} with some longer content here", i)),
        );

        let lines = LogReader::new(path).tail(300).unwrap();
        assert_eq!(lines.len(), 300);
        assert_eq!(lines[0], "Line 1701 with some longer content here");
        assert_eq!(lines[299], "Line 2000 with some longer content here");
    }

    #[test]
    fn test_tail_without_trailing_newline() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("test.log");
        fs::write(&path, "a\nb\nc").unwrap();

        let lines = LogReader::new(path).tail(2).unwrap();
        assert_eq!(lines, vec!["b", "c"]);
    }

    #[test]
    fn test_tail_crosses_into_archives() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.log");
        write_lines(&archive_path(&path, 2), ["1", "2"].map(String::from));
        write_lines(&archive_path(&path, 1), ["3", "4"].map(String::from));
        write_lines(&path, ["5"].map(String::from));

        let reader = LogReader::new(&path);
        assert_eq!(reader.tail(4).unwrap(), vec!["2", "3", "4", "5"]);
        assert_eq!(reader.tail(10).unwrap(), vec!["1", "2", "3", "4", "5"]);
        assert_eq!(reader.read_all().unwrap(), vec!["1", "2", "3", "4", "5"]);
        assert_eq!(reader.files().unwrap().len(), 3);
        assert_eq!(reader.size().unwrap(), 10);
    }

    #[test]
    fn test_read_all_after_rotations() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.log");
        let writer = RotatingWriter::builder(&path)
            .max_file_size(1024)
            .max_files(20)
            .open()
            .unwrap();
        for i in 0..300 {
            writer.write_line(format!("entry {:04}", i));
        }
        writer.close().unwrap();

        let lines = LogReader::new(&path).read_all().unwrap();
        let expected: Vec<String> = (0..300).map(|i| format!("entry {:04}", i)).collect();
        assert_eq!(lines, expected);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_follow_survives_rotation() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.log");
        fs::write(&path, "before follow\n").unwrap();

        let reader = LogReader::new(&path);
        let mut rx = reader.follow().unwrap();

        // Give the watcher a moment to register
        tokio::time::sleep(Duration::from_millis(200)).await;
        {
            let mut file = fs::OpenOptions::new().append(true).open(&path).unwrap();
            writeln!(file, "one").unwrap();
        }
        let first = tokio::time::timeout(Duration::from_secs(5), rx.recv()).await.unwrap();
        assert_eq!(first.as_deref(), Some("one"));

        fs::rename(&path, archive_path(&path, 1)).unwrap();
        fs::write(&path, "two\n").unwrap();

        let second = tokio::time::timeout(Duration::from_secs(5), rx.recv()).await.unwrap();
        assert_eq!(second.as_deref(), Some("two"));
    }
}
