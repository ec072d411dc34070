//! `tracing-subscriber` integration
//!
//! Lets a [`RotatingWriter`] back a `fmt` layer:
//!
//! ```ignore
//! let writer = RotatingWriter::builder("logs/app.log").open()?;
//! tracing_subscriber::fmt().with_writer(writer.clone()).with_ansi(false).init();
//! ```

use std::io;
use tracing_subscriber::fmt::MakeWriter;

use crate::writer::RotatingWriter;

/// Per-event writer; splits the formatted event into queued lines
pub struct EventWriter<'a> {
    writer: &'a RotatingWriter,
    buf: Vec<u8>,
}

impl EventWriter<'_> {
    fn submit(&self, mut line: Vec<u8>) {
        if line.last() == Some(&b'\r') {
            line.pop();
        }
        let line = match String::from_utf8(line) {
            Ok(s) => s,
            Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
        };
        self.writer.write_line(line);
    }
}

impl io::Write for EventWriter<'_> {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(data);
        while let Some(pos) = self.buf.iter().position(|b| *b == b'\n') {
            let rest = self.buf.split_off(pos + 1);
            let mut line = std::mem::replace(&mut self.buf, rest);
            line.pop();
            self.submit(line);
        }
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for EventWriter<'_> {
    fn drop(&mut self) {
        if !self.buf.is_empty() {
            let line = std::mem::take(&mut self.buf);
            self.submit(line);
        }
    }
}

impl<'a> MakeWriter<'a> for RotatingWriter {
    type Writer = EventWriter<'a>;

    fn make_writer(&'a self) -> Self::Writer {
        EventWriter {
            writer: self,
            buf: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_event_writer_splits_lines() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("events.log");
        let writer = RotatingWriter::builder(&path).open().unwrap();

        {
            let mut w = writer.make_writer();
            w.write_all(b"first\nsec").unwrap();
            w.write_all(b"ond\r\nthird").unwrap();
        }
        writer.close().unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "first\nsecond\nthird\n");
    }

    #[test]
    fn test_fmt_layer_writes_events() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tracing.log");
        let writer = RotatingWriter::builder(&path).open().unwrap();

        let subscriber = tracing_subscriber::fmt()
            .with_writer(writer.clone())
            .with_ansi(false)
            .without_time()
            .finish();
        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(user = "ada", "logged in");
            tracing::warn!("slow request");
        });
        writer.close().unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("INFO"));
        assert!(lines[0].contains("logged in"));
        assert!(lines[0].contains("user=\"ada\""));
        assert!(lines[1].contains("WARN"));
    }
}
