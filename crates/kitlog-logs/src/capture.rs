//! Capture a child process's output into rotating logs

use kitlog_core::Result;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{ChildStderr, ChildStdout};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::rotation::RotationConfig;
use crate::writer::RotatingWriter;

/// Line-by-line capture of stdout and stderr, each into its own rotating set
pub struct LogCapture {
    pub stdout_writer: RotatingWriter,
    pub stderr_writer: RotatingWriter,
}

impl LogCapture {
    pub fn new(
        stdout_path: impl Into<PathBuf>,
        stderr_path: impl Into<PathBuf>,
        config: RotationConfig,
    ) -> Result<Self> {
        Ok(Self {
            stdout_writer: RotatingWriter::open(stdout_path, config.clone())?,
            stderr_writer: RotatingWriter::open(stderr_path, config)?,
        })
    }

    /// Spawn tasks copying each stream into its writer
    ///
    /// Each task resolves to the number of lines it forwarded. Requires the
    /// multi-threaded runtime since queueing may block.
    pub fn spawn_capture(
        &self,
        stdout: Option<ChildStdout>,
        stderr: Option<ChildStderr>,
    ) -> (Option<JoinHandle<u64>>, Option<JoinHandle<u64>>) {
        let stdout_handle = stdout.map(|out| spawn_pump(out, self.stdout_writer.clone()));
        let stderr_handle = stderr.map(|err| spawn_pump(err, self.stderr_writer.clone()));
        (stdout_handle, stderr_handle)
    }

    /// Drain and close both writers
    pub fn close(&self) -> Result<()> {
        let out = self.stdout_writer.close();
        let err = self.stderr_writer.close();
        out.and(err)
    }
}

fn spawn_pump<R>(stream: R, writer: RotatingWriter) -> JoinHandle<u64>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut lines = BufReader::new(stream).lines();
        let mut count = 0u64;

        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    tokio::task::block_in_place(|| writer.write_line(line));
                    count += 1;
                }
                Ok(None) => break,
                Err(e) => {
                    debug!("Stopped reading {}: {}", writer.path().display(), e);
                    break;
                }
            }
        }
        count
    })
}
