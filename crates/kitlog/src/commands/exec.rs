//! Exec command implementation

use anyhow::{Context, Result};
use kitlog_core::ConfigFile;
use kitlog_logs::LogCapture;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::cli::ExecArgs;
use crate::output::{print_stats, StatsJson};

/// Run the command and return its exit code
pub async fn execute(args: ExecArgs, config: Option<&ConfigFile>) -> Result<i32> {
    let rotation = super::rotation_config(&args.rotate, config);
    let err_path = stderr_path(&args.path);
    let capture = LogCapture::new(&args.path, &err_path, rotation)?;

    let (program, program_args) = args
        .command
        .split_first()
        .context("No command given")?;

    let mut child = Command::new(program)
        .args(program_args)
        .stdin(Stdio::inherit())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .with_context(|| format!("Failed to start {}", program))?;
    debug!("Started {} (pid {:?})", program, child.id());

    let (out, err) = capture.spawn_capture(child.stdout.take(), child.stderr.take());
    let status = child.wait().await?;

    for handle in [out, err].into_iter().flatten() {
        if let Err(e) = handle.await {
            warn!("Capture task failed: {}", e);
        }
    }
    capture.close()?;

    print_stats(&[
        StatsJson::new(capture.stdout_writer.path(), &capture.stdout_writer.stats()),
        StatsJson::new(capture.stderr_writer.path(), &capture.stderr_writer.stats()),
    ]);

    Ok(exit_code(status))
}

/// `logs/app.log` -> `logs/app-err.log`
pub fn stderr_path(path: &Path) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match path.extension() {
        Some(ext) => format!("{}-err.{}", stem, ext.to_string_lossy()),
        None => format!("{}-err", stem),
    };
    path.with_file_name(name)
}

#[cfg(unix)]
fn exit_code(status: std::process::ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    status
        .code()
        .or_else(|| status.signal().map(|s| 128 + s))
        .unwrap_or(1)
}

#[cfg(not(unix))]
fn exit_code(status: std::process::ExitStatus) -> i32 {
    status.code().unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stderr_path() {
        assert_eq!(stderr_path(Path::new("logs/app.log")), PathBuf::from("logs/app-err.log"));
        assert_eq!(stderr_path(Path::new("app")), PathBuf::from("app-err"));
        assert_eq!(
            stderr_path(Path::new("/var/log/svc.out.txt")),
            PathBuf::from("/var/log/svc.out-err.txt")
        );
    }
}
