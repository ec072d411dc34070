//! Pipe command implementation

use anyhow::Result;
use kitlog_core::ConfigFile;
use kitlog_logs::RotatingWriter;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use crate::cli::PipeArgs;
use crate::output::{print_stats, StatsJson};

pub async fn execute(args: PipeArgs, config: Option<&ConfigFile>) -> Result<()> {
    let rotation = super::rotation_config(&args.rotate, config);
    let writer = RotatingWriter::open(&args.path, rotation)?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        // Queueing may block on back-pressure
        tokio::task::block_in_place(|| writer.write_line(line));
    }
    debug!("stdin closed, draining {}", writer.path().display());

    writer.close()?;
    print_stats(&[StatsJson::new(writer.path(), &writer.stats())]);
    Ok(())
}
