//! CLI argument definitions

use clap::{Args, Parser, Subcommand};
use kitlog_core::ByteSize;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "kitlog")]
#[command(version, about = "Size-bounded rotating log files")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output in JSON format instead of tables
    #[arg(long, global = true)]
    pub json: bool,

    /// Config file (toml, yaml or json)
    #[arg(long, env = "KITLOG_CONFIG", global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Copy stdin lines into a rotating log file
    Pipe(PipeArgs),

    /// Run a command, capturing its output into rotating log files
    Exec(ExecArgs),

    /// Log sample entries through the global logger
    Demo(DemoArgs),

    /// Show the last lines of a log file and its archives
    Tail(TailArgs),

    /// List a log file and its archives
    List {
        /// Active log file
        path: PathBuf,
    },
}

/// Rotation overrides shared by the writing commands
#[derive(Args, Clone, Default)]
pub struct RotateArgs {
    /// Rotate once the active file reaches this size (e.g. 512K, 10MB)
    #[arg(long, value_parser = parse_size)]
    pub max_size: Option<u64>,

    /// Number of archives to keep
    #[arg(long)]
    pub max_files: Option<usize>,

    /// Pending-line queue capacity
    #[arg(long)]
    pub queue_capacity: Option<usize>,
}

#[derive(Args)]
pub struct PipeArgs {
    /// Active log file
    pub path: PathBuf,

    #[command(flatten)]
    pub rotate: RotateArgs,
}

#[derive(Args)]
pub struct ExecArgs {
    /// Active log file for stdout; stderr goes to <stem>-err.<ext>
    pub path: PathBuf,

    #[command(flatten)]
    pub rotate: RotateArgs,

    /// Command and arguments
    #[arg(last = true, required = true)]
    pub command: Vec<String>,
}

#[derive(Args)]
pub struct DemoArgs {
    /// Number of entries to log
    #[arg(short, long, default_value = "10")]
    pub count: usize,

    /// Log file (default: ~/.kitlog/logs/demo.log, or the config's sinks)
    #[arg(long)]
    pub path: Option<PathBuf>,

    #[command(flatten)]
    pub rotate: RotateArgs,
}

#[derive(Args)]
pub struct TailArgs {
    /// Active log file
    pub path: PathBuf,

    /// Number of lines to show
    #[arg(short = 'n', long, default_value = "20")]
    pub lines: usize,

    /// Keep printing lines as they are appended
    #[arg(short, long)]
    pub follow: bool,

    /// Only show lines matching this regex
    #[arg(long)]
    pub grep: Option<String>,
}

/// Parse sizes like "1024", "512K", "10MB" into bytes
fn parse_size(s: &str) -> Result<u64, String> {
    s.parse::<ByteSize>()
        .map(ByteSize::bytes)
        .map_err(|e| e.to_string())
}
