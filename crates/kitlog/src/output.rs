//! Terminal and JSON output formatting

use chrono::{DateTime, Local};
use colored::Colorize;
use kitlog_logs::WriterStats;
use serde::Serialize;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::SystemTime;
use tabled::{
    settings::{object::Columns, Alignment, Modify, Style},
    Table, Tabled,
};

/// Global flag for JSON output mode
static JSON_MODE: AtomicBool = AtomicBool::new(false);

/// Enable or disable JSON output mode
pub fn set_json_mode(enabled: bool) {
    JSON_MODE.store(enabled, Ordering::SeqCst);
}

/// Check if JSON output mode is enabled
pub fn is_json_mode() -> bool {
    JSON_MODE.load(Ordering::SeqCst)
}

/// One file of a rotated set, as listed
#[derive(Debug, Clone, Serialize)]
pub struct LogFileJson {
    /// `None` for the active file
    pub index: Option<usize>,
    pub file: String,
    pub size_bytes: u64,
    pub modified: Option<String>,
}

impl LogFileJson {
    pub fn from_path(index: Option<usize>, path: &Path) -> Self {
        let meta = std::fs::metadata(path).ok();
        Self {
            index,
            file: path.display().to_string(),
            size_bytes: meta.as_ref().map(|m| m.len()).unwrap_or(0),
            modified: meta
                .and_then(|m| m.modified().ok())
                .map(format_time),
        }
    }
}

#[derive(Tabled)]
pub struct LogFileRow {
    #[tabled(rename = "#")]
    pub index: String,
    #[tabled(rename = "file")]
    pub file: String,
    #[tabled(rename = "size")]
    pub size: String,
    #[tabled(rename = "modified")]
    pub modified: String,
}

impl From<&LogFileJson> for LogFileRow {
    fn from(f: &LogFileJson) -> Self {
        LogFileRow {
            index: f
                .index
                .map(|i| i.to_string())
                .unwrap_or_else(|| "active".green().to_string()),
            file: f.file.clone(),
            size: format_bytes(f.size_bytes),
            modified: f.modified.clone().unwrap_or_else(|| "-".to_string()),
        }
    }
}

pub fn print_file_table(files: &[LogFileJson]) {
    if is_json_mode() {
        print_json(&files);
        return;
    }

    if files.is_empty() {
        println!("No log files");
        return;
    }

    let rows: Vec<LogFileRow> = files.iter().map(LogFileRow::from).collect();

    let table = Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::single(0)).with(Alignment::right()))
        .with(Modify::new(Columns::single(2)).with(Alignment::right()))
        .to_string();

    println!("{}", table);
}

/// Writer counters after a run
#[derive(Debug, Serialize)]
pub struct StatsJson {
    pub path: String,
    pub lines_written: u64,
    pub bytes_written: u64,
    pub rotations: u64,
    pub write_errors: u64,
    pub lines_dropped: u64,
}

impl StatsJson {
    pub fn new(path: &Path, stats: &WriterStats) -> Self {
        StatsJson {
            path: path.display().to_string(),
            lines_written: stats.lines_written,
            bytes_written: stats.bytes_written,
            rotations: stats.rotations,
            write_errors: stats.write_errors,
            lines_dropped: stats.lines_dropped,
        }
    }
}

pub fn print_stats(stats: &[StatsJson]) {
    if is_json_mode() {
        print_json(&stats);
        return;
    }

    for s in stats {
        print_success(&format!(
            "{} lines ({}) written to {}, {} rotation(s)",
            s.lines_written,
            format_bytes(s.bytes_written),
            s.path,
            s.rotations
        ));
        if s.write_errors > 0 || s.lines_dropped > 0 {
            print_error(&format!(
                "{} write error(s), {} line(s) dropped",
                s.write_errors, s.lines_dropped
            ));
        }
    }
}

pub fn format_bytes(bytes: u64) -> String {
    if bytes >= 1_073_741_824 {
        format!("{:.1}G", bytes as f64 / 1_073_741_824.0)
    } else if bytes >= 1_048_576 {
        format!("{:.1}M", bytes as f64 / 1_048_576.0)
    } else if bytes >= 1024 {
        format!("{:.0}K", bytes as f64 / 1024.0)
    } else {
        format!("{}B", bytes)
    }
}

pub fn format_time(time: SystemTime) -> String {
    let time: DateTime<Local> = time.into();
    time.format("%Y-%m-%d %H:%M:%S").to_string()
}

pub fn print_success(message: &str) {
    println!("{} {}", "✓".green(), message);
}

pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red(), message);
}

pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue(), message);
}

/// Print log lines, as a JSON array in JSON mode
pub fn print_logs(lines: &[String]) {
    if is_json_mode() {
        print_json(&lines);
        return;
    }

    for line in lines {
        println!("{}", line);
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Error serializing to JSON: {}", e),
    }
}
