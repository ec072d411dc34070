//! Tail command implementation

use anyhow::Result;
use kitlog_logs::LogReader;
use regex::Regex;

use crate::cli::TailArgs;
use crate::output::{is_json_mode, print_info, print_logs};

pub async fn execute(args: TailArgs) -> Result<()> {
    let reader = LogReader::new(&args.path);

    // Compile grep pattern if provided
    let grep_regex = if let Some(pattern) = &args.grep {
        Some(Regex::new(pattern).map_err(|e| anyhow::anyhow!("Invalid regex pattern: {}", e))?)
    } else {
        None
    };
    let matches = |line: &str| grep_regex.as_ref().map_or(true, |re| re.is_match(line));

    let lines: Vec<String> = reader
        .tail(args.lines)?
        .into_iter()
        .filter(|line| matches(line))
        .collect();
    print_logs(&lines);

    if !args.follow {
        return Ok(());
    }

    if !reader.exists() {
        anyhow::bail!("{} does not exist", args.path.display());
    }
    if !is_json_mode() {
        print_info(&format!("Following {} (Ctrl-C to stop)", args.path.display()));
    }

    let mut rx = reader.follow()?;
    loop {
        tokio::select! {
            line = rx.recv() => match line {
                Some(line) if matches(&line) => print_logs(&[line]),
                Some(_) => {}
                None => break,
            },
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    Ok(())
}
