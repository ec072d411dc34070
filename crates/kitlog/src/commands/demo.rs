//! Demo command implementation

use anyhow::Result;
use kitlog_core::{constants, ConfigFile};
use kitlog_logs::{global, Log, Logger, RotatingWriter};

use crate::cli::DemoArgs;
use crate::output::print_success;

pub async fn execute(args: DemoArgs, config: Option<&ConfigFile>) -> Result<()> {
    let (logger, target) = build_logger(&args, config)?;

    let previous = global::install(logger);
    log_samples(args.count);
    let result = global::close();
    global::install(previous);
    result?;

    print_success(&format!("Logged {} entries to {}", args.count, target));
    Ok(())
}

/// A logger over `--path`, the config's sinks, or the default demo file
fn build_logger(args: &DemoArgs, config: Option<&ConfigFile>) -> Result<(Logger, String)> {
    if args.path.is_none() {
        if let Some(config) = config {
            let target = match &config.rotate {
                Some(rotate) => rotate.path.display().to_string(),
                None => "configured sinks".to_string(),
            };
            let rotation = super::rotation_config(&args.rotate, Some(config));
            return Ok((Logger::from_config_with(config, rotation)?, target));
        }
    }

    let path = args
        .path
        .clone()
        .unwrap_or_else(|| constants::log_path("demo"));
    let writer = RotatingWriter::open(&path, super::rotation_config(&args.rotate, config))?;
    Ok((Logger::new("demo", writer), path.display().to_string()))
}

fn log_samples(count: usize) {
    let log = global::logger();
    let http = log.component("http");
    let db = log.component("db");

    for i in 0..count {
        match i % 6 {
            0 => log.info(format_args!("tick {}", i)),
            1 => http.access(format_args!("GET /items/{} 200", i)),
            2 => db.debug(format_args!("query took {}ms", i % 17)),
            3 => log.important(format_args!("checkpoint {}", i)),
            4 => db.warn(format_args!("slow query #{}", i)),
            _ => http.error(format_args!("upstream timeout on request {}", i)),
        }
    }
}
