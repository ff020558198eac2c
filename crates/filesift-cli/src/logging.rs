use std::env;
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_LOG_FILE: &str = "./logs/filesift.log";

/// Directive used when `TRACING_LEVEL` is unset. Only the organizer's own
/// crates are raised by `-v`; dependencies stay at `warn`.
fn default_directive(verbosity: u8) -> String {
    let level = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    format!("warn,filesift_core={level},filesift={level}")
}

/// Splits `LOG_FILE_PATH` into the directory and file name the appender wants.
fn log_location(raw: &str) -> (PathBuf, PathBuf) {
    let path = Path::new(raw);
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file = path
        .file_name()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("filesift.log"));
    (dir.to_path_buf(), file)
}

/// Console output is terse and coloured; the log file keeps timestamps and
/// targets so a run's moves can be audited afterwards.
pub fn init_logger(verbosity: u8) -> impl Drop {
    let filter = env::var("TRACING_LEVEL").unwrap_or_else(|_| default_directive(verbosity));
    let filter_layer = EnvFilter::new(filter);

    let log_file_path = env::var("LOG_FILE_PATH").unwrap_or_else(|_| DEFAULT_LOG_FILE.to_string());
    let (log_dir, log_file) = log_location(&log_file_path);
    let file_appender = tracing_appender::rolling::never(&log_dir, &log_file);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stdout)
                .compact()
                .with_target(false)
                .without_time()
                .with_ansi(true),
        )
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_target(true)
                .with_ansi(false),
        )
        .with(filter_layer)
        .init();

    debug!(
        "Run log appending to {}",
        log_dir.join(&log_file).display()
    );

    guard
}
