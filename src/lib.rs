pub mod config;
pub mod dashboard;
pub mod error;
pub mod handlers;
pub mod importer;
pub mod logging;
pub mod metric;
pub mod server;
pub mod signals;
pub mod store;

use std::path::Path;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// Initialize tracing/logging to stderr
///
/// `RUST_LOG` takes precedence over `default_level`. This function can only
/// be called once per process.
pub fn init_tracing(default_level: &str, json: bool) {
    let registry = tracing_subscriber::registry().with(env_filter(default_level));

    if json {
        registry
            .with(fmt::layer().json().with_target(true).with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    }
}

/// Initialize tracing into a log file
///
/// Used by the interactive dashboard, which owns the terminal. The returned
/// guard must be kept alive to flush buffered lines.
pub fn init_file_tracing(
    default_level: &str,
    log_file: &Path,
) -> tracing_appender::non_blocking::WorkerGuard {
    let directory = log_file
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = log_file
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "ghcp-stats.log".into());

    let appender = tracing_appender::rolling::never(directory, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(env_filter(default_level))
        .with(fmt::layer().with_ansi(false).with_target(true).with_writer(writer))
        .init();

    guard
}
