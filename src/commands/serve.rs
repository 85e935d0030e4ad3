use anyhow::Result;
use colored::Colorize;
use ghcp_stats::{config::Config, server};
use tracing::info;

/// Execute the serve command
///
/// Runs the metrics API in the foreground until SIGINT/SIGTERM.
pub async fn execute(cfg: Config) -> Result<()> {
    println!("{}", "Starting ghcp-stats server...".green());
    info!("Starting ghcp-stats in foreground mode");

    server::start_server(cfg).await
}
