//! Command implementations for the CLI
//!
//! This module contains the implementation of all CLI commands:
//! - serve: Start the metrics API server
//! - import: Pull Copilot metrics from GitHub into the database
//! - dashboard: Interactive terminal dashboard
//! - show: Print the metrics once
//! - config: Configuration display and validation

pub mod config;
pub mod dashboard;
pub mod import;
pub mod serve;
pub mod show;

/// Resolve the backend base URL: explicit flag first, then config
pub(crate) fn resolve_dashboard_url(
    url_override: Option<String>,
    cfg: &ghcp_stats::config::Config,
) -> String {
    url_override.unwrap_or_else(|| cfg.dashboard.url.clone())
}
