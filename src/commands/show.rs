use anyhow::Result;
use ghcp_stats::{
    config::Config,
    dashboard::{FetchStatus, MetricsFetcher, MetricsView},
};
use std::time::Duration;

/// Execute the show command
///
/// Activates a metrics view, waits for its fetch and prints the render.
/// Exits with an error when the fetch failed.
pub async fn execute(cfg: Config, url: Option<String>) -> Result<()> {
    let base_url = super::resolve_dashboard_url(url, &cfg);
    let fetcher = MetricsFetcher::new(
        &base_url,
        Duration::from_secs(cfg.dashboard.timeout_seconds),
    )?;

    let mut view = MetricsView::new(fetcher);
    view.activate();
    view.wait_for_update().await;

    print!("{}", view.render_text());

    if let FetchStatus::Failed(reason) = view.status() {
        anyhow::bail!("Failed to load metrics from {}: {}", base_url, reason);
    }

    Ok(())
}
