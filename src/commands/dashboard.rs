//! Dashboard command implementation
//!
//! Hosts one metrics view in a full-screen terminal UI. The view fetches once
//! when the screen opens; leaving the screen tears it down.

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{io, time::Duration};
use tracing::info;

use ghcp_stats::{
    config::Config,
    dashboard::{DashboardApp, MetricsFetcher, MetricsView},
};

/// Execute the dashboard command
///
/// # Arguments
/// * `cfg` - Loaded configuration
/// * `url` - Optional backend base URL (taken from config if None)
pub async fn execute(cfg: Config, url: Option<String>) -> Result<()> {
    let base_url = super::resolve_dashboard_url(url, &cfg);
    let fetcher = MetricsFetcher::new(
        &base_url,
        Duration::from_secs(cfg.dashboard.timeout_seconds),
    )?;

    info!(url = %fetcher.url(), "Opening metrics dashboard");
    run_dashboard(MetricsView::new(fetcher)).await
}

async fn run_dashboard(view: MetricsView) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let mut app = DashboardApp::new(view);
    app.view.activate();

    let result = event_loop(&mut terminal, &mut app).await;

    app.view.teardown();

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

async fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut DashboardApp,
) -> Result<()> {
    loop {
        terminal.draw(|f| app.render(f))?;

        // Keyboard polling blocks, so hand it to the blocking pool and keep
        // the runtime free for the fetch task
        let key = tokio::task::spawn_blocking(|| -> io::Result<Option<Event>> {
            if event::poll(Duration::from_millis(100))? {
                Ok(Some(event::read()?))
            } else {
                Ok(None)
            }
        })
        .await??;

        if let Some(Event::Key(key)) = key {
            if key.kind == KeyEventKind::Press && app.handle_key(key) {
                return Ok(());
            }
        }

        app.tick();
    }
}
