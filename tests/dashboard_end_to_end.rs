// End-to-end: a metrics view reading from a live API server backed by SQLite

use ghcp_stats::config::{Config, DashboardConfig, DatabaseConfig, GithubConfig, ServerConfig};
use ghcp_stats::dashboard::{FetchStatus, MetricsFetcher, MetricsView, HEADING};
use ghcp_stats::metric::Metric;
use ghcp_stats::server::{build_state, create_router};
use ghcp_stats::store::MetricStore;
use serde_json::json;
use std::time::Duration;

fn test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8080,
            log_level: "info".to_string(),
            log_format: "text".to_string(),
        },
        database: DatabaseConfig {
            path: ":memory:".to_string(),
        },
        github: GithubConfig {
            api_base_url: "http://127.0.0.1:9".to_string(),
            api_version: "2022-11-28".to_string(),
            token: String::new(),
            orgs: Vec::new(),
            timeout_seconds: 5,
        },
        dashboard: DashboardConfig {
            url: "http://127.0.0.1:8080".to_string(),
            timeout_seconds: 5,
        },
    }
}

/// Serve the API on an ephemeral port and return its base URL
async fn spawn_server(store: MetricStore) -> String {
    let app = create_router(build_state(test_config(), store).unwrap());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

fn view_for(base_url: &str) -> MetricsView {
    MetricsView::new(MetricsFetcher::new(base_url, Duration::from_secs(5)).unwrap())
}

#[tokio::test]
async fn test_view_renders_stored_metrics() {
    let store = MetricStore::in_memory().await.unwrap();
    store
        .insert_if_absent("acme", "2024-01-01", &json!({"date": "2024-01-01", "total_active_users": 3}))
        .await
        .unwrap();
    store
        .insert_if_absent("globex", "2024-01-02", &json!({"date": "2024-01-02"}))
        .await
        .unwrap();

    let base_url = spawn_server(store).await;
    let mut view = view_for(&base_url);

    assert!(view.metrics().is_empty());
    assert!(view.activate());
    view.wait_for_update().await;

    assert_eq!(view.status(), &FetchStatus::Loaded);
    let orgs: Vec<&str> = view.metrics().iter().map(|m| m.org.as_str()).collect();
    assert_eq!(orgs, vec!["globex", "acme"]);

    let text = view.render_text();
    assert!(text.starts_with(HEADING));
    // Only the id/org/date projection is rendered
    assert!(!text.contains("total_active_users"));

    let body = text.strip_prefix(&format!("{}\n", HEADING)).unwrap();
    let parsed: Vec<Metric> = serde_json::from_str(body.trim_end()).unwrap();
    assert_eq!(parsed, view.metrics());
}

#[tokio::test]
async fn test_view_over_empty_database() {
    let store = MetricStore::in_memory().await.unwrap();
    let base_url = spawn_server(store).await;

    let mut view = view_for(&base_url);
    view.activate();
    view.wait_for_update().await;

    assert_eq!(view.status(), &FetchStatus::Loaded);
    assert_eq!(view.render_text(), format!("{}\n[]\n", HEADING));
}

#[tokio::test]
async fn test_view_against_unreachable_backend() {
    let mut view = view_for("http://127.0.0.1:9");
    view.activate();
    view.wait_for_update().await;

    assert!(view.metrics().is_empty());
    assert!(matches!(view.status(), FetchStatus::Failed(_)));
    assert!(view.render_text().contains("Error: failed to reach metrics endpoint"));
}
