use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use std::{net::SocketAddr, sync::Arc};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use crate::{
    config::Config,
    handlers::{self, AppState},
    importer::GithubImporter,
    logging::mask_secret,
    signals::setup_signal_handlers,
    store::MetricStore,
};

/// Start the metrics API server
///
/// This function:
/// 1. Opens the SQLite store and runs migrations
/// 2. Sets up signal handlers for graceful shutdown
/// 3. Creates the Axum application
/// 4. Binds to the configured address
/// 5. Serves requests with graceful shutdown support
pub async fn start_server(config: Config) -> Result<()> {
    info!(database = %config.database.path, "Opening metrics database");
    let store = MetricStore::connect(&config.database.path).await?;
    info!("Metrics database ready ({} snapshots)", store.count().await?);

    let (shutdown_tx, signal_handle) = setup_signal_handlers();
    let mut shutdown_rx = shutdown_tx.subscribe();

    let app_state = build_state(config.clone(), store)?;
    let app = create_router(app_state);

    let addr = SocketAddr::from((
        config.server.host.parse::<std::net::IpAddr>()?,
        config.server.port,
    ));

    info!("Starting ghcp-stats on {}", addr);
    info!(
        "Configuration: {} organizations, GitHub token {}",
        config.github.orgs.len(),
        mask_secret(&config.github.token)
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.recv().await;
            info!("Shutdown signal received, draining connections...");
        })
        .await?;

    signal_handle.await?;
    info!("Server stopped gracefully");

    Ok(())
}

pub fn build_state(config: Config, store: MetricStore) -> Result<AppState> {
    let importer = GithubImporter::from_config(&config.github)?;
    Ok(AppState {
        config: Arc::new(config),
        store,
        importer: Arc::new(importer),
    })
}

/// Create the Axum router with all routes and middleware
pub fn create_router(app_state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/metrics", get(handlers::metrics::list_metrics))
        .route("/metrics/import", post(handlers::metrics::trigger_import))
        .route("/metrics/:metric_id", get(handlers::metrics::get_metric))
        .with_state(app_state);

    Router::new()
        .route("/health", get(handlers::health::health_check))
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
