pub mod health;
pub mod metrics;

use std::sync::Arc;

use crate::config::Config;
use crate::importer::GithubImporter;
use crate::store::MetricStore;

/// State shared by the metrics API handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: MetricStore,
    pub importer: Arc<GithubImporter>,
}
