//! Metrics dashboard
//!
//! A [`MetricsView`] fetches the metric collection from the backend once on
//! activation and renders it as a heading plus indented JSON. The `ui`
//! module draws a view in the terminal.

pub mod fetcher;
pub mod ui;
pub mod view;

pub use fetcher::{FetchError, MetricsFetcher, METRICS_PATH};
pub use ui::DashboardApp;
pub use view::{FetchStatus, MetricsView, HEADING};
