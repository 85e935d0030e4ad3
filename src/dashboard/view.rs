//! The metrics view: one fetch on activation, one collection, one render path

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::dashboard::fetcher::{FetchError, MetricsFetcher};
use crate::metric::{format_collection, Metric};

/// Heading rendered above the collection
pub const HEADING: &str = "GHCP Metrics Dashboard";

/// Progress of the view's single fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchStatus {
    /// Not yet activated, or the outstanding fetch was cancelled
    Idle,
    /// Request outstanding
    Loading,
    /// Collection replaced from a successful response
    Loaded,
    /// Request failed; the collection was left as it was
    Failed(String),
}

struct PendingFetch {
    rx: oneshot::Receiver<Result<Vec<Metric>, FetchError>>,
    handle: JoinHandle<()>,
}

/// Display unit that owns the metric collection
///
/// The collection starts empty and is only ever replaced as a whole by
/// [`MetricsView::complete_fetch`].
pub struct MetricsView {
    fetcher: MetricsFetcher,
    metrics: Vec<Metric>,
    status: FetchStatus,
    activated: bool,
    pending: Option<PendingFetch>,
}

impl MetricsView {
    pub fn new(fetcher: MetricsFetcher) -> Self {
        Self {
            fetcher,
            metrics: Vec::new(),
            status: FetchStatus::Idle,
            activated: false,
            pending: None,
        }
    }

    pub fn metrics(&self) -> &[Metric] {
        &self.metrics
    }

    pub fn status(&self) -> &FetchStatus {
        &self.status
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    /// Start the one-shot fetch
    ///
    /// Must be called from within a tokio runtime. Returns `false` when the
    /// view was already activated; no second request is issued.
    pub fn activate(&mut self) -> bool {
        if self.activated {
            return false;
        }
        self.activated = true;

        let (tx, rx) = oneshot::channel();
        let fetcher = self.fetcher.clone();
        let handle = tokio::spawn(async move {
            let result = fetcher.fetch().await;
            // The receiver is gone if the view was torn down meanwhile
            let _ = tx.send(result);
        });

        debug!(url = %self.fetcher.url(), "Metrics fetch started");
        self.status = FetchStatus::Loading;
        self.pending = Some(PendingFetch { rx, handle });
        true
    }

    /// Apply the fetch result if it has arrived, without waiting
    ///
    /// Returns `true` when the view changed and should be redrawn.
    pub fn poll_update(&mut self) -> bool {
        let Some(pending) = self.pending.as_mut() else {
            return false;
        };

        match pending.rx.try_recv() {
            Ok(result) => {
                self.pending = None;
                self.complete_fetch(result);
                true
            }
            Err(oneshot::error::TryRecvError::Empty) => false,
            Err(oneshot::error::TryRecvError::Closed) => {
                self.pending = None;
                self.complete_fetch(Err(FetchError::Interrupted));
                true
            }
        }
    }

    /// Wait for the outstanding fetch, if any, and apply its result
    pub async fn wait_for_update(&mut self) {
        let Some(pending) = self.pending.take() else {
            return;
        };

        let result = pending.rx.await.unwrap_or(Err(FetchError::Interrupted));
        self.complete_fetch(result);
    }

    /// Fetch-completion handler
    ///
    /// Success replaces the whole collection. Failure keeps the collection
    /// and records the reason for the render.
    pub fn complete_fetch(&mut self, result: Result<Vec<Metric>, FetchError>) {
        match result {
            Ok(metrics) => {
                debug!(count = metrics.len(), "Metrics fetch completed");
                self.metrics = metrics;
                self.status = FetchStatus::Loaded;
            }
            Err(e) => {
                warn!(url = %self.fetcher.url(), error = %e, "Metrics fetch failed");
                self.status = FetchStatus::Failed(e.to_string());
            }
        }
    }

    /// Cancel an outstanding fetch so its completion never reaches the view
    pub fn teardown(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.handle.abort();
            self.status = FetchStatus::Idle;
            debug!("Outstanding metrics fetch cancelled");
        }
    }

    /// Pretty-printed collection, two-space indentation
    pub fn collection_text(&self) -> String {
        format_collection(&self.metrics)
    }

    /// Heading, collection dump and, after a failure, an error line
    pub fn render_text(&self) -> String {
        let mut out = format!("{}\n{}\n", HEADING, self.collection_text());
        if let FetchStatus::Failed(reason) = &self.status {
            out.push_str(&format!("Error: {}\n", reason));
        }
        out
    }
}

impl Drop for MetricsView {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::{
        matchers::{method, path},
        Mock, MockServer, ResponseTemplate,
    };

    fn metric(id: i64, org: &str, date: &str) -> Metric {
        Metric {
            id,
            org: org.to_string(),
            date: date.to_string(),
        }
    }

    fn view_for(base_url: &str) -> MetricsView {
        MetricsView::new(MetricsFetcher::new(base_url, Duration::from_secs(5)).unwrap())
    }

    async fn mock_metrics(template: ResponseTemplate) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/metrics"))
            .respond_with(template)
            .mount(&server)
            .await;
        server
    }

    #[tokio::test]
    async fn test_initial_render_is_empty_with_heading() {
        let server = mock_metrics(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(500))
                .set_body_json(json!([{"id": 1, "org": "acme", "date": "2024-01-01"}])),
        )
        .await;

        let mut view = view_for(&server.uri());
        assert!(view.activate());
        assert!(!view.poll_update());

        assert_eq!(view.status(), &FetchStatus::Loading);
        assert!(view.metrics().is_empty());
        assert_eq!(view.render_text(), format!("{}\n[]\n", HEADING));
    }

    #[tokio::test]
    async fn test_successful_population() {
        let server = mock_metrics(
            ResponseTemplate::new(200)
                .set_body_json(json!([{"id": 1, "org": "acme", "date": "2024-01-01"}])),
        )
        .await;

        let mut view = view_for(&server.uri());
        view.activate();
        view.wait_for_update().await;

        assert_eq!(view.status(), &FetchStatus::Loaded);
        assert_eq!(view.metrics(), &[metric(1, "acme", "2024-01-01")]);

        let text = view.render_text();
        assert!(text.starts_with(HEADING));
        assert!(text.contains("\"id\": 1"));
        assert!(text.contains("\"org\": \"acme\""));
        assert!(text.contains("\"date\": \"2024-01-01\""));
        assert!(!text.contains("Error:"));
    }

    #[tokio::test]
    async fn test_activation_is_one_shot() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/metrics"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let mut view = view_for(&server.uri());
        assert!(view.activate());
        assert!(!view.activate());
        view.wait_for_update().await;
        assert!(!view.activate());
        assert_eq!(view.status(), &FetchStatus::Loaded);
        // MockServer verifies the single request on drop
    }

    #[tokio::test]
    async fn test_completion_replaces_instead_of_appending() {
        let mut view = view_for("http://127.0.0.1:9");

        view.complete_fetch(Ok(vec![
            metric(1, "acme", "2024-01-01"),
            metric(2, "acme", "2024-01-02"),
        ]));
        view.complete_fetch(Ok(vec![metric(3, "globex", "2024-02-01")]));

        assert_eq!(view.metrics(), &[metric(3, "globex", "2024-02-01")]);
    }

    #[tokio::test]
    async fn test_failure_keeps_collection_and_shows_indicator() {
        let server = mock_metrics(ResponseTemplate::new(503)).await;

        let mut view = view_for(&server.uri());
        view.activate();
        view.wait_for_update().await;

        assert!(view.metrics().is_empty());
        assert!(matches!(view.status(), FetchStatus::Failed(_)));

        let text = view.render_text();
        assert!(text.starts_with(&format!("{}\n[]\n", HEADING)));
        assert!(text.contains("Error: metrics endpoint returned HTTP 503"));
    }

    #[tokio::test]
    async fn test_malformed_response_is_reported() {
        let server = mock_metrics(
            ResponseTemplate::new(200).set_body_json(json!({"metrics": []})),
        )
        .await;

        let mut view = view_for(&server.uri());
        view.activate();
        view.wait_for_update().await;

        assert!(view.metrics().is_empty());
        assert!(view.render_text().contains("malformed metrics response"));
    }

    #[tokio::test]
    async fn test_teardown_cancels_outstanding_fetch() {
        let server = mock_metrics(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_secs(5))
                .set_body_json(json!([{"id": 1, "org": "acme", "date": "2024-01-01"}])),
        )
        .await;

        let mut view = view_for(&server.uri());
        view.activate();
        assert_eq!(view.status(), &FetchStatus::Loading);
        view.teardown();

        assert!(!view.is_loading());
        assert_eq!(view.status(), &FetchStatus::Idle);
        assert!(!view.poll_update());
        view.wait_for_update().await;
        assert!(view.metrics().is_empty());
        assert_eq!(view.status(), &FetchStatus::Idle);
        assert!(!view.render_text().contains("Error:"));
    }

    #[tokio::test]
    async fn test_teardown_after_completion_keeps_status() {
        let server = mock_metrics(
            ResponseTemplate::new(200)
                .set_body_json(json!([{"id": 1, "org": "acme", "date": "2024-01-01"}])),
        )
        .await;

        let mut view = view_for(&server.uri());
        view.activate();
        view.wait_for_update().await;
        view.teardown();

        assert_eq!(view.status(), &FetchStatus::Loaded);
        assert_eq!(view.metrics(), &[metric(1, "acme", "2024-01-01")]);
    }

    #[tokio::test]
    async fn test_poll_update_applies_result() {
        let server = mock_metrics(
            ResponseTemplate::new(200)
                .set_body_json(json!([{"id": 5, "org": "acme", "date": "2024-03-01"}])),
        )
        .await;

        let mut view = view_for(&server.uri());
        view.activate();

        let mut changed = false;
        for _ in 0..100 {
            if view.poll_update() {
                changed = true;
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }

        assert!(changed);
        assert_eq!(view.metrics(), &[metric(5, "acme", "2024-03-01")]);
    }

    #[test]
    fn test_render_round_trips_collection() {
        let collections = vec![
            vec![],
            vec![metric(1, "acme", "2024-01-01")],
            vec![
                metric(2, "globex", "2024-01-03"),
                metric(1, "acme \"quoted\"", "2024-01-01"),
                metric(9, "initech", ""),
            ],
        ];

        for collection in collections {
            let mut view = view_for("http://127.0.0.1:9");
            view.metrics = collection.clone();

            let text = view.render_text();
            let body = text
                .strip_prefix(&format!("{}\n", HEADING))
                .unwrap();
            let parsed: Vec<Metric> = serde_json::from_str(body.trim_end()).unwrap();
            assert_eq!(parsed, collection);
        }
    }
}
