//! HTTP client for the metrics collection endpoint
//!
//! Wraps a reqwest client and parses the body into typed [`Metric`]s at the
//! boundary, so a response of the wrong shape is reported instead of
//! propagated.

use reqwest::{Client, StatusCode};
use std::time::Duration;
use thiserror::Error;

use crate::metric::Metric;

/// Path of the metrics collection, relative to the backend base URL
pub const METRICS_PATH: &str = "/api/metrics";

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to reach metrics endpoint: {0}")]
    Network(#[source] reqwest::Error),
    #[error("metrics endpoint returned HTTP {0}")]
    Status(StatusCode),
    #[error("malformed metrics response: {0}")]
    MalformedResponse(String),
    #[error("metrics fetch ended without a result")]
    Interrupted,
}

/// HTTP client wrapper for fetching metrics
#[derive(Debug, Clone)]
pub struct MetricsFetcher {
    client: Client,
    url: String,
}

impl MetricsFetcher {
    /// Create a new metrics fetcher
    ///
    /// # Arguments
    /// * `base_url` - Backend base URL (e.g., "http://localhost:8080")
    /// * `timeout` - Per-request timeout
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(FetchError::Network)?;

        Ok(Self {
            client,
            url: format!("{}{}", base_url.trim_end_matches('/'), METRICS_PATH),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetch the metric collection
    ///
    /// # Errors
    /// Returns an error if:
    /// - Network request fails
    /// - Response status is not successful (2xx)
    /// - Body is not a JSON array of `{id, org, date}` objects
    pub async fn fetch(&self) -> Result<Vec<Metric>, FetchError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(FetchError::Network)?;

        if !response.status().is_success() {
            return Err(FetchError::Status(response.status()));
        }

        let body = response.bytes().await.map_err(FetchError::Network)?;

        serde_json::from_slice::<Vec<Metric>>(&body)
            .map_err(|e| FetchError::MalformedResponse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::{
        matchers::{method, path},
        Mock, MockServer, ResponseTemplate,
    };

    fn fetcher_for(server: &MockServer) -> MetricsFetcher {
        MetricsFetcher::new(&server.uri(), Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_fetcher_url() {
        let fetcher = MetricsFetcher::new("http://localhost:8080/", Duration::from_secs(1)).unwrap();
        assert_eq!(fetcher.url(), "http://localhost:8080/api/metrics");
    }

    #[tokio::test]
    async fn test_fetch_parses_metrics() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/metrics"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": 1, "org": "acme", "date": "2024-01-01", "data": {}}
            ])))
            .mount(&server)
            .await;

        let metrics = fetcher_for(&server).fetch().await.unwrap();
        assert_eq!(
            metrics,
            vec![Metric {
                id: 1,
                org: "acme".to_string(),
                date: "2024-01-01".to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn test_fetch_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/metrics"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = fetcher_for(&server).fetch().await.unwrap_err();
        assert!(matches!(err, FetchError::Status(StatusCode::INTERNAL_SERVER_ERROR)));
    }

    #[tokio::test]
    async fn test_fetch_malformed_shape() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/metrics"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": "one"}])))
            .mount(&server)
            .await;

        let err = fetcher_for(&server).fetch().await.unwrap_err();
        assert!(matches!(err, FetchError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_fetch_network_error() {
        // Nothing listens on the discard port
        let fetcher = MetricsFetcher::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
        let err = fetcher.fetch().await.unwrap_err();
        assert!(matches!(err, FetchError::Network(_)));
    }
}
