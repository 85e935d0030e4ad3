//! GitHub Copilot metrics importer
//!
//! Pulls the daily metrics of each configured organization from
//! `GET /orgs/{org}/copilot/metrics`, following `Link` pagination, and
//! stores every day that is not already known.

use reqwest::header::{ACCEPT, AUTHORIZATION, LINK};
use reqwest::{Client, Url};
use serde::Serialize;
use std::collections::HashSet;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::config::GithubConfig;
use crate::store::MetricStore;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("GitHub token not configured")]
    MissingToken,
    #[error("request to GitHub failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("unexpected GitHub response for {org}: {reason}")]
    InvalidResponse { org: String, reason: String },
    #[error("failed to store metrics: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub orgs: usize,
    pub fetched: usize,
    pub inserted: usize,
}

pub struct GithubImporter {
    client: Client,
    api_base_url: String,
    token: String,
    api_version: String,
}

impl GithubImporter {
    pub fn new(
        api_base_url: impl Into<String>,
        token: impl Into<String>,
        api_version: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ImportError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_base_url: api_base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
            api_version: api_version.into(),
        })
    }

    pub fn from_config(cfg: &GithubConfig) -> Result<Self, ImportError> {
        Self::new(
            cfg.api_base_url.clone(),
            cfg.token.clone(),
            cfg.api_version.clone(),
            Duration::from_secs(cfg.timeout_seconds),
        )
    }

    /// Fetch every metrics day GitHub returns for `org`
    ///
    /// A non-200 page is logged and ends pagination; the days collected so
    /// far are still returned. `next` links are only followed on the API's
    /// own origin and never to a page already fetched.
    pub async fn fetch_org_metrics(&self, org: &str) -> Result<Vec<serde_json::Value>, ImportError> {
        let mut next_url = Some(format!("{}/orgs/{}/copilot/metrics", self.api_base_url, org));
        let mut visited = HashSet::new();
        let mut days = Vec::new();

        while let Some(url) = next_url.take() {
            visited.insert(url.clone());
            let response = self
                .client
                .get(&url)
                .header(ACCEPT, "application/vnd.github+json")
                .header(AUTHORIZATION, format!("Bearer {}", self.token))
                .header("X-GitHub-Api-Version", &self.api_version)
                .header(reqwest::header::USER_AGENT, concat!("ghcp-stats/", env!("CARGO_PKG_VERSION")))
                .send()
                .await?;

            let status = response.status();
            if status != reqwest::StatusCode::OK {
                let body = response.text().await.unwrap_or_default();
                error!(org = %org, status = %status, body = %body, "Error fetching metrics");
                break;
            }

            next_url = match response
                .headers()
                .get(LINK)
                .and_then(|value| value.to_str().ok())
                .and_then(parse_next_link)
            {
                Some(next) if !same_origin(&self.api_base_url, &next) => {
                    warn!(org = %org, next = %next, "Ignoring pagination link outside the API host");
                    None
                }
                Some(next) if visited.contains(&next) => {
                    warn!(org = %org, next = %next, "Pagination link points at a fetched page");
                    None
                }
                other => other,
            };

            let page: serde_json::Value = response.json().await?;
            match page {
                serde_json::Value::Array(items) => days.extend(items),
                other => {
                    return Err(ImportError::InvalidResponse {
                        org: org.to_string(),
                        reason: format!("expected a JSON array, got {}", json_kind(&other)),
                    })
                }
            }
        }

        Ok(days)
    }

    /// Fetch and store metrics for every org
    pub async fn import_all(
        &self,
        store: &MetricStore,
        orgs: &[String],
    ) -> Result<ImportSummary, ImportError> {
        if self.token.is_empty() {
            return Err(ImportError::MissingToken);
        }

        let mut summary = ImportSummary::default();
        for org in orgs {
            let days = self.fetch_org_metrics(org).await?;
            let inserted = if days.is_empty() {
                0
            } else {
                store.store_org_metrics(org, &days).await?
            };

            info!(org = %org, fetched = days.len(), inserted, "Imported metrics");
            summary.orgs += 1;
            summary.fetched += days.len();
            summary.inserted += inserted;
        }

        Ok(summary)
    }
}

/// Extract the `rel="next"` target from a `Link` header
pub fn parse_next_link(header: &str) -> Option<String> {
    header
        .split(',')
        .find(|link| link.contains("rel=\"next\""))
        .and_then(|link| {
            let start = link.find('<')? + 1;
            let end = link.find('>')?;
            (start < end).then(|| link[start..end].to_string())
        })
}

/// Whether `url` shares scheme, host and port with `base`
fn same_origin(base: &str, url: &str) -> bool {
    match (Url::parse(base), Url::parse(url)) {
        (Ok(base), Ok(url)) => base.origin() == url.origin(),
        _ => false,
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
