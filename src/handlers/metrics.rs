//! Metrics API handlers
//!
//! - `GET /api/metrics`: all stored snapshots, newest first
//! - `GET /api/metrics/{id}`: one snapshot
//! - `POST /api/metrics/import`: pull new days from GitHub

use axum::extract::{Path, State};
use axum::response::Json;
use serde_json::{json, Value};
use tracing::info;

use crate::error::AppError;
use crate::handlers::AppState;
use crate::metric::MetricRecord;

pub async fn list_metrics(
    State(state): State<AppState>,
) -> Result<Json<Vec<MetricRecord>>, AppError> {
    let records = state.store.list().await?;
    Ok(Json(records))
}

pub async fn get_metric(
    State(state): State<AppState>,
    Path(metric_id): Path<i64>,
) -> Result<Json<MetricRecord>, AppError> {
    state
        .store
        .get(metric_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Metric not found".to_string()))
}

pub async fn trigger_import(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    info!(orgs = state.config.github.orgs.len(), "Metrics import triggered");

    let summary = state
        .importer
        .import_all(&state.store, &state.config.github.orgs)
        .await?;

    Ok(Json(json!({
        "status": "imported",
        "orgs": summary.orgs,
        "fetched": summary.fetched,
        "inserted": summary.inserted,
    })))
}
