use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use csig_collector::{
    run_recorded_sync, CollectorError, PgStore, SyncOptions, SyncRunReport, SyncTrigger,
    YouTubeSource,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::middleware::RequestId;

use super::{map_db_error, normalize_limit, ApiError, ApiResponse, AppState};

/// Why a sync did not produce a run report.
#[derive(Debug)]
pub(crate) enum SyncFailure {
    /// Another batch holds the sync lock.
    Busy,
    Collector(CollectorError),
}

impl std::fmt::Display for SyncFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SyncFailure::Busy => f.write_str("a sync is already running"),
            SyncFailure::Collector(e) => write!(f, "{e}"),
        }
    }
}

/// Runs one recorded batch unless another is already in flight.
///
/// Credentials are resolved before the ledger row is created, so a missing
/// API key never leaves a failed run behind.
pub(crate) async fn run_locked_sync(
    state: &AppState,
    trigger: SyncTrigger,
) -> Result<SyncRunReport, SyncFailure> {
    let Ok(_guard) = state.sync_lock.try_lock() else {
        return Err(SyncFailure::Busy);
    };

    let platform = YouTubeSource::from_app_config(&state.config).map_err(SyncFailure::Collector)?;
    let store = PgStore::new(state.pool.clone());
    let options = SyncOptions::from_app_config(&state.config);

    run_recorded_sync(&state.pool, &store, &platform, &options, trigger)
        .await
        .map_err(SyncFailure::Collector)
}

#[derive(Debug, Serialize)]
pub(super) struct SyncResultData {
    run_id: Uuid,
    status: String,
    processed: u32,
    errors: u32,
    snapshots_created: u32,
}

impl From<SyncRunReport> for SyncResultData {
    fn from(report: SyncRunReport) -> Self {
        Self {
            run_id: report.run.public_id,
            status: report.run.status,
            processed: report.summary.processed,
            errors: report.summary.errors,
            snapshots_created: report.summary.snapshots_created,
        }
    }
}

pub(super) async fn trigger_sync(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<SyncResultData>>, ApiError> {
    match run_locked_sync(&state, SyncTrigger::Api).await {
        Ok(report) => Ok(ApiResponse::new(SyncResultData::from(report), req_id.0)),
        Err(SyncFailure::Busy) => Err(ApiError::new(
            req_id.0,
            "conflict",
            "a sync is already running",
        )),
        Err(SyncFailure::Collector(e)) if e.is_fatal() => {
            tracing::error!(error = %e, "sync: refusing to start");
            Err(ApiError::new(req_id.0, "configuration_error", e.to_string()))
        }
        Err(SyncFailure::Collector(e)) => {
            tracing::error!(error = %e, "sync: run failed");
            Err(ApiError::new(req_id.0, "internal_error", "sync run failed"))
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct SyncRunsQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub(super) struct SyncRunItem {
    sync_run_id: Uuid,
    trigger_source: String,
    status: String,
    started_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
    creators_processed: i32,
    errors: i32,
    snapshots_created: i32,
    error_message: Option<String>,
    created_at: DateTime<Utc>,
}

pub(super) async fn list_sync_runs(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<SyncRunsQuery>,
) -> Result<Json<ApiResponse<Vec<SyncRunItem>>>, ApiError> {
    let rows = csig_db::list_sync_runs(&state.pool, normalize_limit(query.limit))
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let data = rows
        .into_iter()
        .map(|row| SyncRunItem {
            sync_run_id: row.public_id,
            trigger_source: row.trigger_source,
            status: row.status,
            started_at: row.started_at,
            completed_at: row.completed_at,
            creators_processed: row.creators_processed,
            errors: row.errors,
            snapshots_created: row.snapshots_created,
            error_message: row.error_message,
            created_at: row.created_at,
        })
        .collect();

    Ok(ApiResponse::new(data, req_id.0))
}
