//! Discovery list, creator detail and snapshot history.

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use csig_core::Platform;
use csig_db::{CreatorRow, DiscoveryFilter, DiscoverySort};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::middleware::RequestId;

use super::{map_db_error, normalize_limit, ApiError, ApiResponse, AppState};

const DEFAULT_SNAPSHOT_DAYS: i64 = 30;
const MAX_SNAPSHOT_DAYS: i64 = 365;

#[derive(Debug, Deserialize)]
pub(super) struct DiscoveryQuery {
    pub sort: Option<String>,
    pub niche: Option<String>,
    pub min_score: Option<i16>,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub(super) struct SnapshotQuery {
    pub days: Option<i64>,
}

#[derive(Debug, Serialize)]
pub(super) struct CreatorSummaryItem {
    creator_id: Uuid,
    slug: String,
    display_name: String,
    niches: Vec<String>,
    platforms: Vec<Platform>,
    total_followers: i64,
    engagement_rate: Option<f64>,
    growth_rate_7d: Option<f64>,
    rising_score: Option<i16>,
    brand_readiness_score: Option<i16>,
}

#[derive(Debug, Serialize)]
pub(super) struct CreatorDetail {
    creator_id: Uuid,
    slug: String,
    display_name: String,
    bio: Option<String>,
    niches: Vec<String>,
    platforms: Vec<Platform>,
    youtube_followers: Option<i64>,
    instagram_followers: Option<i64>,
    tiktok_followers: Option<i64>,
    total_followers: i64,
    total_views: Option<i64>,
    video_count: Option<i64>,
    metrics: CreatorMetrics,
    metrics_updated_at: Option<DateTime<Utc>>,
    last_synced_at: Option<DateTime<Utc>>,
    sync_error: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct CreatorMetrics {
    growth_rate_7d: Option<f64>,
    growth_rate_30d: Option<f64>,
    engagement_rate: Option<f64>,
    avg_views: Option<f64>,
    posting_frequency: Option<f64>,
    consistency_score: Option<i16>,
    authenticity_score: Option<i16>,
    viral_post_count: Option<i32>,
    shorts_percentage: Option<f64>,
    rising_score: Option<i16>,
    brand_readiness_score: Option<i16>,
}

#[derive(Debug, Serialize)]
pub(super) struct SnapshotItem {
    snapshot_date: NaiveDate,
    youtube_followers: Option<i64>,
    instagram_followers: Option<i64>,
    tiktok_followers: Option<i64>,
    total_followers: i64,
    total_views: Option<i64>,
}

pub(super) fn parse_sort(raw: Option<&str>) -> Option<DiscoverySort> {
    match raw.map(str::trim) {
        None | Some("" | "rising") => Some(DiscoverySort::Rising),
        Some("readiness" | "brand_readiness") => Some(DiscoverySort::Readiness),
        Some(_) => None,
    }
}

impl From<CreatorRow> for CreatorSummaryItem {
    fn from(row: CreatorRow) -> Self {
        Self {
            platforms: csig_collector::active_platforms(&row),
            creator_id: row.public_id,
            slug: row.slug,
            display_name: row.display_name,
            niches: row.niches,
            total_followers: row.total_followers,
            engagement_rate: row.engagement_rate,
            growth_rate_7d: row.growth_rate_7d,
            rising_score: row.rising_score,
            brand_readiness_score: row.brand_readiness_score,
        }
    }
}

impl From<CreatorRow> for CreatorDetail {
    fn from(row: CreatorRow) -> Self {
        Self {
            platforms: csig_collector::active_platforms(&row),
            creator_id: row.public_id,
            slug: row.slug,
            display_name: row.display_name,
            bio: row.bio,
            niches: row.niches,
            youtube_followers: row.youtube_followers,
            instagram_followers: row.instagram_followers,
            tiktok_followers: row.tiktok_followers,
            total_followers: row.total_followers,
            total_views: row.total_views,
            video_count: row.video_count,
            metrics: CreatorMetrics {
                growth_rate_7d: row.growth_rate_7d,
                growth_rate_30d: row.growth_rate_30d,
                engagement_rate: row.engagement_rate,
                avg_views: row.avg_views,
                posting_frequency: row.posting_frequency,
                consistency_score: row.consistency_score,
                authenticity_score: row.authenticity_score,
                viral_post_count: row.viral_post_count,
                shorts_percentage: row.shorts_percentage,
                rising_score: row.rising_score,
                brand_readiness_score: row.brand_readiness_score,
            },
            metrics_updated_at: row.metrics_updated_at,
            last_synced_at: row.last_synced_at,
            sync_error: row.sync_error,
        }
    }
}

pub(super) async fn list_creators(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<DiscoveryQuery>,
) -> Result<Json<ApiResponse<Vec<CreatorSummaryItem>>>, ApiError> {
    let Some(sort) = parse_sort(query.sort.as_deref()) else {
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            "sort must be 'rising' or 'readiness'",
        ));
    };
    if query.min_score.is_some_and(|s| !(0..=100).contains(&s)) {
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            "min_score must be between 0 and 100",
        ));
    }

    let filter = DiscoveryFilter {
        sort,
        niche: query.niche.as_deref().map(str::trim).filter(|n| !n.is_empty()),
        min_score: query.min_score,
        limit: normalize_limit(query.limit),
    };
    let rows = csig_db::list_creators_for_discovery(&state.pool, &filter)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let data = rows.into_iter().map(CreatorSummaryItem::from).collect();
    Ok(ApiResponse::new(data, req_id.0))
}

pub(super) async fn get_creator(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(public_id): Path<Uuid>,
) -> Result<Json<ApiResponse<CreatorDetail>>, ApiError> {
    let row = load_creator(&state, &req_id, public_id).await?;
    Ok(ApiResponse::new(CreatorDetail::from(row), req_id.0))
}

pub(super) async fn list_creator_snapshots(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(public_id): Path<Uuid>,
    Query(query): Query<SnapshotQuery>,
) -> Result<Json<ApiResponse<Vec<SnapshotItem>>>, ApiError> {
    let row = load_creator(&state, &req_id, public_id).await?;
    let days = query
        .days
        .unwrap_or(DEFAULT_SNAPSHOT_DAYS)
        .clamp(1, MAX_SNAPSHOT_DAYS);
    let since = Utc::now().date_naive() - Duration::days(days);

    let rows = csig_db::list_snapshots_since(&state.pool, row.id, since)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let data = rows
        .into_iter()
        .map(|s| SnapshotItem {
            snapshot_date: s.snapshot_date,
            youtube_followers: s.youtube_followers,
            instagram_followers: s.instagram_followers,
            tiktok_followers: s.tiktok_followers,
            total_followers: s.total_followers,
            total_views: s.total_views,
        })
        .collect();
    Ok(ApiResponse::new(data, req_id.0))
}

pub(super) async fn load_creator(
    state: &AppState,
    req_id: &RequestId,
    public_id: Uuid,
) -> Result<CreatorRow, ApiError> {
    csig_db::get_creator_by_public_id(&state.pool, public_id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?
        .ok_or_else(|| {
            ApiError::new(
                req_id.0.clone(),
                "not_found",
                format!("creator {public_id} not found"),
            )
        })
}
