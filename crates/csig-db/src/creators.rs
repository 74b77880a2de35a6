//! Database operations for the `creators` table.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// A row from the `creators` table.
///
/// Derived-metric columns are `NULL` until the first successful sync and stay
/// `NULL` whenever the metric is undefined for lack of data.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CreatorRow {
    pub id: i64,
    pub public_id: Uuid,
    pub slug: String,
    pub display_name: String,
    pub bio: Option<String>,
    pub youtube_channel_id: Option<String>,
    pub instagram_handle: Option<String>,
    pub tiktok_handle: Option<String>,
    pub youtube_followers: Option<i64>,
    pub instagram_followers: Option<i64>,
    pub tiktok_followers: Option<i64>,
    pub total_followers: i64,
    pub total_views: Option<i64>,
    pub video_count: Option<i64>,
    pub growth_rate_7d: Option<f64>,
    pub growth_rate_30d: Option<f64>,
    pub engagement_rate: Option<f64>,
    pub avg_views: Option<f64>,
    pub posting_frequency: Option<f64>,
    pub consistency_score: Option<i16>,
    pub authenticity_score: Option<i16>,
    pub brand_readiness_score: Option<i16>,
    pub rising_score: Option<i16>,
    pub viral_post_count: Option<i32>,
    pub shorts_percentage: Option<f64>,
    pub metrics_updated_at: Option<DateTime<Utc>>,
    pub niches: Vec<String>,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub token_expires_at: Option<DateTime<Utc>>,
    pub last_synced_at: Option<DateTime<Utc>>,
    pub sync_error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CreatorRow {
    /// Follower total from the stored per-platform counts, with `youtube`
    /// replacing the stored YouTube figure when a fresh value is known.
    #[must_use]
    pub fn total_with_youtube(&self, youtube: Option<i64>) -> i64 {
        [
            youtube.or(self.youtube_followers),
            self.instagram_followers,
            self.tiktok_followers,
        ]
        .into_iter()
        .flatten()
        .sum()
    }

    /// Whether the stored access token is missing or expires within `skew`.
    #[must_use]
    pub fn token_needs_refresh(&self, now: DateTime<Utc>, skew: chrono::Duration) -> bool {
        if self.refresh_token.is_none() {
            return false;
        }
        match (&self.access_token, self.token_expires_at) {
            (Some(_), Some(expires_at)) => expires_at <= now + skew,
            _ => true,
        }
    }
}

const CREATOR_COLUMNS: &str = "id, public_id, slug, display_name, bio, \
     youtube_channel_id, instagram_handle, tiktok_handle, \
     youtube_followers, instagram_followers, tiktok_followers, total_followers, \
     total_views, video_count, growth_rate_7d, growth_rate_30d, engagement_rate, avg_views, \
     posting_frequency, consistency_score, authenticity_score, brand_readiness_score, \
     rising_score, viral_post_count, shorts_percentage, metrics_updated_at, niches, \
     access_token, refresh_token, token_expires_at, last_synced_at, sync_error, \
     created_at, updated_at";

// ---------------------------------------------------------------------------
// Update payloads
// ---------------------------------------------------------------------------

/// Live platform figures written after a successful fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiveStatsUpdate {
    pub youtube_followers: Option<i64>,
    pub total_followers: i64,
    pub total_views: Option<i64>,
    pub video_count: Option<i64>,
}

/// Derived metrics and scores written back after recomputation.
///
/// `niches` replaces the stored tag set only when `Some`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CreatorMetricsUpdate {
    pub growth_rate_7d: Option<f64>,
    pub growth_rate_30d: Option<f64>,
    pub engagement_rate: Option<f64>,
    pub avg_views: Option<f64>,
    pub posting_frequency: Option<f64>,
    pub consistency_score: Option<i16>,
    pub authenticity_score: Option<i16>,
    pub viral_post_count: Option<i32>,
    pub shorts_percentage: Option<f64>,
    pub rising_score: i16,
    pub brand_readiness_score: i16,
    pub niches: Option<Vec<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DiscoverySort {
    #[default]
    Rising,
    Readiness,
}

impl DiscoverySort {
    fn order_by(self) -> &'static str {
        match self {
            DiscoverySort::Rising => {
                "rising_score DESC NULLS LAST, brand_readiness_score DESC NULLS LAST, id"
            }
            DiscoverySort::Readiness => {
                "brand_readiness_score DESC NULLS LAST, rising_score DESC NULLS LAST, id"
            }
        }
    }

    fn score_column(self) -> &'static str {
        match self {
            DiscoverySort::Rising => "rising_score",
            DiscoverySort::Readiness => "brand_readiness_score",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DiscoveryFilter<'a> {
    pub sort: DiscoverySort,
    /// Case-insensitive niche tag the creator must carry.
    pub niche: Option<&'a str>,
    /// Minimum value of the sort score.
    pub min_score: Option<i16>,
    pub limit: i64,
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Returns creators never synced or last synced before `stale_before`,
/// never-synced first then oldest first, capped at `limit`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_creators_due_for_sync(
    pool: &PgPool,
    stale_before: DateTime<Utc>,
    limit: i64,
) -> Result<Vec<CreatorRow>, DbError> {
    let sql = format!(
        "SELECT {CREATOR_COLUMNS} FROM creators \
         WHERE last_synced_at IS NULL OR last_synced_at < $1 \
         ORDER BY last_synced_at ASC NULLS FIRST, id \
         LIMIT $2"
    );
    let rows = sqlx::query_as::<_, CreatorRow>(&sql)
        .bind(stale_before)
        .bind(limit)
        .fetch_all(pool)
        .await?;

    Ok(rows)
}

/// Fetches a creator by internal id.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no row exists, or [`DbError::Sqlx`] if
/// the query fails.
pub async fn get_creator(pool: &PgPool, id: i64) -> Result<CreatorRow, DbError> {
    let sql = format!("SELECT {CREATOR_COLUMNS} FROM creators WHERE id = $1");
    sqlx::query_as::<_, CreatorRow>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(DbError::NotFound)
}

/// Returns a creator by public id, or `None` if not found.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_creator_by_public_id(
    pool: &PgPool,
    public_id: Uuid,
) -> Result<Option<CreatorRow>, DbError> {
    let sql = format!("SELECT {CREATOR_COLUMNS} FROM creators WHERE public_id = $1");
    let row = sqlx::query_as::<_, CreatorRow>(&sql)
        .bind(public_id)
        .fetch_optional(pool)
        .await?;

    Ok(row)
}

/// Returns every creator ordered by display name.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_all_creators(pool: &PgPool) -> Result<Vec<CreatorRow>, DbError> {
    let sql = format!("SELECT {CREATOR_COLUMNS} FROM creators ORDER BY display_name, id");
    let rows = sqlx::query_as::<_, CreatorRow>(&sql)
        .fetch_all(pool)
        .await?;

    Ok(rows)
}

/// Discovery listing sorted by rising or brand-readiness score.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_creators_for_discovery(
    pool: &PgPool,
    filter: &DiscoveryFilter<'_>,
) -> Result<Vec<CreatorRow>, DbError> {
    // Column names come from DiscoverySort, never from user input.
    let sql = format!(
        "SELECT {CREATOR_COLUMNS} FROM creators \
         WHERE ($1::TEXT IS NULL OR EXISTS ( \
                 SELECT 1 FROM unnest(niches) AS n WHERE lower(n) = lower($1))) \
           AND ($2::SMALLINT IS NULL OR {score} >= $2) \
         ORDER BY {order} \
         LIMIT $3",
        score = filter.sort.score_column(),
        order = filter.sort.order_by(),
    );
    let rows = sqlx::query_as::<_, CreatorRow>(&sql)
        .bind(filter.niche)
        .bind(filter.min_score)
        .bind(filter.limit)
        .fetch_all(pool)
        .await?;

    Ok(rows)
}

// ---------------------------------------------------------------------------
// Writes
// ---------------------------------------------------------------------------

/// Writes fresh platform figures, advances `last_synced_at` and clears any
/// previous `sync_error`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the update fails.
pub async fn update_creator_live_stats(
    pool: &PgPool,
    id: i64,
    stats: &LiveStatsUpdate,
    synced_at: DateTime<Utc>,
) -> Result<(), DbError> {
    sqlx::query(
        "UPDATE creators SET \
             youtube_followers = COALESCE($1, youtube_followers), \
             total_followers = $2, \
             total_views = COALESCE($3, total_views), \
             video_count = COALESCE($4, video_count), \
             last_synced_at = $5, \
             sync_error = NULL, \
             updated_at = NOW() \
         WHERE id = $6",
    )
    .bind(stats.youtube_followers)
    .bind(stats.total_followers)
    .bind(stats.total_views)
    .bind(stats.video_count)
    .bind(synced_at)
    .bind(id)
    .execute(pool)
    .await?;

    Ok(())
}

/// Stores a refreshed access token. A rotated refresh token replaces the
/// stored one; `None` keeps it.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the update fails.
pub async fn update_creator_tokens(
    pool: &PgPool,
    id: i64,
    access_token: &str,
    expires_at: DateTime<Utc>,
    refresh_token: Option<&str>,
) -> Result<(), DbError> {
    sqlx::query(
        "UPDATE creators SET access_token = $1, token_expires_at = $2, \
             refresh_token = COALESCE($3, refresh_token), updated_at = NOW() \
         WHERE id = $4",
    )
    .bind(access_token)
    .bind(expires_at)
    .bind(refresh_token)
    .bind(id)
    .execute(pool)
    .await?;

    Ok(())
}

/// Records why the last sync attempt failed. `last_synced_at` is left alone
/// so the creator stays due for the next run.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the update fails.
pub async fn record_creator_sync_error(
    pool: &PgPool,
    id: i64,
    message: &str,
) -> Result<(), DbError> {
    sqlx::query("UPDATE creators SET sync_error = $1, updated_at = NOW() WHERE id = $2")
        .bind(message)
        .bind(id)
        .execute(pool)
        .await?;

    Ok(())
}

/// Writes recomputed derived metrics and scores.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the update fails.
pub async fn update_creator_metrics(
    pool: &PgPool,
    id: i64,
    update: &CreatorMetricsUpdate,
) -> Result<(), DbError> {
    sqlx::query(
        "UPDATE creators SET \
             growth_rate_7d = $1, \
             growth_rate_30d = $2, \
             engagement_rate = $3, \
             avg_views = $4, \
             posting_frequency = $5, \
             consistency_score = $6, \
             authenticity_score = $7, \
             viral_post_count = $8, \
             shorts_percentage = $9, \
             rising_score = $10, \
             brand_readiness_score = $11, \
             niches = COALESCE($12, niches), \
             metrics_updated_at = NOW(), \
             updated_at = NOW() \
         WHERE id = $13",
    )
    .bind(update.growth_rate_7d)
    .bind(update.growth_rate_30d)
    .bind(update.engagement_rate)
    .bind(update.avg_views)
    .bind(update.posting_frequency)
    .bind(update.consistency_score)
    .bind(update.authenticity_score)
    .bind(update.viral_post_count)
    .bind(update.shorts_percentage)
    .bind(update.rising_score)
    .bind(update.brand_readiness_score)
    .bind(update.niches.as_deref())
    .bind(id)
    .execute(pool)
    .await?;

    Ok(())
}
