//! Database operations for `creator_snapshots`.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;

use crate::DbError;

/// A row from the `creator_snapshots` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SnapshotRow {
    pub id: i64,
    pub creator_id: i64,
    pub snapshot_date: NaiveDate,
    pub youtube_followers: Option<i64>,
    pub instagram_followers: Option<i64>,
    pub tiktok_followers: Option<i64>,
    pub total_followers: i64,
    pub total_views: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Figures captured for one creator on one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotValues {
    pub youtube_followers: Option<i64>,
    pub instagram_followers: Option<i64>,
    pub tiktok_followers: Option<i64>,
    pub total_followers: i64,
    pub total_views: Option<i64>,
}

/// Outcome of [`upsert_daily_snapshot`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotUpsert {
    pub id: i64,
    /// `false` when an existing row for the same day was overwritten.
    pub inserted: bool,
}

/// Inserts the snapshot for `(creator_id, snapshot_date)` or overwrites the
/// existing one. Running twice on the same day never produces a second row.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn upsert_daily_snapshot(
    pool: &PgPool,
    creator_id: i64,
    snapshot_date: NaiveDate,
    values: &SnapshotValues,
) -> Result<SnapshotUpsert, DbError> {
    // xmax is 0 only for a freshly inserted tuple.
    let (id, inserted): (i64, bool) = sqlx::query_as(
        "INSERT INTO creator_snapshots \
             (creator_id, snapshot_date, youtube_followers, instagram_followers, \
              tiktok_followers, total_followers, total_views) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) \
         ON CONFLICT (creator_id, snapshot_date) DO UPDATE SET \
             youtube_followers   = EXCLUDED.youtube_followers, \
             instagram_followers = EXCLUDED.instagram_followers, \
             tiktok_followers    = EXCLUDED.tiktok_followers, \
             total_followers     = EXCLUDED.total_followers, \
             total_views         = EXCLUDED.total_views, \
             updated_at          = NOW() \
         RETURNING id, (xmax = 0) AS inserted",
    )
    .bind(creator_id)
    .bind(snapshot_date)
    .bind(values.youtube_followers)
    .bind(values.instagram_followers)
    .bind(values.tiktok_followers)
    .bind(values.total_followers)
    .bind(values.total_views)
    .fetch_one(pool)
    .await?;

    Ok(SnapshotUpsert { id, inserted })
}

/// Returns a creator's snapshots dated on or after `since`, oldest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_snapshots_since(
    pool: &PgPool,
    creator_id: i64,
    since: NaiveDate,
) -> Result<Vec<SnapshotRow>, DbError> {
    let rows = sqlx::query_as::<_, SnapshotRow>(
        "SELECT id, creator_id, snapshot_date, youtube_followers, instagram_followers, \
                tiktok_followers, total_followers, total_views, created_at, updated_at \
         FROM creator_snapshots \
         WHERE creator_id = $1 AND snapshot_date >= $2 \
         ORDER BY snapshot_date ASC",
    )
    .bind(creator_id)
    .bind(since)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
