//! Database operations for `creator_content`.

use chrono::{DateTime, Utc};
use csig_core::NormalizedContentItem;
use sqlx::PgPool;

use crate::DbError;

/// A row from the `creator_content` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ContentRow {
    pub id: i64,
    pub creator_id: i64,
    pub platform: String,
    pub external_id: String,
    pub title: Option<String>,
    pub views: Option<i64>,
    pub likes: Option<i64>,
    pub comments: Option<i64>,
    pub posted_at: Option<DateTime<Utc>>,
    pub duration_secs: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Inserts or refreshes one post keyed by `(creator_id, platform, external_id)`.
///
/// Counters are overwritten with the latest values; a counter the platform
/// stopped reporting keeps its previous value.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn upsert_content_item(
    pool: &PgPool,
    creator_id: i64,
    item: &NormalizedContentItem,
) -> Result<i64, DbError> {
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO creator_content \
             (creator_id, platform, external_id, title, views, likes, comments, \
              posted_at, duration_secs) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
         ON CONFLICT (creator_id, platform, external_id) DO UPDATE SET \
             title         = COALESCE(EXCLUDED.title, creator_content.title), \
             views         = COALESCE(EXCLUDED.views, creator_content.views), \
             likes         = COALESCE(EXCLUDED.likes, creator_content.likes), \
             comments      = COALESCE(EXCLUDED.comments, creator_content.comments), \
             posted_at     = COALESCE(EXCLUDED.posted_at, creator_content.posted_at), \
             duration_secs = COALESCE(EXCLUDED.duration_secs, creator_content.duration_secs), \
             updated_at    = NOW() \
         RETURNING id",
    )
    .bind(creator_id)
    .bind(item.platform.as_str())
    .bind(&item.external_id)
    .bind(&item.title)
    .bind(item.views)
    .bind(item.likes)
    .bind(item.comments)
    .bind(item.posted_at)
    .bind(item.duration_secs)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// Returns a creator's `limit` most recent posts, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_recent_content(
    pool: &PgPool,
    creator_id: i64,
    limit: i64,
) -> Result<Vec<ContentRow>, DbError> {
    let rows = sqlx::query_as::<_, ContentRow>(
        "SELECT id, creator_id, platform, external_id, title, views, likes, comments, \
                posted_at, duration_secs, created_at, updated_at \
         FROM creator_content \
         WHERE creator_id = $1 \
         ORDER BY posted_at DESC NULLS LAST, id DESC \
         LIMIT $2",
    )
    .bind(creator_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
