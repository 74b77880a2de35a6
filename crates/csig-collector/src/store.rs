//! Persistence seam for the collector.
//!
//! [`CreatorStore`] names exactly the reads and writes a sync performs so the
//! batch logic can run against Postgres ([`PgStore`]) or an in-memory fake.

use std::future::Future;

use chrono::{DateTime, NaiveDate, Utc};
use csig_core::NormalizedContentItem;
use csig_db::{
    ContentRow, CreatorMetricsUpdate, CreatorRow, DbError, LiveStatsUpdate, SnapshotRow,
    SnapshotUpsert, SnapshotValues,
};
use sqlx::PgPool;

pub trait CreatorStore: Send + Sync {
    fn list_due(
        &self,
        stale_before: DateTime<Utc>,
        limit: i64,
    ) -> impl Future<Output = Result<Vec<CreatorRow>, DbError>> + Send;

    fn save_tokens(
        &self,
        creator_id: i64,
        access_token: &str,
        expires_at: DateTime<Utc>,
        refresh_token: Option<&str>,
    ) -> impl Future<Output = Result<(), DbError>> + Send;

    fn record_sync_error(
        &self,
        creator_id: i64,
        message: &str,
    ) -> impl Future<Output = Result<(), DbError>> + Send;

    fn upsert_snapshot(
        &self,
        creator_id: i64,
        date: NaiveDate,
        values: &SnapshotValues,
    ) -> impl Future<Output = Result<SnapshotUpsert, DbError>> + Send;

    fn upsert_content(
        &self,
        creator_id: i64,
        item: &NormalizedContentItem,
    ) -> impl Future<Output = Result<i64, DbError>> + Send;

    fn update_live_stats(
        &self,
        creator_id: i64,
        stats: &LiveStatsUpdate,
        synced_at: DateTime<Utc>,
    ) -> impl Future<Output = Result<(), DbError>> + Send;

    fn snapshots_since(
        &self,
        creator_id: i64,
        since: NaiveDate,
    ) -> impl Future<Output = Result<Vec<SnapshotRow>, DbError>> + Send;

    fn recent_content(
        &self,
        creator_id: i64,
        limit: i64,
    ) -> impl Future<Output = Result<Vec<ContentRow>, DbError>> + Send;

    fn update_metrics(
        &self,
        creator_id: i64,
        update: &CreatorMetricsUpdate,
    ) -> impl Future<Output = Result<(), DbError>> + Send;
}

/// [`CreatorStore`] backed by the Postgres tables in `csig-db`.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl CreatorStore for PgStore {
    async fn list_due(
        &self,
        stale_before: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<CreatorRow>, DbError> {
        csig_db::list_creators_due_for_sync(&self.pool, stale_before, limit).await
    }

    async fn save_tokens(
        &self,
        creator_id: i64,
        access_token: &str,
        expires_at: DateTime<Utc>,
        refresh_token: Option<&str>,
    ) -> Result<(), DbError> {
        csig_db::update_creator_tokens(
            &self.pool,
            creator_id,
            access_token,
            expires_at,
            refresh_token,
        )
        .await
    }

    async fn record_sync_error(&self, creator_id: i64, message: &str) -> Result<(), DbError> {
        csig_db::record_creator_sync_error(&self.pool, creator_id, message).await
    }

    async fn upsert_snapshot(
        &self,
        creator_id: i64,
        date: NaiveDate,
        values: &SnapshotValues,
    ) -> Result<SnapshotUpsert, DbError> {
        csig_db::upsert_daily_snapshot(&self.pool, creator_id, date, values).await
    }

    async fn upsert_content(
        &self,
        creator_id: i64,
        item: &NormalizedContentItem,
    ) -> Result<i64, DbError> {
        csig_db::upsert_content_item(&self.pool, creator_id, item).await
    }

    async fn update_live_stats(
        &self,
        creator_id: i64,
        stats: &LiveStatsUpdate,
        synced_at: DateTime<Utc>,
    ) -> Result<(), DbError> {
        csig_db::update_creator_live_stats(&self.pool, creator_id, stats, synced_at).await
    }

    async fn snapshots_since(
        &self,
        creator_id: i64,
        since: NaiveDate,
    ) -> Result<Vec<SnapshotRow>, DbError> {
        csig_db::list_snapshots_since(&self.pool, creator_id, since).await
    }

    async fn recent_content(&self, creator_id: i64, limit: i64) -> Result<Vec<ContentRow>, DbError> {
        csig_db::list_recent_content(&self.pool, creator_id, limit).await
    }

    async fn update_metrics(
        &self,
        creator_id: i64,
        update: &CreatorMetricsUpdate,
    ) -> Result<(), DbError> {
        csig_db::update_creator_metrics(&self.pool, creator_id, update).await
    }
}
