//! Bounded batch sync: select due creators, fetch, snapshot, recompute.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use csig_core::AppConfig;
use csig_db::{CreatorMetricsUpdate, CreatorRow, LiveStatsUpdate, SnapshotValues};
use csig_engine::calculator::HISTORY_WINDOW_DAYS;
use csig_engine::{
    classify_creator, compute_derived_metrics_sampled, score_creator, ContentSample,
    DerivedMetrics, SnapshotPoint,
};
use futures::future::{BoxFuture, FutureExt};
use futures::stream::{self, StreamExt};
use serde::Serialize;

use crate::error::CollectorError;
use crate::platform::PlatformApi;
use crate::store::CreatorStore;

/// Tokens expiring within this window are refreshed before use.
pub const TOKEN_REFRESH_SKEW_SECS: i64 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncOptions {
    pub refresh_hours: u32,
    pub batch_size: u32,
    pub max_concurrent: usize,
    pub content_sample: u32,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            refresh_hours: 6,
            batch_size: 25,
            max_concurrent: 1,
            content_sample: 20,
        }
    }
}

impl SyncOptions {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            refresh_hours: config.sync_refresh_hours,
            batch_size: config.sync_batch_size,
            max_concurrent: config.sync_max_concurrent,
            content_sample: config.sync_content_sample,
        }
    }

    fn validate(&self) -> Result<(), CollectorError> {
        if !(1..=csig_core::config::MAX_SYNC_BATCH_SIZE).contains(&self.batch_size) {
            return Err(CollectorError::InvalidConfig(format!(
                "batch size {} outside 1..={}",
                self.batch_size,
                csig_core::config::MAX_SYNC_BATCH_SIZE
            )));
        }
        if self.content_sample == 0 {
            return Err(CollectorError::InvalidConfig(
                "content sample must be at least one post".to_string(),
            ));
        }
        if self.refresh_hours == 0 {
            return Err(CollectorError::InvalidConfig(
                "refresh interval must be at least one hour".to_string(),
            ));
        }
        Ok(())
    }
}

/// Aggregate outcome of one batch.
///
/// `processed` counts creators synced successfully and `errors` counts
/// creators skipped after a failure; together they cover the whole batch.
/// `snapshots_created` counts new rows for today, including those of creators
/// that failed at a later step. Overwriting an earlier same-day snapshot does
/// not count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncSummary {
    pub processed: u32,
    pub errors: u32,
    pub snapshots_created: u32,
}

/// Syncs every creator currently due, at most `options.batch_size` of them.
///
/// Per-creator failures are logged, recorded on the creator and counted; they
/// never abort the batch. Only invalid options or a store failure while
/// selecting the batch are returned as errors, and both happen before any
/// creator is touched.
///
/// # Errors
///
/// Returns [`CollectorError::InvalidConfig`] for out-of-range options, or
/// [`CollectorError::Store`] if the due creators cannot be listed.
pub async fn run_sync_batch<S, P>(
    store: &S,
    platform: &P,
    options: &SyncOptions,
    now: DateTime<Utc>,
) -> Result<SyncSummary, CollectorError>
where
    S: CreatorStore,
    P: PlatformApi,
{
    options.validate()?;

    let stale_before = now - Duration::hours(i64::from(options.refresh_hours));
    let creators = store
        .list_due(stale_before, i64::from(options.batch_size))
        .await?;

    if creators.is_empty() {
        tracing::info!("sync: no creators due");
        return Ok(SyncSummary::default());
    }
    tracing::info!(due = creators.len(), "sync: starting batch");

    let jobs: Vec<BoxFuture<'_, (&CreatorRow, bool, Result<(), CollectorError>)>> = creators
        .iter()
        .map(|creator| {
            async move {
                let mut snapshot_created = false;
                let result =
                    sync_creator(store, platform, creator, options, now, &mut snapshot_created)
                        .await;
                (creator, snapshot_created, result)
            }
            .boxed()
        })
        .collect();
    let results: Vec<(&CreatorRow, bool, Result<(), CollectorError>)> = stream::iter(jobs)
        .buffer_unordered(options.max_concurrent.max(1))
        .collect()
        .await;

    let mut summary = SyncSummary::default();
    for (creator, snapshot_created, result) in results {
        if snapshot_created {
            summary.snapshots_created += 1;
        }
        match result {
            Ok(()) => summary.processed += 1,
            Err(err) => {
                summary.errors += 1;
                tracing::warn!(
                    creator_id = creator.id,
                    slug = %creator.slug,
                    error = %err,
                    "sync: creator failed"
                );
                if let Err(record_err) = store.record_sync_error(creator.id, &err.to_string()).await
                {
                    tracing::error!(
                        creator_id = creator.id,
                        error = %record_err,
                        "sync: failed to record sync error"
                    );
                }
            }
        }
    }

    tracing::info!(
        processed = summary.processed,
        errors = summary.errors,
        snapshots_created = summary.snapshots_created,
        "sync: batch complete"
    );
    Ok(summary)
}

async fn sync_creator<S, P>(
    store: &S,
    platform: &P,
    creator: &CreatorRow,
    options: &SyncOptions,
    now: DateTime<Utc>,
    snapshot_created: &mut bool,
) -> Result<(), CollectorError>
where
    S: CreatorStore,
    P: PlatformApi,
{
    let access_token = ensure_access_token(store, platform, creator, now).await?;

    let mut description = None;
    let mut live = LiveStatsUpdate {
        youtube_followers: None,
        total_followers: creator.total_with_youtube(None),
        total_views: None,
        video_count: None,
    };
    let mut content = Vec::new();

    if let Some(channel_id) = creator.youtube_channel_id.as_deref() {
        let channel = platform
            .fetch_channel(channel_id, access_token.as_deref())
            .await?;
        if let Some(playlist) = channel.uploads_playlist_id.as_deref() {
            content = platform
                .fetch_recent_content(playlist, options.content_sample, access_token.as_deref())
                .await?;
        }

        live = LiveStatsUpdate {
            youtube_followers: channel.stats.followers,
            total_followers: creator.total_with_youtube(channel.stats.followers),
            total_views: channel.stats.total_views,
            video_count: channel.stats.video_count,
        };
        description = channel.stats.description;
    }

    let today = now.date_naive();
    let values = SnapshotValues {
        youtube_followers: live.youtube_followers.or(creator.youtube_followers),
        instagram_followers: creator.instagram_followers,
        tiktok_followers: creator.tiktok_followers,
        total_followers: live.total_followers,
        total_views: live.total_views.or(creator.total_views),
    };
    let upsert = store.upsert_snapshot(creator.id, today, &values).await?;
    *snapshot_created = upsert.inserted;

    for item in &content {
        if let Err(err) = store.upsert_content(creator.id, item).await {
            tracing::warn!(
                creator_id = creator.id,
                external_id = %item.external_id,
                error = %err,
                "sync: failed to store content item"
            );
        }
    }

    let bio = creator.bio.as_deref().or(description.as_deref());
    recompute_metrics(store, creator, &live, bio, today, options.content_sample).await?;

    // Last write: last_synced_at only advances once everything else landed.
    store.update_live_stats(creator.id, &live, now).await?;

    tracing::debug!(
        creator_id = creator.id,
        followers = live.total_followers,
        items = content.len(),
        "sync: creator synced"
    );
    Ok(())
}

/// Returns a usable access token, refreshing it when it is missing or about
/// to expire. `None` means the creator has no OAuth grant and public data is
/// fetched with the API key alone.
async fn ensure_access_token<S, P>(
    store: &S,
    platform: &P,
    creator: &CreatorRow,
    now: DateTime<Utc>,
) -> Result<Option<String>, CollectorError>
where
    S: CreatorStore,
    P: PlatformApi,
{
    let Some(refresh_token) = creator.refresh_token.as_deref() else {
        return Ok(creator.access_token.clone());
    };
    if !creator.token_needs_refresh(now, Duration::seconds(TOKEN_REFRESH_SKEW_SECS)) {
        return Ok(creator.access_token.clone());
    }

    let token = platform.refresh_access_token(refresh_token).await?;
    store
        .save_tokens(
            creator.id,
            &token.access_token,
            token.expires_at,
            token.refresh_token.as_deref(),
        )
        .await?;
    tracing::debug!(creator_id = creator.id, "sync: access token refreshed");

    Ok(Some(token.access_token))
}

async fn recompute_metrics<S: CreatorStore>(
    store: &S,
    creator: &CreatorRow,
    live: &LiveStatsUpdate,
    bio: Option<&str>,
    today: NaiveDate,
    sample_size: u32,
) -> Result<(), CollectorError> {
    let since = today - Duration::days(HISTORY_WINDOW_DAYS);
    let snapshots: Vec<SnapshotPoint> = store
        .snapshots_since(creator.id, since)
        .await?
        .into_iter()
        .map(|s| SnapshotPoint {
            date: s.snapshot_date,
            total_followers: s.total_followers,
            total_views: s.total_views,
        })
        .collect();

    let content: Vec<ContentSample> = store
        .recent_content(creator.id, i64::from(sample_size))
        .await?
        .into_iter()
        .map(|c| ContentSample {
            views: c.views,
            likes: c.likes,
            comments: c.comments,
            posted_at: c.posted_at,
            duration_secs: c.duration_secs,
        })
        .collect();

    let metrics = compute_derived_metrics_sampled(
        &snapshots,
        &content,
        live.total_followers,
        today,
        sample_size as usize,
    );
    let post_count = live.video_count.or(creator.video_count);
    let scores = score_creator(&metrics, live.total_followers, post_count);

    let niches = creator
        .niches
        .is_empty()
        .then(|| classify_creator(&creator.display_name, bio).to_vec());

    let update = metrics_update(&metrics, scores.rising_score, scores.brand_readiness_score, niches);
    store.update_metrics(creator.id, &update).await?;
    Ok(())
}

fn metrics_update(
    metrics: &DerivedMetrics,
    rising: u8,
    readiness: u8,
    niches: Option<Vec<String>>,
) -> CreatorMetricsUpdate {
    CreatorMetricsUpdate {
        growth_rate_7d: metrics.growth_rate_7d,
        growth_rate_30d: metrics.growth_rate_30d,
        engagement_rate: metrics.engagement_rate,
        avg_views: metrics.avg_views,
        posting_frequency: metrics.posting_frequency,
        consistency_score: metrics.consistency_score.map(i16::from),
        authenticity_score: metrics.authenticity_score.map(i16::from),
        viral_post_count: metrics
            .viral_post_count
            .map(|n| i32::try_from(n).unwrap_or(i32::MAX)),
        shorts_percentage: metrics.shorts_percentage,
        rising_score: i16::from(rising),
        brand_readiness_score: i16::from(readiness),
        niches,
    }
}
