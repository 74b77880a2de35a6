//! Batch sync behaviour against in-memory store and platform fakes.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use csig_collector::{
    run_sync_batch, CollectorError, CreatorStore, PlatformApi, SyncOptions, YouTubeSource,
};
use csig_core::{AppConfig, Environment, NormalizedChannelStats, NormalizedContentItem, Platform};
use csig_db::{
    ContentRow, CreatorMetricsUpdate, CreatorRow, DbError, LiveStatsUpdate, SnapshotRow,
    SnapshotUpsert, SnapshotValues,
};
use csig_platform::{AccessToken, PlatformError, YouTubeChannel};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Fakes
// ---------------------------------------------------------------------------

#[derive(Default)]
struct State {
    creators: Vec<CreatorRow>,
    snapshots: BTreeMap<(i64, NaiveDate), SnapshotValues>,
    content: BTreeMap<(i64, String), NormalizedContentItem>,
    metrics: HashMap<i64, CreatorMetricsUpdate>,
}

#[derive(Default)]
struct MemoryStore {
    state: Mutex<State>,
    failing_content: HashSet<String>,
    list_calls: AtomicU32,
}

impl MemoryStore {
    fn with_creators(creators: Vec<CreatorRow>) -> Self {
        Self {
            state: Mutex::new(State {
                creators,
                ..State::default()
            }),
            ..Self::default()
        }
    }

    fn creator(&self, id: i64) -> CreatorRow {
        let state = self.state.lock().unwrap();
        state.creators.iter().find(|c| c.id == id).cloned().unwrap()
    }

    fn snapshot_count(&self, id: i64) -> usize {
        let state = self.state.lock().unwrap();
        state.snapshots.keys().filter(|(c, _)| *c == id).count()
    }

    fn metrics(&self, id: i64) -> Option<CreatorMetricsUpdate> {
        self.state.lock().unwrap().metrics.get(&id).cloned()
    }

    fn content_ids(&self, id: i64) -> Vec<String> {
        let state = self.state.lock().unwrap();
        state
            .content
            .keys()
            .filter(|(c, _)| *c == id)
            .map(|(_, ext)| ext.clone())
            .collect()
    }
}

impl CreatorStore for MemoryStore {
    async fn list_due(
        &self,
        stale_before: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<CreatorRow>, DbError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let state = self.state.lock().unwrap();
        let mut due: Vec<CreatorRow> = state
            .creators
            .iter()
            .filter(|c| c.last_synced_at.is_none_or(|t| t < stale_before))
            .cloned()
            .collect();
        due.sort_by_key(|c| (c.last_synced_at.is_some(), c.last_synced_at, c.id));
        due.truncate(usize::try_from(limit).unwrap());
        Ok(due)
    }

    async fn save_tokens(
        &self,
        creator_id: i64,
        access_token: &str,
        expires_at: DateTime<Utc>,
        refresh_token: Option<&str>,
    ) -> Result<(), DbError> {
        let mut state = self.state.lock().unwrap();
        let creator = state.creators.iter_mut().find(|c| c.id == creator_id).unwrap();
        creator.access_token = Some(access_token.to_owned());
        creator.token_expires_at = Some(expires_at);
        if let Some(rt) = refresh_token {
            creator.refresh_token = Some(rt.to_owned());
        }
        Ok(())
    }

    async fn record_sync_error(&self, creator_id: i64, message: &str) -> Result<(), DbError> {
        let mut state = self.state.lock().unwrap();
        let creator = state.creators.iter_mut().find(|c| c.id == creator_id).unwrap();
        creator.sync_error = Some(message.to_owned());
        Ok(())
    }

    async fn upsert_snapshot(
        &self,
        creator_id: i64,
        date: NaiveDate,
        values: &SnapshotValues,
    ) -> Result<SnapshotUpsert, DbError> {
        let mut state = self.state.lock().unwrap();
        let inserted = state.snapshots.insert((creator_id, date), *values).is_none();
        Ok(SnapshotUpsert { id: 1, inserted })
    }

    async fn upsert_content(
        &self,
        creator_id: i64,
        item: &NormalizedContentItem,
    ) -> Result<i64, DbError> {
        if self.failing_content.contains(&item.external_id) {
            return Err(DbError::NotFound);
        }
        let mut state = self.state.lock().unwrap();
        state
            .content
            .insert((creator_id, item.external_id.clone()), item.clone());
        Ok(1)
    }

    async fn update_live_stats(
        &self,
        creator_id: i64,
        stats: &LiveStatsUpdate,
        synced_at: DateTime<Utc>,
    ) -> Result<(), DbError> {
        let mut state = self.state.lock().unwrap();
        let creator = state.creators.iter_mut().find(|c| c.id == creator_id).unwrap();
        creator.youtube_followers = stats.youtube_followers.or(creator.youtube_followers);
        creator.total_followers = stats.total_followers;
        creator.last_synced_at = Some(synced_at);
        creator.sync_error = None;
        Ok(())
    }

    async fn snapshots_since(
        &self,
        creator_id: i64,
        since: NaiveDate,
    ) -> Result<Vec<SnapshotRow>, DbError> {
        let state = self.state.lock().unwrap();
        let now = Utc::now();
        Ok(state
            .snapshots
            .iter()
            .filter(|((c, d), _)| *c == creator_id && *d >= since)
            .map(|((c, d), v)| SnapshotRow {
                id: 1,
                creator_id: *c,
                snapshot_date: *d,
                youtube_followers: v.youtube_followers,
                instagram_followers: v.instagram_followers,
                tiktok_followers: v.tiktok_followers,
                total_followers: v.total_followers,
                total_views: v.total_views,
                created_at: now,
                updated_at: now,
            })
            .collect())
    }

    async fn recent_content(
        &self,
        creator_id: i64,
        limit: i64,
    ) -> Result<Vec<ContentRow>, DbError> {
        let state = self.state.lock().unwrap();
        let now = Utc::now();
        let mut rows: Vec<ContentRow> = state
            .content
            .iter()
            .filter(|((c, _), _)| *c == creator_id)
            .map(|((c, _), item)| ContentRow {
                id: 1,
                creator_id: *c,
                platform: item.platform.as_str().to_owned(),
                external_id: item.external_id.clone(),
                title: item.title.clone(),
                views: item.views,
                likes: item.likes,
                comments: item.comments,
                posted_at: item.posted_at,
                duration_secs: item.duration_secs,
                created_at: now,
                updated_at: now,
            })
            .collect();
        rows.sort_by(|a, b| b.posted_at.cmp(&a.posted_at));
        rows.truncate(usize::try_from(limit).unwrap());
        Ok(rows)
    }

    async fn update_metrics(
        &self,
        creator_id: i64,
        update: &CreatorMetricsUpdate,
    ) -> Result<(), DbError> {
        let mut state = self.state.lock().unwrap();
        if let Some(niches) = &update.niches {
            let creator = state.creators.iter_mut().find(|c| c.id == creator_id).unwrap();
            creator.niches.clone_from(niches);
        }
        state.metrics.insert(creator_id, update.clone());
        Ok(())
    }
}

#[derive(Default)]
struct FakePlatform {
    followers: HashMap<String, i64>,
    descriptions: HashMap<String, String>,
    failing_channels: HashSet<String>,
    videos: Vec<NormalizedContentItem>,
    refresh_fails: bool,
    refresh_calls: AtomicU32,
    channel_calls: AtomicU32,
    tokens_seen: Mutex<Vec<Option<String>>>,
}

impl PlatformApi for FakePlatform {
    async fn refresh_access_token(&self, _refresh_token: &str) -> Result<AccessToken, PlatformError> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        if self.refresh_fails {
            return Err(PlatformError::TokenRefresh("invalid_grant (400)".to_owned()));
        }
        Ok(AccessToken {
            access_token: "fresh-token".to_owned(),
            expires_at: Utc::now() + Duration::hours(1),
            refresh_token: None,
        })
    }

    async fn fetch_channel(
        &self,
        channel_id: &str,
        access_token: Option<&str>,
    ) -> Result<YouTubeChannel, PlatformError> {
        self.channel_calls.fetch_add(1, Ordering::SeqCst);
        self.tokens_seen
            .lock()
            .unwrap()
            .push(access_token.map(str::to_owned));
        if self.failing_channels.contains(channel_id) {
            return Err(PlatformError::ApiError {
                platform: "youtube",
                status: 403,
                reason: "quotaExceeded".to_owned(),
                message: "quota".to_owned(),
            });
        }
        Ok(YouTubeChannel {
            stats: NormalizedChannelStats {
                platform: Platform::YouTube,
                channel_id: channel_id.to_owned(),
                title: None,
                description: self.descriptions.get(channel_id).cloned(),
                followers: self.followers.get(channel_id).copied(),
                total_views: Some(1_000_000),
                video_count: Some(120),
            },
            uploads_playlist_id: Some(format!("UU{channel_id}")),
        })
    }

    async fn fetch_recent_content(
        &self,
        _uploads_playlist_id: &str,
        max_results: u32,
        _access_token: Option<&str>,
    ) -> Result<Vec<NormalizedContentItem>, PlatformError> {
        Ok(self
            .videos
            .iter()
            .take(max_results as usize)
            .cloned()
            .collect())
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

fn at(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 10, hour, 0, 0).unwrap()
}

fn creator(id: i64, channel: Option<&str>) -> CreatorRow {
    let now = at(0);
    CreatorRow {
        id,
        public_id: Uuid::new_v4(),
        slug: format!("creator-{id}"),
        display_name: format!("Creator {id}"),
        bio: None,
        youtube_channel_id: channel.map(str::to_owned),
        instagram_handle: None,
        tiktok_handle: None,
        youtube_followers: None,
        instagram_followers: Some(5_000),
        tiktok_followers: None,
        total_followers: 5_000,
        total_views: None,
        video_count: None,
        growth_rate_7d: None,
        growth_rate_30d: None,
        engagement_rate: None,
        avg_views: None,
        posting_frequency: None,
        consistency_score: None,
        authenticity_score: None,
        brand_readiness_score: None,
        rising_score: None,
        viral_post_count: None,
        shorts_percentage: None,
        metrics_updated_at: None,
        niches: vec!["Gaming".to_owned()],
        access_token: None,
        refresh_token: None,
        token_expires_at: None,
        last_synced_at: None,
        sync_error: None,
        created_at: now,
        updated_at: now,
    }
}

fn video(id: &str, day: u32, views: i64) -> NormalizedContentItem {
    NormalizedContentItem {
        platform: Platform::YouTube,
        external_id: id.to_owned(),
        title: Some(format!("Video {id}")),
        views: Some(views),
        likes: Some(views / 20),
        comments: Some(views / 100),
        posted_at: Some(Utc.with_ymd_and_hms(2026, 3, day, 12, 0, 0).unwrap()),
        duration_secs: Some(300),
    }
}

fn platform_with(channels: &[(&str, i64)]) -> FakePlatform {
    FakePlatform {
        followers: channels
            .iter()
            .map(|(id, f)| ((*id).to_owned(), *f))
            .collect(),
        videos: vec![video("a", 1, 10_000), video("b", 4, 12_000), video("c", 8, 9_000)],
        ..FakePlatform::default()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn sync_writes_snapshot_content_and_metrics() {
    let store = MemoryStore::with_creators(vec![creator(1, Some("UC1"))]);
    let platform = platform_with(&[("UC1", 45_000)]);

    let summary = run_sync_batch(&store, &platform, &SyncOptions::default(), at(1))
        .await
        .unwrap();

    assert_eq!(summary.processed, 1);
    assert_eq!(summary.errors, 0);
    assert_eq!(summary.snapshots_created, 1);

    let row = store.creator(1);
    assert_eq!(row.youtube_followers, Some(45_000));
    assert_eq!(row.total_followers, 50_000, "YouTube plus stored Instagram");
    assert_eq!(row.last_synced_at, Some(at(1)));
    assert_eq!(store.content_ids(1).len(), 3);

    let metrics = store.metrics(1).expect("metrics written");
    assert!(metrics.engagement_rate.is_some());
    assert!(metrics.posting_frequency.is_some());
    assert_eq!(metrics.growth_rate_7d, None, "no history yet");
    assert!(metrics.niches.is_none(), "existing niches are kept");
}

#[tokio::test]
async fn same_day_rerun_keeps_one_snapshot() {
    let store = MemoryStore::with_creators(vec![creator(1, Some("UC1"))]);
    let platform = platform_with(&[("UC1", 45_000)]);
    let options = SyncOptions::default();

    run_sync_batch(&store, &platform, &options, at(1)).await.unwrap();
    let second = run_sync_batch(&store, &platform, &options, at(9))
        .await
        .unwrap();

    assert_eq!(second.processed, 1, "creator is due again after 6h");
    assert_eq!(second.snapshots_created, 0, "overwrite is not a new snapshot");
    assert_eq!(store.snapshot_count(1), 1);
}

#[tokio::test]
async fn metrics_sample_follows_configured_content_sample() {
    let store = MemoryStore::with_creators(vec![creator(1, Some("UC1"))]);
    let platform = platform_with(&[("UC1", 45_000)]);

    run_sync_batch(&store, &platform, &SyncOptions::default(), at(1))
        .await
        .unwrap();
    assert_eq!(store.content_ids(1).len(), 3);

    let narrow = SyncOptions {
        content_sample: 1,
        ..SyncOptions::default()
    };
    run_sync_batch(&store, &platform, &narrow, at(9)).await.unwrap();

    let metrics = store.metrics(1).expect("metrics written");
    assert_eq!(metrics.avg_views, Some(9_000.0), "only the newest stored post");
    assert_eq!(metrics.posting_frequency, None);
}

#[tokio::test]
async fn recently_synced_creator_is_not_due() {
    let store = MemoryStore::with_creators(vec![creator(1, Some("UC1"))]);
    let platform = platform_with(&[("UC1", 45_000)]);
    let options = SyncOptions::default();

    run_sync_batch(&store, &platform, &options, at(1)).await.unwrap();
    let second = run_sync_batch(&store, &platform, &options, at(2))
        .await
        .unwrap();

    assert_eq!(second, csig_collector::SyncSummary::default());
    assert_eq!(platform.channel_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn token_refresh_failure_records_error_and_keeps_timestamp() {
    let mut row = creator(1, Some("UC1"));
    row.refresh_token = Some("rt".to_owned());
    row.access_token = Some("stale".to_owned());
    row.token_expires_at = Some(at(0));
    let store = MemoryStore::with_creators(vec![row]);
    let platform = FakePlatform {
        refresh_fails: true,
        ..platform_with(&[("UC1", 45_000)])
    };

    let summary = run_sync_batch(&store, &platform, &SyncOptions::default(), at(1))
        .await
        .unwrap();

    assert_eq!(summary.processed, 0);
    assert_eq!(summary.errors, 1);
    assert_eq!(summary.snapshots_created, 0);

    let row = store.creator(1);
    assert!(row.sync_error.unwrap().contains("token refresh failed"));
    assert_eq!(row.last_synced_at, None, "creator stays due");
    assert_eq!(store.snapshot_count(1), 0);
    assert_eq!(platform.channel_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn expiring_token_is_refreshed_and_used() {
    let mut row = creator(1, Some("UC1"));
    row.refresh_token = Some("rt".to_owned());
    row.access_token = Some("old".to_owned());
    row.token_expires_at = Some(at(1) + Duration::seconds(30));
    let store = MemoryStore::with_creators(vec![row]);
    let platform = platform_with(&[("UC1", 45_000)]);

    run_sync_batch(&store, &platform, &SyncOptions::default(), at(1))
        .await
        .unwrap();

    assert_eq!(platform.refresh_calls.load(Ordering::SeqCst), 1);
    assert_eq!(
        store.creator(1).access_token.as_deref(),
        Some("fresh-token")
    );
    assert_eq!(
        platform.tokens_seen.lock().unwrap().as_slice(),
        [Some("fresh-token".to_owned())]
    );
}

#[tokio::test]
async fn valid_token_is_not_refreshed() {
    let mut row = creator(1, Some("UC1"));
    row.refresh_token = Some("rt".to_owned());
    row.access_token = Some("current".to_owned());
    row.token_expires_at = Some(at(3));
    let store = MemoryStore::with_creators(vec![row]);
    let platform = platform_with(&[("UC1", 45_000)]);

    run_sync_batch(&store, &platform, &SyncOptions::default(), at(1))
        .await
        .unwrap();

    assert_eq!(platform.refresh_calls.load(Ordering::SeqCst), 0);
    assert_eq!(
        platform.tokens_seen.lock().unwrap().as_slice(),
        [Some("current".to_owned())]
    );
}

#[tokio::test]
async fn invalid_options_fail_before_touching_the_store() {
    let store = MemoryStore::with_creators(vec![creator(1, Some("UC1"))]);
    let platform = platform_with(&[("UC1", 45_000)]);
    let options = SyncOptions {
        batch_size: 0,
        ..SyncOptions::default()
    };

    let err = run_sync_batch(&store, &platform, &options, at(1))
        .await
        .unwrap_err();

    assert!(matches!(err, CollectorError::InvalidConfig(_)));
    assert_eq!(store.list_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn failing_creator_does_not_stop_the_batch() {
    let store = MemoryStore::with_creators(vec![creator(1, Some("UC1")), creator(2, Some("UC2"))]);
    let platform = FakePlatform {
        failing_channels: HashSet::from(["UC1".to_owned()]),
        ..platform_with(&[("UC1", 10_000), ("UC2", 20_000)])
    };

    let summary = run_sync_batch(&store, &platform, &SyncOptions::default(), at(1))
        .await
        .unwrap();

    assert_eq!(summary.processed, 1);
    assert_eq!(summary.errors, 1);
    assert!(store.creator(1).sync_error.is_some());
    assert_eq!(store.creator(1).last_synced_at, None);
    assert_eq!(store.creator(2).last_synced_at, Some(at(1)));
    assert_eq!(store.snapshot_count(2), 1);
}

#[tokio::test]
async fn content_item_failure_is_isolated() {
    let store = MemoryStore {
        failing_content: HashSet::from(["b".to_owned()]),
        ..MemoryStore::with_creators(vec![creator(1, Some("UC1"))])
    };
    let platform = platform_with(&[("UC1", 45_000)]);

    let summary = run_sync_batch(&store, &platform, &SyncOptions::default(), at(1))
        .await
        .unwrap();

    assert_eq!(summary.processed, 1);
    assert_eq!(summary.errors, 0);
    assert_eq!(store.content_ids(1), ["a", "c"]);
}

#[tokio::test]
async fn empty_niches_are_classified_from_channel_description() {
    let mut row = creator(1, Some("UC1"));
    row.niches.clear();
    let store = MemoryStore::with_creators(vec![row]);
    let platform = FakePlatform {
        descriptions: HashMap::from([(
            "UC1".to_owned(),
            "Smartphone reviews, laptop unboxing and gadget deep dives".to_owned(),
        )]),
        ..platform_with(&[("UC1", 45_000)])
    };

    run_sync_batch(&store, &platform, &SyncOptions::default(), at(1))
        .await
        .unwrap();

    let niches = store.metrics(1).unwrap().niches.expect("niches classified");
    assert!(niches.contains(&"Tech".to_owned()), "got {niches:?}");
    assert_eq!(store.creator(1).niches, niches);
}

#[tokio::test]
async fn creator_without_channel_snapshots_stored_totals() {
    let store = MemoryStore::with_creators(vec![creator(1, None)]);
    let platform = FakePlatform::default();

    let summary = run_sync_batch(&store, &platform, &SyncOptions::default(), at(1))
        .await
        .unwrap();

    assert_eq!(summary.processed, 1);
    assert_eq!(platform.channel_calls.load(Ordering::SeqCst), 0);
    let state = store.state.lock().unwrap();
    let snapshot = state
        .snapshots
        .get(&(1, at(1).date_naive()))
        .expect("snapshot written");
    assert_eq!(snapshot.total_followers, 5_000);
}

#[tokio::test]
async fn batch_is_bounded_and_never_synced_first() {
    let mut synced = creator(1, Some("UC1"));
    synced.last_synced_at = Some(at(0) - Duration::days(2));
    let store = MemoryStore::with_creators(vec![
        synced,
        creator(2, Some("UC2")),
        creator(3, Some("UC3")),
    ]);
    let platform = platform_with(&[("UC1", 1_000), ("UC2", 2_000), ("UC3", 3_000)]);
    let options = SyncOptions {
        batch_size: 2,
        max_concurrent: 4,
        ..SyncOptions::default()
    };

    let summary = run_sync_batch(&store, &platform, &options, at(1))
        .await
        .unwrap();

    assert_eq!(summary.processed, 2);
    assert_eq!(store.creator(2).last_synced_at, Some(at(1)));
    assert_eq!(store.creator(3).last_synced_at, Some(at(1)));
    assert_ne!(store.creator(1).last_synced_at, Some(at(1)));
}

#[test]
fn youtube_source_requires_api_key() {
    let config = AppConfig {
        database_url: "postgres://localhost/csig".to_owned(),
        env: Environment::Test,
        bind_addr: "127.0.0.1:3000".parse().unwrap(),
        log_level: "info".to_owned(),
        seed_path: "config/seed.yaml".into(),
        db_max_connections: 5,
        db_min_connections: 1,
        db_acquire_timeout_secs: 5,
        sync_refresh_hours: 6,
        sync_batch_size: 25,
        sync_max_concurrent: 1,
        sync_inter_request_delay_ms: 0,
        sync_content_sample: 20,
        platform_request_timeout_secs: 5,
        platform_max_retries: 0,
        platform_backoff_base_ms: 0,
        youtube_api_key: None,
        youtube_client_id: None,
        youtube_client_secret: None,
    };

    let err = YouTubeSource::from_app_config(&config).unwrap_err();
    assert!(matches!(err, CollectorError::MissingCredential("YOUTUBE_API_KEY")));
    assert!(err.is_fatal());

    let with_key = AppConfig {
        youtube_api_key: Some("key".to_owned()),
        ..config
    };
    assert!(YouTubeSource::from_app_config(&with_key).is_ok());
}
