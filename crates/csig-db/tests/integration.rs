//! Offline unit tests for csig-db pool configuration and row types.
//! These tests do not require a live database connection.

use chrono::{NaiveDate, Utc};
use csig_core::{AppConfig, Environment};
use csig_db::{
    CreatorMetricsUpdate, DiscoveryFilter, DiscoverySort, PoolConfig, SnapshotRow, SyncRunCounts,
    SyncRunRow,
};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use uuid::Uuid;

#[test]
fn pool_config_from_app_config_uses_core_values() {
    let app_config = AppConfig {
        database_url: "postgres://example".to_string(),
        env: Environment::Test,
        bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 3000),
        log_level: "info".to_string(),
        seed_path: PathBuf::from("./config/seed.yaml"),
        db_max_connections: 42,
        db_min_connections: 7,
        db_acquire_timeout_secs: 9,
        sync_refresh_hours: 6,
        sync_batch_size: 25,
        sync_max_concurrent: 1,
        sync_inter_request_delay_ms: 250,
        sync_content_sample: 20,
        platform_request_timeout_secs: 30,
        platform_max_retries: 3,
        platform_backoff_base_ms: 1000,
        youtube_api_key: None,
        youtube_client_id: None,
        youtube_client_secret: None,
    };

    let pool_config = PoolConfig::from_app_config(&app_config);
    assert_eq!(pool_config.max_connections, 42);
    assert_eq!(pool_config.min_connections, 7);
    assert_eq!(pool_config.acquire_timeout_secs, 9);
}

/// Compile-time smoke test: confirm that [`SyncRunRow`] has all expected
/// fields with the correct types. No database required.
#[test]
fn sync_run_row_has_expected_fields() {
    let row = SyncRunRow {
        id: 1_i64,
        public_id: Uuid::new_v4(),
        trigger_source: "cli".to_string(),
        status: "queued".to_string(),
        started_at: None,
        completed_at: None,
        creators_processed: 0_i32,
        errors: 0_i32,
        snapshots_created: 0_i32,
        error_message: None,
        created_at: Utc::now(),
    };

    assert_eq!(row.status, "queued");
    assert_eq!(row.trigger_source, "cli");
    assert!(row.started_at.is_none());
    assert_eq!(row.snapshots_created, 0);
}

#[test]
fn snapshot_row_has_expected_fields() {
    let row = SnapshotRow {
        id: 3,
        creator_id: 9,
        snapshot_date: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
        youtube_followers: Some(1_000),
        instagram_followers: None,
        tiktok_followers: None,
        total_followers: 1_000,
        total_views: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };

    assert_eq!(row.creator_id, 9);
    assert_eq!(row.total_followers, 1_000);
    assert!(row.total_views.is_none());
}

#[test]
fn defaults_are_empty_and_sort_by_rising() {
    let update = CreatorMetricsUpdate::default();
    assert!(update.niches.is_none());
    assert!(update.engagement_rate.is_none());

    let filter = DiscoveryFilter::default();
    assert_eq!(filter.sort, DiscoverySort::Rising);
    assert!(filter.niche.is_none());

    assert_eq!(SyncRunCounts::default().creators_processed, 0);
}
