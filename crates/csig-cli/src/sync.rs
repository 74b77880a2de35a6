//! `sync` subcommand.

use chrono::{Duration, Utc};
use csig_collector::{run_recorded_sync, PgStore, SyncOptions, SyncTrigger, YouTubeSource};

/// Run one recorded sync batch, or list the due creators with `dry_run`.
///
/// Per-creator failures are counted in the run, not propagated.
///
/// # Errors
///
/// Returns an error if credentials are missing, the sync options are out of
/// range, or the run ledger cannot be written.
pub(crate) async fn run_sync(
    pool: &sqlx::PgPool,
    config: &csig_core::AppConfig,
    dry_run: bool,
) -> anyhow::Result<()> {
    let options = SyncOptions::from_app_config(config);

    if dry_run {
        let stale_before = Utc::now() - Duration::hours(i64::from(options.refresh_hours));
        let due =
            csig_db::list_creators_due_for_sync(pool, stale_before, i64::from(options.batch_size))
                .await?;
        let slugs: Vec<&str> = due.iter().map(|c| c.slug.as_str()).collect();
        println!(
            "dry-run: would sync {} creator(s): [{}]",
            due.len(),
            slugs.join(", ")
        );
        return Ok(());
    }

    let platform = YouTubeSource::from_app_config(config)?;
    let store = PgStore::new(pool.clone());
    let report = run_recorded_sync(pool, &store, &platform, &options, SyncTrigger::Cli).await?;

    println!(
        "sync run {}: processed {}, errors {}, snapshots {}",
        report.run.public_id,
        report.summary.processed,
        report.summary.errors,
        report.summary.snapshots_created
    );
    Ok(())
}
