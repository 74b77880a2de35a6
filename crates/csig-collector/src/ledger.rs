//! Sync run ledger: wraps a batch in a `sync_runs` row.

use chrono::Utc;
use csig_db::{SyncRunCounts, SyncRunRow};
use sqlx::PgPool;

use crate::error::CollectorError;
use crate::platform::PlatformApi;
use crate::store::CreatorStore;
use crate::sync::{run_sync_batch, SyncOptions, SyncSummary};

/// Where a sync was started from; stored as `sync_runs.trigger_source`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncTrigger {
    Cli,
    Scheduler,
    Api,
}

impl SyncTrigger {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SyncTrigger::Cli => "cli",
            SyncTrigger::Scheduler => "scheduler",
            SyncTrigger::Api => "api",
        }
    }
}

#[derive(Debug, Clone)]
pub struct SyncRunReport {
    pub run: SyncRunRow,
    pub summary: SyncSummary,
}

/// Runs one batch recorded as queued → running → succeeded/failed.
///
/// A batch with per-creator errors still succeeds; the run fails only when
/// the batch itself returns an error.
///
/// # Errors
///
/// Returns [`CollectorError::Store`] if the ledger row cannot be written, or
/// any error returned by [`run_sync_batch`].
pub async fn run_recorded_sync<S, P>(
    pool: &PgPool,
    store: &S,
    platform: &P,
    options: &SyncOptions,
    trigger: SyncTrigger,
) -> Result<SyncRunReport, CollectorError>
where
    S: CreatorStore,
    P: PlatformApi,
{
    let run = csig_db::create_sync_run(pool, trigger.as_str()).await?;
    if let Err(e) = csig_db::start_sync_run(pool, run.id).await {
        fail_run_best_effort(pool, run.id, e.to_string()).await;
        return Err(e.into());
    }

    let summary = match run_sync_batch(store, platform, options, Utc::now()).await {
        Ok(summary) => summary,
        Err(e) => {
            fail_run_best_effort(pool, run.id, e.to_string()).await;
            return Err(e);
        }
    };

    if let Err(e) = csig_db::complete_sync_run(pool, run.id, run_counts(summary)).await {
        fail_run_best_effort(pool, run.id, e.to_string()).await;
        return Err(e.into());
    }

    let run = csig_db::get_sync_run(pool, run.id).await?;
    tracing::info!(
        run_id = run.id,
        trigger = trigger.as_str(),
        processed = summary.processed,
        errors = summary.errors,
        "sync: run recorded"
    );
    Ok(SyncRunReport { run, summary })
}

/// Marks a run failed, logging instead of propagating a second failure.
pub async fn fail_run_best_effort(pool: &PgPool, run_id: i64, message: String) {
    if let Err(mark_err) = csig_db::fail_sync_run(pool, run_id, &message).await {
        tracing::error!(
            run_id,
            error = %mark_err,
            "sync: failed to mark run as failed"
        );
    }
}

fn run_counts(summary: SyncSummary) -> SyncRunCounts {
    let clamp = |n: u32| i32::try_from(n).unwrap_or(i32::MAX);
    SyncRunCounts {
        creators_processed: clamp(summary.processed),
        errors: clamp(summary.errors),
        snapshots_created: clamp(summary.snapshots_created),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trigger_sources_match_check_constraint() {
        let names: Vec<_> = [SyncTrigger::Cli, SyncTrigger::Scheduler, SyncTrigger::Api]
            .iter()
            .map(|t| t.as_str())
            .collect();
        assert_eq!(names, ["cli", "scheduler", "api"]);
    }

    #[test]
    fn run_counts_copy_summary() {
        let counts = run_counts(SyncSummary {
            processed: 4,
            errors: 1,
            snapshots_created: 5,
        });
        assert_eq!(counts.creators_processed, 4);
        assert_eq!(counts.errors, 1);
        assert_eq!(counts.snapshots_created, 5);
    }
}
