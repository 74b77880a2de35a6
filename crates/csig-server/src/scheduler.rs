//! Background job scheduler.
//!
//! Registers the recurring creator sync. The job shares [`AppState`] with the
//! HTTP surface so it contends for the same sync lock as `POST /cron/sync`.

use csig_collector::SyncTrigger;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

use crate::api::{run_locked_sync, AppState, SyncFailure};

const SYNC_CRON_VAR: &str = "CSIG_SYNC_CRON";
const DEFAULT_SYNC_CRON: &str = "0 0 */6 * * *";

/// Builds and starts the background job scheduler.
///
/// The returned handle must be kept alive for the lifetime of the process;
/// dropping it shuts down all jobs.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the scheduler cannot be initialised, the
/// cron expression is invalid, or the scheduler fails to start.
pub async fn build_scheduler(state: AppState) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;
    register_sync_job(&scheduler, state).await?;
    scheduler.start().await?;
    Ok(scheduler)
}

async fn register_sync_job(
    scheduler: &JobScheduler,
    state: AppState,
) -> Result<(), JobSchedulerError> {
    let cron = std::env::var(SYNC_CRON_VAR).unwrap_or_else(|_| DEFAULT_SYNC_CRON.to_string());

    let job = Job::new_async(cron.as_str(), move |_uuid, _lock| {
        let state = state.clone();

        Box::pin(async move {
            tracing::info!("scheduler: starting creator sync");
            run_sync_job(&state).await;
        })
    })?;

    scheduler.add(job).await?;
    tracing::info!(cron = %cron, "scheduler: registered creator sync job");
    Ok(())
}

async fn run_sync_job(state: &AppState) {
    match run_locked_sync(state, SyncTrigger::Scheduler).await {
        Ok(report) => tracing::info!(
            run_id = report.run.id,
            processed = report.summary.processed,
            errors = report.summary.errors,
            snapshots_created = report.summary.snapshots_created,
            "scheduler: creator sync complete"
        ),
        Err(SyncFailure::Busy) => {
            tracing::warn!("scheduler: previous sync still running; skipping this tick");
        }
        Err(SyncFailure::Collector(e)) => {
            tracing::error!(error = %e, "scheduler: creator sync failed");
        }
    }
}
