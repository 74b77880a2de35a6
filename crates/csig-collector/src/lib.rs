//! Ingestion collector.
//!
//! Selects creators due for a refresh, pulls fresh platform figures through
//! [`PlatformApi`], writes today's snapshot and content through
//! [`CreatorStore`], then recomputes derived metrics and scores with
//! `csig-engine`. Both seams have production implementations ([`PgStore`],
//! [`YouTubeSource`]) and are faked in tests.

pub mod error;
pub mod ledger;
pub mod platform;
pub mod profile;
pub mod store;
pub mod sync;

pub use error::CollectorError;
pub use ledger::{fail_run_best_effort, run_recorded_sync, SyncRunReport, SyncTrigger};
pub use platform::{PlatformApi, YouTubeSource};
pub use profile::{active_platforms, creator_profile, match_cache_entry};
pub use store::{CreatorStore, PgStore};
pub use sync::{run_sync_batch, SyncOptions, SyncSummary, TOKEN_REFRESH_SKEW_SECS};
