//! Pure signal computations for creators.
//!
//! Turns snapshot history and sampled content into derived metrics, ranks
//! creators with fixed heuristics, classifies niches from free text, and
//! scores creators against campaign criteria. Nothing in this crate performs
//! I/O; every function is safe to call in parallel across creators.

pub mod calculator;
pub mod matcher;
pub mod niche;
pub mod scorer;
pub mod tiers;
pub mod types;

pub use calculator::{
    authenticity_score, average_views, compute_derived_metrics, compute_derived_metrics_sampled,
    consistency_score, engagement_rate, growth_rate, posting_frequency, shorts_percentage, viral_post_count,
};
pub use matcher::match_creator;
pub use niche::{classify_creator, classify_niches, FALLBACK_NICHE};
pub use scorer::{brand_readiness_score, rising_score, score_creator};
pub use tiers::FollowerTier;
pub use types::{
    ContentSample, CreatorProfile, DerivedMetrics, DimensionScore, MatchDimension, MatchResult,
    MatchTier, SignalScores, SnapshotPoint,
};
