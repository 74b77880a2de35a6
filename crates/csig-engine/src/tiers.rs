//! Follower tiers and their engagement benchmarks.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FollowerTier {
    Micro,
    Small,
    Medium,
    Large,
    Mega,
}

/// Upper bounds (exclusive) and expected engagement rate (percent) per tier.
const TIER_TABLE: &[(FollowerTier, i64, f64)] = &[
    (FollowerTier::Micro, 10_000, 8.0),
    (FollowerTier::Small, 50_000, 5.0),
    (FollowerTier::Medium, 100_000, 3.5),
    (FollowerTier::Large, 500_000, 2.5),
    (FollowerTier::Mega, i64::MAX, 1.5),
];

impl FollowerTier {
    #[must_use]
    pub fn from_followers(followers: i64) -> Self {
        TIER_TABLE
            .iter()
            .find(|(_, upper, _)| followers < *upper)
            .map_or(FollowerTier::Mega, |(tier, _, _)| *tier)
    }

    /// Typical engagement rate (percent) for creators of this size.
    #[must_use]
    pub fn benchmark_engagement(self) -> f64 {
        TIER_TABLE
            .iter()
            .find(|(tier, _, _)| *tier == self)
            .map_or(1.5, |(_, _, benchmark)| *benchmark)
    }
}
