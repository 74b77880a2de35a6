//! Conversions from stored rows to matcher inputs and cache entries.

use csig_core::Platform;
use csig_db::{CreatorRow, MatchCacheEntry};
use csig_engine::{CreatorProfile, MatchResult};

/// Platforms the creator has an identity on.
#[must_use]
pub fn active_platforms(creator: &CreatorRow) -> Vec<Platform> {
    let mut platforms = Vec::with_capacity(3);
    if creator.youtube_channel_id.is_some() {
        platforms.push(Platform::YouTube);
    }
    if creator.instagram_handle.is_some() {
        platforms.push(Platform::Instagram);
    }
    if creator.tiktok_handle.is_some() {
        platforms.push(Platform::TikTok);
    }
    platforms
}

/// The matcher's view of a stored creator.
#[must_use]
pub fn creator_profile(creator: &CreatorRow) -> CreatorProfile {
    CreatorProfile {
        display_name: creator.display_name.clone(),
        bio: creator.bio.clone(),
        followers: creator.total_followers,
        niches: creator.niches.iter().collect(),
        platforms: active_platforms(creator),
        engagement_rate: creator.engagement_rate,
        brand_readiness_score: creator
            .brand_readiness_score
            .and_then(|s| u8::try_from(s).ok()),
    }
}

/// Borrowed cache row for a computed match.
#[must_use]
pub fn match_cache_entry(result: &MatchResult) -> MatchCacheEntry<'_> {
    MatchCacheEntry {
        score: i16::from(result.score),
        tier: result.tier.as_str(),
        reasons: &result.reasons,
        highlights: &result.highlights,
        misses: &result.misses,
        breakdown: serde_json::to_value(&result.breakdown).unwrap_or_default(),
    }
}
