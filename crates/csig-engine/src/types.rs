use chrono::{DateTime, NaiveDate, Utc};
use csig_core::{NicheSet, NormalizedContentItem, Platform};
use serde::{Deserialize, Serialize};

/// One day of aggregate history for a creator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotPoint {
    pub date: NaiveDate,
    pub total_followers: i64,
    pub total_views: Option<i64>,
}

/// Engagement counters for one sampled post.
///
/// Missing counters contribute nothing to sums; they are never read as a
/// real zero for denominators.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentSample {
    pub views: Option<i64>,
    pub likes: Option<i64>,
    pub comments: Option<i64>,
    pub posted_at: Option<DateTime<Utc>>,
    pub duration_secs: Option<i64>,
}

impl From<&NormalizedContentItem> for ContentSample {
    fn from(item: &NormalizedContentItem) -> Self {
        Self {
            views: item.views,
            likes: item.likes,
            comments: item.comments,
            posted_at: item.posted_at,
            duration_secs: item.duration_secs,
        }
    }
}

/// Metrics derived from a creator's snapshot history and content sample.
///
/// `None` means the metric is undefined for lack of data, which is distinct
/// from a measured zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DerivedMetrics {
    pub growth_rate_7d: Option<f64>,
    pub growth_rate_30d: Option<f64>,
    /// Percent, `(likes + comments) / views * 100`.
    pub engagement_rate: Option<f64>,
    pub avg_views: Option<f64>,
    /// Posts per week.
    pub posting_frequency: Option<f64>,
    pub consistency_score: Option<u8>,
    pub authenticity_score: Option<u8>,
    pub viral_post_count: Option<u32>,
    /// Percent of sampled posts that are 60 seconds or shorter.
    pub shorts_percentage: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalScores {
    pub rising_score: u8,
    pub brand_readiness_score: u8,
}

/// The slice of a creator the matcher needs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CreatorProfile {
    pub display_name: String,
    pub bio: Option<String>,
    pub followers: i64,
    pub niches: NicheSet,
    /// Platforms the creator is active on.
    pub platforms: Vec<Platform>,
    pub engagement_rate: Option<f64>,
    pub brand_readiness_score: Option<u8>,
}

impl CreatorProfile {
    /// Lowercased name and bio, the haystack for keyword checks.
    #[must_use]
    pub fn searchable_text(&self) -> String {
        let mut text = self.display_name.to_lowercase();
        if let Some(bio) = &self.bio {
            text.push(' ');
            text.push_str(&bio.to_lowercase());
        }
        text
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchDimension {
    Niche,
    Followers,
    Engagement,
    Platforms,
    BrandReadiness,
    Keywords,
    ContentStyle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionScore {
    pub dimension: MatchDimension,
    pub points: u8,
    pub max: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchTier {
    Weak,
    Fair,
    Good,
    Strong,
    Excellent,
}

impl MatchTier {
    #[must_use]
    pub fn from_score(score: u8) -> Self {
        match score {
            80.. => MatchTier::Excellent,
            60..=79 => MatchTier::Strong,
            40..=59 => MatchTier::Good,
            20..=39 => MatchTier::Fair,
            _ => MatchTier::Weak,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            MatchTier::Excellent => "excellent",
            MatchTier::Strong => "strong",
            MatchTier::Good => "good",
            MatchTier::Fair => "fair",
            MatchTier::Weak => "weak",
        }
    }
}

impl std::fmt::Display for MatchTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of scoring one creator against one campaign.
///
/// Derived data: safe to cache, but always recomputable from the current
/// criteria and creator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    pub score: u8,
    pub tier: MatchTier,
    pub reasons: Vec<String>,
    pub highlights: Vec<String>,
    pub misses: Vec<String>,
    pub breakdown: Vec<DimensionScore>,
}
