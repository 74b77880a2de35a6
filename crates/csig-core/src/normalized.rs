//! Platform-neutral payloads produced by platform clients and consumed by the
//! collector and the store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::platform::Platform;

/// Current channel-level statistics for one creator on one platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedChannelStats {
    pub platform: Platform,
    pub channel_id: String,
    pub title: Option<String>,
    pub description: Option<String>,
    /// `None` when the platform hides the subscriber count.
    pub followers: Option<i64>,
    pub total_views: Option<i64>,
    pub video_count: Option<i64>,
}

/// One post/video, keyed by its platform-stable identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedContentItem {
    pub platform: Platform,
    pub external_id: String,
    pub title: Option<String>,
    pub views: Option<i64>,
    pub likes: Option<i64>,
    pub comments: Option<i64>,
    pub posted_at: Option<DateTime<Utc>>,
    pub duration_secs: Option<i64>,
}
