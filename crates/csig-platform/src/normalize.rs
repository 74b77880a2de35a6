//! Normalization from raw YouTube shapes to the platform-neutral types in
//! [`csig_core`].

use std::sync::LazyLock;

use csig_core::{NormalizedChannelStats, NormalizedContentItem, Platform};
use regex::Regex;

use crate::types::{Channel, Video};

static ISO_DURATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^P(?:(\d+)W)?(?:(\d+)D)?(?:T(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)S)?)?$")
        .expect("valid ISO 8601 duration regex")
});

/// Converts a channel resource into [`NormalizedChannelStats`].
///
/// A hidden subscriber count becomes `followers: None` rather than zero.
#[must_use]
pub fn normalize_channel(channel: &Channel) -> NormalizedChannelStats {
    let snippet = channel.snippet.as_ref();
    let stats = channel.statistics.as_ref();

    let followers = stats
        .filter(|s| !s.hidden_subscriber_count)
        .and_then(|s| parse_count(s.subscriber_count.as_deref()));

    NormalizedChannelStats {
        platform: Platform::YouTube,
        channel_id: channel.id.clone(),
        title: snippet.and_then(|s| s.title.clone()),
        description: snippet
            .and_then(|s| s.description.clone())
            .filter(|d| !d.trim().is_empty()),
        followers,
        total_views: stats.and_then(|s| parse_count(s.view_count.as_deref())),
        video_count: stats.and_then(|s| parse_count(s.video_count.as_deref())),
    }
}

/// The channel's uploads playlist, if the API returned content details.
#[must_use]
pub fn uploads_playlist_id(channel: &Channel) -> Option<String> {
    channel
        .content_details
        .as_ref()
        .and_then(|d| d.related_playlists.as_ref())
        .and_then(|p| p.uploads.clone())
        .filter(|id| !id.is_empty())
}

/// Converts a video resource into a [`NormalizedContentItem`].
#[must_use]
pub fn normalize_video(video: &Video) -> NormalizedContentItem {
    let snippet = video.snippet.as_ref();
    let stats = video.statistics.as_ref();

    NormalizedContentItem {
        platform: Platform::YouTube,
        external_id: video.id.clone(),
        title: snippet.and_then(|s| s.title.clone()),
        views: stats.and_then(|s| parse_count(s.view_count.as_deref())),
        likes: stats.and_then(|s| parse_count(s.like_count.as_deref())),
        comments: stats.and_then(|s| parse_count(s.comment_count.as_deref())),
        posted_at: snippet.and_then(|s| s.published_at),
        duration_secs: video
            .content_details
            .as_ref()
            .and_then(|d| d.duration.as_deref())
            .and_then(parse_iso8601_duration),
    }
}

/// Parses a YouTube counter string. Negative or malformed values yield `None`.
pub(crate) fn parse_count(raw: Option<&str>) -> Option<i64> {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
        .filter(|n| *n >= 0)
}

/// Parses an ISO 8601 duration (`PT1H2M3S`, `P1DT2H`, `P0D`) into seconds.
///
/// Returns `None` for malformed input and for the bare designators `P`/`PT`.
#[must_use]
pub fn parse_iso8601_duration(raw: &str) -> Option<i64> {
    let caps = ISO_DURATION.captures(raw.trim())?;

    let mut total: i64 = 0;
    let mut any_component = false;
    for (index, unit_secs) in [(1, 604_800), (2, 86_400), (3, 3_600), (4, 60), (5, 1)] {
        if let Some(m) = caps.get(index) {
            let value: i64 = m.as_str().parse().ok()?;
            total = total.checked_add(value.checked_mul(unit_secs)?)?;
            any_component = true;
        }
    }

    any_component.then_some(total)
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
