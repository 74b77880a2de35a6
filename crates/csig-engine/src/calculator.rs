//! Derived-metric calculations over snapshot history and content samples.
//!
//! Every function here is pure. A metric whose denominator is missing or zero
//! comes back as `None`, never as `0.0` or infinity, so downstream scoring can
//! tell "no data" apart from "no growth".

use chrono::{Duration, NaiveDate};

use crate::tiers::FollowerTier;
use crate::types::{ContentSample, DerivedMetrics, SnapshotPoint};

/// Snapshots older than this are ignored for growth calculations.
pub const HISTORY_WINDOW_DAYS: i64 = 90;

/// Number of most recent posts the content metrics are computed over.
pub const CONTENT_SAMPLE_SIZE: usize = 20;

/// Posts at or under this length count as shorts.
pub const SHORTS_MAX_SECS: i64 = 60;

/// How far (in days) the chosen historical snapshot may sit from the target
/// date for an `N`-day growth window.
#[must_use]
pub fn growth_tolerance_days(window_days: i64) -> i64 {
    (window_days / 4).max(2)
}

/// Percentage follower growth over `window_days`.
///
/// Looks at snapshots dated in `[today - 90d, today)` and picks the one
/// closest to `today - window_days`. Returns `None` when no snapshot lies
/// within [`growth_tolerance_days`] of the target, or when the historical
/// follower count is zero.
#[must_use]
pub fn growth_rate(
    snapshots: &[SnapshotPoint],
    current_followers: i64,
    today: NaiveDate,
    window_days: i64,
) -> Option<f64> {
    let earliest = today - Duration::days(HISTORY_WINDOW_DAYS);
    let mut history: Vec<&SnapshotPoint> = snapshots
        .iter()
        .filter(|s| s.date >= earliest && s.date < today)
        .collect();
    history.sort_by_key(|s| s.date);

    let target = today - Duration::days(window_days);
    let closest = closest_to(&history, target)?;

    if (closest.date - target).num_days().abs() > growth_tolerance_days(window_days) {
        return None;
    }
    if closest.total_followers <= 0 {
        return None;
    }

    #[allow(clippy::cast_precision_loss)]
    let (current, historical) = (current_followers as f64, closest.total_followers as f64);
    Some((current - historical) / historical * 100.0)
}

/// Binary search for the snapshot nearest `target` in a date-sorted slice.
/// Ties resolve to the older snapshot.
fn closest_to<'a>(sorted: &[&'a SnapshotPoint], target: NaiveDate) -> Option<&'a SnapshotPoint> {
    let idx = sorted.partition_point(|s| s.date < target);
    let after = sorted.get(idx).copied();
    let before = idx.checked_sub(1).and_then(|i| sorted.get(i)).copied();

    match (before, after) {
        (Some(b), Some(a)) => {
            if target - b.date <= a.date - target {
                Some(b)
            } else {
                Some(a)
            }
        }
        (b, a) => b.or(a),
    }
}

/// The `n` most recent posts, newest first. Undated posts sort last.
#[must_use]
pub fn recent_sample(items: &[ContentSample], n: usize) -> Vec<ContentSample> {
    let mut sorted: Vec<ContentSample> = items.to_vec();
    // Descending on `Option` puts `None` after every dated post.
    sorted.sort_by(|a, b| b.posted_at.cmp(&a.posted_at));
    sorted.truncate(n);
    sorted
}

/// `(likes + comments) / views * 100` over the given sample.
///
/// Posts without a view count are left out of both sums.
#[must_use]
pub fn engagement_rate(sample: &[ContentSample]) -> Option<f64> {
    let viewed = || sample.iter().filter(|s| s.views.is_some());
    let views: i64 = viewed().filter_map(|s| s.views).sum();
    if views <= 0 {
        return None;
    }
    let interactions: i64 = viewed()
        .map(|s| s.likes.unwrap_or(0) + s.comments.unwrap_or(0))
        .sum();

    #[allow(clippy::cast_precision_loss)]
    Some(interactions as f64 / views as f64 * 100.0)
}

/// Posts per week across the span between the oldest and newest dated post.
/// Requires at least two dated posts a non-zero time apart.
#[must_use]
pub fn posting_frequency(sample: &[ContentSample]) -> Option<f64> {
    let dates: Vec<_> = sample.iter().filter_map(|s| s.posted_at).collect();
    if dates.len() < 2 {
        return None;
    }
    let oldest = dates.iter().min()?;
    let newest = dates.iter().max()?;

    #[allow(clippy::cast_precision_loss)]
    let span_days = (*newest - *oldest).num_seconds() as f64 / 86_400.0;
    if span_days <= 0.0 {
        return None;
    }

    #[allow(clippy::cast_precision_loss)]
    let count = dates.len() as f64;
    Some(count / (span_days / 7.0))
}

/// Step function from posts-per-week to a 10..=100 consistency score.
#[must_use]
pub fn consistency_score(posting_frequency: Option<f64>) -> Option<u8> {
    let freq = posting_frequency?;
    let score = if freq >= 7.0 {
        100
    } else if freq >= 3.0 {
        80
    } else if freq >= 1.0 {
        60
    } else if freq >= 0.5 {
        40
    } else if freq >= 0.25 {
        20
    } else {
        10
    };
    Some(score)
}

/// Heuristic 0..=100 estimate of how organic an audience looks.
///
/// Starts at 50 and adjusts by engagement relative to the follower-tier
/// benchmark and by the average-views-to-followers ratio. Engagement far
/// above benchmark is penalised as a bought-engagement signal. Undefined
/// engagement yields `None`; zero followers skips the view-ratio adjustment.
#[must_use]
pub fn authenticity_score(
    engagement_rate: Option<f64>,
    followers: i64,
    avg_views: Option<f64>,
) -> Option<u8> {
    let engagement = engagement_rate?;
    let benchmark = FollowerTier::from_followers(followers).benchmark_engagement();

    let mut score: i32 = 50;

    score += if engagement >= benchmark * 1.5 {
        25
    } else if engagement >= benchmark {
        15
    } else if engagement >= benchmark * 0.5 {
        5
    } else {
        -10
    };

    if followers > 0 {
        if let Some(avg) = avg_views {
            #[allow(clippy::cast_precision_loss)]
            let ratio = avg / followers as f64;
            score += if (0.2..=0.5).contains(&ratio) {
                15
            } else if (0.1..=0.6).contains(&ratio) {
                10
            } else if ratio < 0.05 {
                -15
            } else if ratio > 1.0 {
                5
            } else {
                0
            };
        }
    }

    if engagement > benchmark * 3.0 {
        score -= 10;
    }

    u8::try_from(score.clamp(0, 100)).ok()
}

/// Mean views over posts that report a view count.
#[must_use]
pub fn average_views(sample: &[ContentSample]) -> Option<f64> {
    let views: Vec<i64> = sample.iter().filter_map(|s| s.views).collect();
    if views.is_empty() {
        return None;
    }
    #[allow(clippy::cast_precision_loss)]
    let mean = views.iter().sum::<i64>() as f64 / views.len() as f64;
    Some(mean)
}

/// Posts whose views exceed twice the sample average.
#[must_use]
pub fn viral_post_count(sample: &[ContentSample]) -> Option<u32> {
    let avg = average_views(sample)?;
    let threshold = avg * 2.0;
    #[allow(clippy::cast_precision_loss)]
    let count = sample
        .iter()
        .filter_map(|s| s.views)
        .filter(|v| *v as f64 > threshold)
        .count();
    u32::try_from(count).ok()
}

/// Percentage of posts with a known duration of 60 seconds or less.
#[must_use]
pub fn shorts_percentage(sample: &[ContentSample]) -> Option<f64> {
    if sample.is_empty() {
        return None;
    }
    let shorts = sample
        .iter()
        .filter(|s| s.duration_secs.is_some_and(|d| d <= SHORTS_MAX_SECS))
        .count();
    #[allow(clippy::cast_precision_loss)]
    Some(shorts as f64 / sample.len() as f64 * 100.0)
}

/// Compute every derived metric for one creator.
///
/// `content` may be any number of posts; only the [`CONTENT_SAMPLE_SIZE`]
/// most recent are used.
#[must_use]
pub fn compute_derived_metrics(
    snapshots: &[SnapshotPoint],
    content: &[ContentSample],
    current_followers: i64,
    today: NaiveDate,
) -> DerivedMetrics {
    compute_derived_metrics_sampled(
        snapshots,
        content,
        current_followers,
        today,
        CONTENT_SAMPLE_SIZE,
    )
}

/// Same as [`compute_derived_metrics`] over the `sample_size` most recent posts.
#[must_use]
pub fn compute_derived_metrics_sampled(
    snapshots: &[SnapshotPoint],
    content: &[ContentSample],
    current_followers: i64,
    today: NaiveDate,
    sample_size: usize,
) -> DerivedMetrics {
    let sample = recent_sample(content, sample_size);

    let engagement = engagement_rate(&sample);
    let avg_views = average_views(&sample);
    let frequency = posting_frequency(&sample);

    DerivedMetrics {
        growth_rate_7d: growth_rate(snapshots, current_followers, today, 7),
        growth_rate_30d: growth_rate(snapshots, current_followers, today, 30),
        engagement_rate: engagement,
        avg_views,
        posting_frequency: frequency,
        consistency_score: consistency_score(frequency),
        authenticity_score: authenticity_score(engagement, current_followers, avg_views),
        viral_post_count: viral_post_count(&sample),
        shorts_percentage: shorts_percentage(&sample),
    }
}

#[cfg(test)]
#[path = "calculator_test.rs"]
mod tests;
