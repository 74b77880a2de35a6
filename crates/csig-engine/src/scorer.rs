//! Additive heuristics that rank creators for discovery.
//!
//! Both scores are sums of fixed bands clamped to `0..=100`. An undefined
//! input contributes nothing to the sum.

use crate::types::{DerivedMetrics, SignalScores};

/// Inclusive follower range that earns the rising-score size bonus.
const RISING_SWEET_SPOT: std::ops::RangeInclusive<i64> = 10_000..=100_000;

/// Pick the points of the first band whose threshold `value` strictly exceeds.
fn band_above(value: Option<f64>, bands: &[(f64, u32)]) -> u32 {
    let Some(value) = value else {
        return 0;
    };
    bands
        .iter()
        .find(|(threshold, _)| value > *threshold)
        .map_or(0, |(_, points)| *points)
}

/// Pick the points of the first band whose threshold `value` meets or exceeds.
fn band_at_least(value: Option<f64>, bands: &[(f64, u32)]) -> u32 {
    let Some(value) = value else {
        return 0;
    };
    bands
        .iter()
        .find(|(threshold, _)| value >= *threshold)
        .map_or(0, |(_, points)| *points)
}

fn clamp_score(total: u32) -> u8 {
    u8::try_from(total.min(100)).unwrap_or(100)
}

fn view_ratio(avg_views: Option<f64>, followers: i64) -> Option<f64> {
    if followers <= 0 {
        return None;
    }
    #[allow(clippy::cast_precision_loss)]
    avg_views.map(|avg| avg / followers as f64)
}

/// Ranks creators that are growing fast while still small enough to be
/// attractive to brands.
///
/// `post_count` is the lifetime number of posts on the creator's channels.
#[must_use]
pub fn rising_score(metrics: &DerivedMetrics, followers: i64, post_count: Option<i64>) -> u8 {
    let growth_7d = band_above(
        metrics.growth_rate_7d,
        &[(10.0, 40), (5.0, 30), (2.0, 20), (0.0, 10)],
    );
    let growth_30d = band_above(
        metrics.growth_rate_30d,
        &[(30.0, 25), (20.0, 20), (10.0, 15), (0.0, 5)],
    );
    let reach = band_above(
        view_ratio(metrics.avg_views, followers),
        &[(1.0, 20), (0.5, 15), (0.2, 10), (0.1, 5)],
    );
    #[allow(clippy::cast_precision_loss)]
    let volume = band_above(
        post_count.map(|n| n as f64),
        &[(100.0, 10), (50.0, 7), (20.0, 5)],
    );
    let size = if RISING_SWEET_SPOT.contains(&followers) {
        5
    } else {
        0
    };

    clamp_score(growth_7d + growth_30d + reach + volume + size)
}

/// Estimates how prepared a creator's profile is for a paid partnership.
#[must_use]
pub fn brand_readiness_score(metrics: &DerivedMetrics, followers: i64) -> u8 {
    #[allow(clippy::cast_precision_loss)]
    let audience = band_at_least(
        Some(followers as f64),
        &[(100_000.0, 20), (50_000.0, 16), (10_000.0, 12), (1_000.0, 6)],
    );
    let engagement = band_at_least(
        metrics.engagement_rate,
        &[(6.0, 25), (4.0, 20), (2.0, 15), (1.0, 8)],
    );
    let consistency = fifth(metrics.consistency_score);
    let authenticity = fifth(metrics.authenticity_score);
    let momentum = band_above(metrics.growth_rate_7d, &[(5.0, 15), (2.0, 10), (0.0, 5)]);

    clamp_score(audience + engagement + consistency + authenticity + momentum)
}

/// `round(score * 0.2)`, so a 0..=100 sub-score contributes at most 20.
fn fifth(score: Option<u8>) -> u32 {
    score.map_or(0, |s| (u32::from(s) * 2 + 5) / 10)
}

/// Both discovery scores for one creator.
#[must_use]
pub fn score_creator(
    metrics: &DerivedMetrics,
    followers: i64,
    post_count: Option<i64>,
) -> SignalScores {
    SignalScores {
        rising_score: rising_score(metrics, followers, post_count),
        brand_readiness_score: brand_readiness_score(metrics, followers),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn maxed() -> DerivedMetrics {
        DerivedMetrics {
            growth_rate_7d: Some(50.0),
            growth_rate_30d: Some(120.0),
            engagement_rate: Some(12.0),
            avg_views: Some(500_000.0),
            posting_frequency: Some(10.0),
            consistency_score: Some(100),
            authenticity_score: Some(100),
            viral_post_count: Some(4),
            shorts_percentage: Some(10.0),
        }
    }

    #[test]
    fn undefined_metrics_score_zero() {
        let empty = DerivedMetrics::default();
        assert_eq!(rising_score(&empty, 0, None), 0);
        assert_eq!(brand_readiness_score(&empty, 0), 0);
    }

    #[test]
    fn rising_score_sums_every_band() {
        // 40 + 25 + 20 + 10 + 5 = 100.
        assert_eq!(rising_score(&maxed(), 50_000, Some(300)), 100);
    }

    #[test]
    fn rising_score_misses_size_bonus_outside_sweet_spot() {
        assert_eq!(rising_score(&maxed(), 250_000, Some(300)), 95);
        assert_eq!(rising_score(&maxed(), 9_999, Some(300)), 95);
    }

    #[test]
    fn rising_score_uses_strict_thresholds() {
        let metrics = DerivedMetrics {
            growth_rate_7d: Some(10.0),
            growth_rate_30d: Some(0.0),
            ..DerivedMetrics::default()
        };
        // 10% is not above 10, so the 7d band drops to 30; 0% earns nothing.
        assert_eq!(rising_score(&metrics, 1_000, Some(20)), 30);
    }

    #[test]
    fn rising_score_reach_needs_followers() {
        let metrics = DerivedMetrics {
            avg_views: Some(1_000.0),
            ..DerivedMetrics::default()
        };
        assert_eq!(rising_score(&metrics, 0, None), 0);
        // 1,000 / 3,000 ≈ 0.33 → 10.
        assert_eq!(rising_score(&metrics, 3_000, None), 10);
    }

    #[test]
    fn negative_growth_contributes_nothing() {
        let metrics = DerivedMetrics {
            growth_rate_7d: Some(-12.0),
            growth_rate_30d: Some(-40.0),
            ..DerivedMetrics::default()
        };
        assert_eq!(rising_score(&metrics, 500, Some(5)), 0);
        assert_eq!(brand_readiness_score(&metrics, 500), 0);
    }

    #[test]
    fn brand_readiness_sums_every_band() {
        // 20 + 25 + 20 + 20 + 15 = 100.
        assert_eq!(brand_readiness_score(&maxed(), 150_000), 100);
    }

    #[test]
    fn brand_readiness_rounds_sub_scores() {
        let metrics = DerivedMetrics {
            consistency_score: Some(80),
            authenticity_score: Some(65),
            ..DerivedMetrics::default()
        };
        // 16 + round(13.0) = 29.
        assert_eq!(brand_readiness_score(&metrics, 0), 29);

        let metrics = DerivedMetrics {
            authenticity_score: Some(63),
            ..DerivedMetrics::default()
        };
        // round(12.6) = 13.
        assert_eq!(brand_readiness_score(&metrics, 0), 13);
    }

    #[test]
    fn brand_readiness_follower_bands_are_inclusive() {
        let empty = DerivedMetrics::default();
        assert_eq!(brand_readiness_score(&empty, 100_000), 20);
        assert_eq!(brand_readiness_score(&empty, 50_000), 16);
        assert_eq!(brand_readiness_score(&empty, 10_000), 12);
        assert_eq!(brand_readiness_score(&empty, 1_000), 6);
        assert_eq!(brand_readiness_score(&empty, 999), 0);
    }

    #[test]
    fn scores_stay_within_bounds_across_inputs() {
        let growths = [None, Some(-50.0), Some(0.5), Some(3.0), Some(7.0), Some(99.0)];
        let followers = [0, 500, 12_000, 75_000, 2_000_000];
        for g in growths {
            for f in followers {
                let metrics = DerivedMetrics {
                    growth_rate_7d: g,
                    growth_rate_30d: g.map(|v| v * 4.0),
                    avg_views: g.map(|v| v.abs() * 1_000.0),
                    ..maxed()
                };
                let scores = score_creator(&metrics, f, Some(1_000));
                assert!(scores.rising_score <= 100);
                assert!(scores.brand_readiness_score <= 100);
            }
        }
    }
}
