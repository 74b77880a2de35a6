//! Explainable scoring of one creator against one campaign's criteria.
//!
//! Each dimension is capped independently and reports either a reason (with
//! an optional highlight) or a miss. The caller renders those strings
//! verbatim, so they are written for people, not machines.

use std::collections::BTreeSet;

use csig_core::CampaignCriteria;

use crate::types::{CreatorProfile, DimensionScore, MatchDimension, MatchResult, MatchTier};

const NICHE_MAX: u8 = 30;
const NICHE_UNCONSTRAINED: u8 = 15;
const FOLLOWERS_MAX: u8 = 20;
const FOLLOWERS_IN_RANGE: u8 = 15;
const FOLLOWERS_SWEET_SPOT_BONUS: u8 = 5;
const FOLLOWERS_NEAR_RANGE: u8 = 8;
const FOLLOWERS_UNCONSTRAINED: u8 = 10;
/// Fractional slack on either side of the follower range that still earns
/// partial credit.
const FOLLOWER_TOLERANCE: f64 = 0.2;
const ENGAGEMENT_MAX: u8 = 15;
const ENGAGEMENT_UNCONSTRAINED: u8 = 8;
const PLATFORMS_MAX: u8 = 10;
const PLATFORMS_UNCONSTRAINED: u8 = 5;
const READINESS_MAX: u8 = 10;
const KEYWORDS_MAX: u8 = 10;
const STYLE_MAX: u8 = 5;

/// Free-text tokens must be longer than this to count as keywords.
const MIN_KEYWORD_LEN: usize = 3;

const STOP_WORDS: &[&str] = &[
    "about", "after", "also", "been", "before", "being", "brand", "campaign", "could", "creator",
    "creators", "each", "from", "have", "into", "just", "like", "looking", "more", "most", "must",
    "only", "other", "over", "some", "such", "than", "that", "their", "them", "then", "there",
    "these", "they", "this", "those", "very", "want", "were", "what", "when", "where", "which",
    "while", "will", "with", "would", "your", "ours",
];

/// Content-style tag → keywords that signal it in a creator's name or bio.
const STYLE_KEYWORDS: &[(&str, &[&str])] = &[
    ("educational", &["learn", "explain", "education", "teach", "science", "lesson"]),
    ("tutorials", &["tutorial", "how to", "how-to", "guide", "walkthrough", "step by step"]),
    ("review", &["review", "unboxing", "honest", "tested", "comparison"]),
    ("entertainment", &["funny", "comedy", "entertain", "challenge", "reaction"]),
    ("vlog", &["vlog", "day in", "daily", "behind the scenes"]),
    ("lifestyle", &["lifestyle", "routine", "everyday", "life"]),
    ("storytelling", &["story", "stories", "journey", "documentary"]),
    ("live", &["live", "stream", "streams"]),
    ("shortform", &["shorts", "reels", "tiktok", "short-form"]),
];

/// Points and explanation produced by one dimension.
struct Outcome {
    points: u8,
    reason: Option<String>,
    highlight: Option<String>,
    miss: Option<String>,
}

impl Outcome {
    fn hit(points: u8, reason: impl Into<String>) -> Self {
        Self {
            points,
            reason: Some(reason.into()),
            highlight: None,
            miss: None,
        }
    }

    fn miss(points: u8, miss: impl Into<String>) -> Self {
        Self {
            points,
            reason: None,
            highlight: None,
            miss: Some(miss.into()),
        }
    }

    fn with_highlight(mut self, highlight: impl Into<String>) -> Self {
        self.highlight = Some(highlight.into());
        self
    }
}

/// Score `creator` against `criteria`.
///
/// Pure and deterministic; absent optional fields on either side are
/// zero-weight inputs, never errors.
#[must_use]
pub fn match_creator(criteria: &CampaignCriteria, creator: &CreatorProfile) -> MatchResult {
    let creator_text = creator.searchable_text();

    let dimensions = [
        (MatchDimension::Niche, NICHE_MAX, score_niche(criteria, creator)),
        (
            MatchDimension::Followers,
            FOLLOWERS_MAX,
            score_followers(criteria, creator.followers),
        ),
        (
            MatchDimension::Engagement,
            ENGAGEMENT_MAX,
            score_engagement(criteria.target_engagement_rate, creator.engagement_rate),
        ),
        (
            MatchDimension::Platforms,
            PLATFORMS_MAX,
            score_platforms(criteria, creator),
        ),
        (
            MatchDimension::BrandReadiness,
            READINESS_MAX,
            score_readiness(creator.brand_readiness_score),
        ),
        (
            MatchDimension::Keywords,
            KEYWORDS_MAX,
            score_keywords(&criteria.free_text(), &creator_text),
        ),
        (
            MatchDimension::ContentStyle,
            STYLE_MAX,
            score_content_style(&criteria.content_styles, &creator_text),
        ),
    ];

    let mut result = MatchResult {
        score: 0,
        tier: MatchTier::Weak,
        reasons: Vec::new(),
        highlights: Vec::new(),
        misses: Vec::new(),
        breakdown: Vec::with_capacity(dimensions.len()),
    };

    let mut total: u32 = 0;
    for (dimension, max, outcome) in dimensions {
        let points = outcome.points.min(max);
        total += u32::from(points);
        result.breakdown.push(DimensionScore {
            dimension,
            points,
            max,
        });
        result.reasons.extend(outcome.reason);
        result.highlights.extend(outcome.highlight);
        result.misses.extend(outcome.miss);
    }

    result.score = u8::try_from(total.min(100)).unwrap_or(100);
    result.tier = MatchTier::from_score(result.score);
    result
}

/// `round(matched / total * max)` in integer arithmetic.
fn proportional(matched: usize, total: usize, max: u8) -> u8 {
    if total == 0 {
        return 0;
    }
    let scaled = (matched.min(total) * usize::from(max) * 2 + total) / (2 * total);
    u8::try_from(scaled).unwrap_or(max)
}

fn score_niche(criteria: &CampaignCriteria, creator: &CreatorProfile) -> Outcome {
    if criteria.target_niches.is_empty() {
        return Outcome::hit(NICHE_UNCONSTRAINED, "Campaign is open to any niche");
    }

    let matched: Vec<&str> = criteria
        .target_niches
        .iter()
        .filter(|niche| creator.niches.contains(niche))
        .collect();

    if matched.is_empty() {
        let wanted: Vec<&str> = criteria.target_niches.iter().collect();
        return Outcome::miss(
            0,
            format!("No overlap with target niches ({})", wanted.join(", ")),
        );
    }

    let points = proportional(matched.len(), criteria.target_niches.len(), NICHE_MAX);
    let joined = matched.join(", ");
    Outcome::hit(
        points,
        format!(
            "Covers {} of {} target niches",
            matched.len(),
            criteria.target_niches.len()
        ),
    )
    .with_highlight(format!("{joined} creator"))
}

fn score_followers(criteria: &CampaignCriteria, followers: i64) -> Outcome {
    let (min, max) = (criteria.min_followers, criteria.max_followers);
    if min.is_none() && max.is_none() {
        return Outcome::hit(FOLLOWERS_UNCONSTRAINED, "No follower range requested");
    }

    let above_min = min.is_none_or(|m| followers >= m);
    let below_max = max.is_none_or(|m| followers <= m);
    let audience = format_count(followers);

    if above_min && below_max {
        let mut points = FOLLOWERS_IN_RANGE;
        let mut outcome_reason = format!("{audience} followers is within the target range");
        if let (Some(lo), Some(hi)) = (min, max) {
            if in_sweet_spot(followers, lo, hi) {
                points += FOLLOWERS_SWEET_SPOT_BONUS;
                outcome_reason = format!("{audience} followers sits in the middle of the target range");
            }
        }
        return Outcome::hit(points, outcome_reason)
            .with_highlight(format!("{audience} followers"));
    }

    #[allow(clippy::cast_precision_loss)]
    let near = {
        let f = followers as f64;
        let near_min = min.is_none_or(|m| f >= m as f64 * (1.0 - FOLLOWER_TOLERANCE));
        let near_max = max.is_none_or(|m| f <= m as f64 * (1.0 + FOLLOWER_TOLERANCE));
        near_min && near_max
    };

    if near {
        return Outcome::hit(
            FOLLOWERS_NEAR_RANGE,
            format!("{audience} followers is just outside the target range"),
        );
    }

    let range = match (min, max) {
        (Some(lo), Some(hi)) => format!("{}–{}", format_count(lo), format_count(hi)),
        (Some(lo), None) => format!("{}+", format_count(lo)),
        (None, Some(hi)) => format!("up to {}", format_count(hi)),
        (None, None) => String::new(),
    };
    Outcome::miss(
        0,
        format!("{audience} followers is outside the target range ({range})"),
    )
}

/// Middle half of `[lo, hi]`.
fn in_sweet_spot(followers: i64, lo: i64, hi: i64) -> bool {
    if hi <= lo {
        return false;
    }
    let quarter = (hi - lo) / 4;
    (lo + quarter..=hi - quarter).contains(&followers)
}

fn score_engagement(target: Option<f64>, actual: Option<f64>) -> Outcome {
    let Some(target) = target.filter(|t| *t > 0.0) else {
        return Outcome::hit(ENGAGEMENT_UNCONSTRAINED, "No engagement target set");
    };
    let Some(actual) = actual else {
        return Outcome::miss(0, "No engagement data yet");
    };

    if actual >= target {
        Outcome::hit(
            ENGAGEMENT_MAX,
            format!("{actual:.1}% engagement meets the {target:.1}% target"),
        )
        .with_highlight(format!("{actual:.1}% engagement"))
    } else if actual >= target * 0.8 {
        Outcome::hit(
            10,
            format!("{actual:.1}% engagement is close to the {target:.1}% target"),
        )
    } else if actual >= target * 0.7 {
        Outcome::hit(
            6,
            format!("{actual:.1}% engagement is somewhat below the {target:.1}% target"),
        )
    } else {
        Outcome::miss(
            0,
            format!("{actual:.1}% engagement is well below the {target:.1}% target"),
        )
    }
}

fn score_platforms(criteria: &CampaignCriteria, creator: &CreatorProfile) -> Outcome {
    let wanted: BTreeSet<_> = criteria.preferred_platforms.iter().copied().collect();
    if wanted.is_empty() {
        return Outcome::hit(PLATFORMS_UNCONSTRAINED, "No platform preference");
    }

    let active: Vec<String> = wanted
        .iter()
        .filter(|p| creator.platforms.contains(p))
        .map(ToString::to_string)
        .collect();

    if active.is_empty() {
        let names: Vec<String> = wanted.iter().map(ToString::to_string).collect();
        return Outcome::miss(
            0,
            format!("Not active on preferred platforms ({})", names.join(", ")),
        );
    }

    Outcome::hit(
        proportional(active.len(), wanted.len(), PLATFORMS_MAX),
        format!("Active on {}", active.join(", ")),
    )
}

fn score_readiness(score: Option<u8>) -> Outcome {
    match score {
        Some(s) if s >= 70 => Outcome::hit(READINESS_MAX, format!("Brand readiness {s}/100"))
            .with_highlight("Brand-ready profile"),
        Some(s) if s >= 50 => Outcome::hit(5, format!("Brand readiness {s}/100")),
        Some(s) => Outcome::miss(0, format!("Low brand readiness ({s}/100)")),
        None => Outcome::miss(0, "Brand readiness not scored yet"),
    }
}

/// Lowercase words longer than [`MIN_KEYWORD_LEN`], minus stop words,
/// deduplicated.
fn keywords(text: &str) -> BTreeSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.chars().count() > MIN_KEYWORD_LEN)
        .map(str::to_lowercase)
        .filter(|w| !STOP_WORDS.contains(&w.as_str()))
        .collect()
}

fn score_keywords(free_text: &str, creator_text: &str) -> Outcome {
    let wanted = keywords(free_text);
    if wanted.is_empty() {
        return Outcome::miss(0, "No brief keywords to match");
    }

    let found = wanted.iter().filter(|w| creator_text.contains(w.as_str())).count();
    let points = match found {
        5.. => KEYWORDS_MAX,
        3..=4 => 6,
        1..=2 => 3,
        0 => return Outcome::miss(0, "Profile does not mention the campaign brief's keywords"),
    };
    Outcome::hit(points, format!("Profile mentions {found} campaign keywords"))
}

fn style_keywords(style: &str) -> Vec<&str> {
    STYLE_KEYWORDS
        .iter()
        .find(|(tag, _)| tag.eq_ignore_ascii_case(style))
        .map_or_else(|| vec![style], |(_, words)| words.to_vec())
}

fn score_content_style(styles: &[String], creator_text: &str) -> Outcome {
    let requested: BTreeSet<String> = styles
        .iter()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect();
    if requested.is_empty() {
        return Outcome::miss(0, "No content styles requested");
    }

    let matched: Vec<&str> = requested
        .iter()
        .map(String::as_str)
        .filter(|style| {
            style_keywords(style)
                .iter()
                .any(|kw| creator_text.contains(kw))
        })
        .collect();

    if matched.is_empty() {
        let names: Vec<&str> = requested.iter().map(String::as_str).collect();
        return Outcome::miss(
            0,
            format!("No sign of requested content styles ({})", names.join(", ")),
        );
    }

    Outcome::hit(
        proportional(matched.len(), requested.len(), STYLE_MAX),
        format!("Content style fits: {}", matched.join(", ")),
    )
}

/// Compact human count: `950`, `45K`, `1.2M`.
#[must_use]
pub fn format_count(n: i64) -> String {
    #[allow(clippy::cast_precision_loss)]
    let value = n as f64;
    if n.abs() >= 1_000_000 {
        trim_decimal(value / 1_000_000.0, "M")
    } else if n.abs() >= 1_000 {
        trim_decimal(value / 1_000.0, "K")
    } else {
        n.to_string()
    }
}

fn trim_decimal(value: f64, suffix: &str) -> String {
    let formatted = format!("{value:.1}");
    let trimmed = formatted.strip_suffix(".0").unwrap_or(&formatted);
    format!("{trimmed}{suffix}")
}

#[cfg(test)]
#[path = "matcher_test.rs"]
mod tests;
