use csig_core::{NicheSet, Platform};

use super::*;

fn tech_campaign() -> CampaignCriteria {
    CampaignCriteria {
        target_niches: ["Tech", "Gaming"].into_iter().collect(),
        min_followers: Some(10_000),
        max_followers: Some(100_000),
        target_engagement_rate: Some(3.0),
        ..CampaignCriteria::default()
    }
}

fn tech_creator() -> CreatorProfile {
    CreatorProfile {
        display_name: "Bench Byte".to_string(),
        followers: 45_000,
        niches: ["Tech"].into_iter().collect(),
        engagement_rate: Some(4.2),
        ..CreatorProfile::default()
    }
}

fn points(result: &MatchResult, dimension: MatchDimension) -> u8 {
    result
        .breakdown
        .iter()
        .find(|d| d.dimension == dimension)
        .map(|d| d.points)
        .expect("dimension present in breakdown")
}

#[test]
fn mid_range_tech_creator_scores_at_least_fifty() {
    let result = match_creator(&tech_campaign(), &tech_creator());

    assert!(result.score >= 50, "score was {}", result.score);
    assert!(
        result.highlights.iter().any(|h| h.contains("Tech")),
        "highlights: {:?}",
        result.highlights
    );
    assert_eq!(points(&result, MatchDimension::Niche), 15);
    assert_eq!(points(&result, MatchDimension::Followers), 20);
    assert_eq!(points(&result, MatchDimension::Engagement), 15);
}

#[test]
fn raising_engagement_never_lowers_score() {
    let campaign = tech_campaign();
    let mut previous = 0;
    for tenths in 0..=80 {
        let creator = CreatorProfile {
            engagement_rate: Some(f64::from(tenths) / 10.0),
            ..tech_creator()
        };
        let score = match_creator(&campaign, &creator).score;
        assert!(score >= previous, "score dropped at {tenths}");
        previous = score;
    }
}

#[test]
fn crossing_engagement_target_does_not_decrease_total() {
    let campaign = tech_campaign();
    let below = CreatorProfile {
        engagement_rate: Some(1.5),
        ..tech_creator()
    };
    let above = CreatorProfile {
        engagement_rate: Some(3.5),
        ..tech_creator()
    };
    assert!(match_creator(&campaign, &above).score >= match_creator(&campaign, &below).score);
}

#[test]
fn every_dimension_maxed_clamps_to_one_hundred() {
    let campaign = CampaignCriteria {
        title: "Wireless headset".to_string(),
        target_niches: ["Tech"].into_iter().collect(),
        min_followers: Some(10_000),
        max_followers: Some(100_000),
        target_engagement_rate: Some(3.0),
        preferred_platforms: vec![Platform::YouTube],
        content_styles: vec!["review".to_string()],
        brief: Some("gaming review setup".to_string()),
        description: None,
    };
    let creator = CreatorProfile {
        display_name: "Max Out".to_string(),
        bio: Some("Wireless headset gaming review setup tips".to_string()),
        followers: 55_000,
        niches: ["Tech"].into_iter().collect(),
        platforms: vec![Platform::YouTube],
        engagement_rate: Some(9.0),
        brand_readiness_score: Some(95),
    };

    let result = match_creator(&campaign, &creator);
    assert_eq!(result.score, 100);
    assert_eq!(result.tier, MatchTier::Excellent);
    assert!(result.misses.is_empty(), "misses: {:?}", result.misses);
    for d in &result.breakdown {
        assert_eq!(d.points, d.max, "{:?} not maxed", d.dimension);
    }
}

#[test]
fn unconstrained_campaign_earns_partial_credit() {
    let creator = CreatorProfile {
        display_name: "Anyone".to_string(),
        ..CreatorProfile::default()
    };
    let result = match_creator(&CampaignCriteria::default(), &creator);

    // niche 15 + followers 10 + engagement 8 + platforms 5.
    assert_eq!(result.score, 38);
    assert_eq!(result.tier, MatchTier::Fair);
    assert_eq!(points(&result, MatchDimension::Keywords), 0);
    assert_eq!(points(&result, MatchDimension::ContentStyle), 0);
    assert!(result.misses.iter().any(|m| m.contains("readiness")));
}

#[test]
fn breakdown_sums_to_score() {
    let result = match_creator(&tech_campaign(), &tech_creator());
    assert_eq!(result.breakdown.len(), 7);
    let sum: u32 = result.breakdown.iter().map(|d| u32::from(d.points)).sum();
    assert_eq!(sum, u32::from(result.score));
}

#[test]
fn no_niche_overlap_is_a_miss() {
    let creator = CreatorProfile {
        niches: ["Food"].into_iter().collect(),
        ..tech_creator()
    };
    let result = match_creator(&tech_campaign(), &creator);
    assert_eq!(points(&result, MatchDimension::Niche), 0);
    assert!(result.misses.iter().any(|m| m.contains("target niches")));
}

#[test]
fn niche_overlap_is_case_insensitive() {
    let creator = CreatorProfile {
        niches: NicheSet::from_iter(["gaming", "TECH"]),
        ..tech_creator()
    };
    let result = match_creator(&tech_campaign(), &creator);
    assert_eq!(points(&result, MatchDimension::Niche), 30);
}

#[test]
fn follower_bands() {
    let campaign = tech_campaign();
    let at = |followers: i64| {
        let creator = CreatorProfile {
            followers,
            ..tech_creator()
        };
        points(&match_creator(&campaign, &creator), MatchDimension::Followers)
    };

    assert_eq!(at(50_000), 20);
    assert_eq!(at(20_000), 15);
    assert_eq!(at(100_000), 15);
    assert_eq!(at(9_000), 8);
    assert_eq!(at(115_000), 8);
    assert_eq!(at(5_000), 0);
    assert_eq!(at(500_000), 0);
}

#[test]
fn follower_miss_names_the_range() {
    let creator = CreatorProfile {
        followers: 2_000,
        ..tech_creator()
    };
    let result = match_creator(&tech_campaign(), &creator);
    assert!(result
        .misses
        .iter()
        .any(|m| m.contains("2K") && m.contains("10K–100K")));
}

#[test]
fn open_ended_follower_range() {
    let campaign = CampaignCriteria {
        min_followers: Some(50_000),
        ..CampaignCriteria::default()
    };
    let big = CreatorProfile {
        followers: 5_000_000,
        ..CreatorProfile::default()
    };
    assert_eq!(
        points(&match_creator(&campaign, &big), MatchDimension::Followers),
        15
    );
}

#[test]
fn engagement_bands() {
    let campaign = CampaignCriteria {
        target_engagement_rate: Some(5.0),
        ..CampaignCriteria::default()
    };
    let at = |rate: Option<f64>| {
        let creator = CreatorProfile {
            engagement_rate: rate,
            ..CreatorProfile::default()
        };
        points(&match_creator(&campaign, &creator), MatchDimension::Engagement)
    };

    assert_eq!(at(Some(5.0)), 15);
    assert_eq!(at(Some(4.1)), 10);
    assert_eq!(at(Some(3.6)), 6);
    assert_eq!(at(Some(3.0)), 0);
    assert_eq!(at(None), 0);
}

#[test]
fn platform_overlap_is_proportional() {
    let campaign = CampaignCriteria {
        preferred_platforms: vec![Platform::YouTube, Platform::TikTok],
        ..CampaignCriteria::default()
    };
    let creator = CreatorProfile {
        platforms: vec![Platform::YouTube, Platform::Instagram],
        ..CreatorProfile::default()
    };
    let result = match_creator(&campaign, &creator);
    assert_eq!(points(&result, MatchDimension::Platforms), 5);
    assert!(result.reasons.iter().any(|r| r == "Active on youtube"));
}

#[test]
fn readiness_bands() {
    let at = |score: Option<u8>| {
        let creator = CreatorProfile {
            brand_readiness_score: score,
            ..CreatorProfile::default()
        };
        points(
            &match_creator(&CampaignCriteria::default(), &creator),
            MatchDimension::BrandReadiness,
        )
    };
    assert_eq!(at(Some(70)), 10);
    assert_eq!(at(Some(69)), 5);
    assert_eq!(at(Some(50)), 5);
    assert_eq!(at(Some(49)), 0);
    assert_eq!(at(None), 0);
}

#[test]
fn keyword_tokens_drop_short_and_stop_words() {
    let words = keywords("The brand wants creators with honest, long-form reviews of our gear");
    assert!(words.contains("honest"));
    assert!(words.contains("reviews"));
    assert!(words.contains("gear"));
    assert!(words.contains("form"));
    assert!(!words.contains("the"));
    assert!(!words.contains("with"));
    assert!(!words.contains("brand"));
    assert!(!words.contains("our"));
}

#[test]
fn keyword_bands() {
    let brief = "alpha bravo charlie delta echoes";
    assert_eq!(score_keywords(brief, "alpha bravo charlie delta echoes").points, 10);
    assert_eq!(score_keywords(brief, "alpha bravo charlie").points, 6);
    assert_eq!(score_keywords(brief, "alpha").points, 3);
    let none = score_keywords("alpha bravo", "zulu");
    assert_eq!(none.points, 0);
    assert!(none.miss.is_some());
    assert!(score_keywords("", "anything").miss.is_none());
}

#[test]
fn content_style_uses_keyword_table_and_falls_back_to_tag() {
    let styles = vec!["Tutorials".to_string(), "asmr".to_string()];
    let outcome = score_content_style(&styles, "step by step guide channel");
    // One of two styles matched.
    assert_eq!(outcome.points, 3);

    let outcome = score_content_style(&styles, "relaxing asmr and a walkthrough");
    assert_eq!(outcome.points, 5);

    let outcome = score_content_style(&styles, "cooking");
    assert_eq!(outcome.points, 0);
    assert!(outcome.miss.is_some());
}

#[test]
fn matching_is_deterministic() {
    let campaign = tech_campaign();
    let creator = tech_creator();
    assert_eq!(
        match_creator(&campaign, &creator),
        match_creator(&campaign, &creator)
    );
}

#[test]
fn format_count_is_compact() {
    assert_eq!(format_count(950), "950");
    assert_eq!(format_count(45_000), "45K");
    assert_eq!(format_count(12_500), "12.5K");
    assert_eq!(format_count(1_500_000), "1.5M");
}

#[test]
fn empty_brief_and_styles_still_explain_their_zero() {
    let result = match_creator(&tech_campaign(), &tech_creator());

    assert_eq!(points(&result, MatchDimension::Keywords), 0);
    assert_eq!(points(&result, MatchDimension::ContentStyle), 0);
    assert!(result.misses.iter().any(|m| m == "No brief keywords to match"));
    assert!(result.misses.iter().any(|m| m == "No content styles requested"));
}
