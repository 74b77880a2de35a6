//! Keyword-table niche classifier.

use csig_core::NicheSet;

/// Tag returned when no niche keyword appears in the text.
pub const FALLBACK_NICHE: &str = "General";

/// Maximum number of niches a single creator is tagged with.
pub const MAX_NICHES: usize = 3;

/// Niche → lowercase keywords. Order breaks ties between equal hit counts.
pub(crate) const NICHE_KEYWORDS: &[(&str, &[&str])] = &[
    (
        "Gaming",
        &[
            "gaming", "gamer", "game", "esports", "speedrun", "stream", "twitch", "minecraft",
            "fortnite", "playstation", "xbox", "nintendo", "shooter",
        ],
    ),
    (
        "Tech",
        &[
            "tech", "gadget", "unboxing", "smartphone", "laptop", "pc build", "coding",
            "programming", "software", "hardware", "setup",
        ],
    ),
    (
        "Beauty",
        &[
            "beauty", "makeup", "skincare", "cosmetic", "hair", "nail", "grwm", "lipstick",
        ],
    ),
    (
        "Fashion",
        &[
            "fashion", "style", "outfit", "ootd", "streetwear", "thrift", "haul", "wardrobe",
        ],
    ),
    (
        "Fitness",
        &[
            "fitness", "workout", "gym", "strength", "training", "yoga", "mobility", "running",
            "bodybuilding", "supplement",
        ],
    ),
    (
        "Food",
        &[
            "food", "recipe", "cooking", "kitchen", "meal prep", "baking", "chef", "vegan",
            "restaurant", "foodie",
        ],
    ),
    (
        "Travel",
        &[
            "travel", "vlog", "adventure", "backpacking", "destination", "hotel", "road trip",
            "wanderlust",
        ],
    ),
    (
        "Finance",
        &[
            "finance", "investing", "stocks", "crypto", "budget", "money", "personal finance",
            "real estate",
        ],
    ),
    (
        "Education",
        &[
            "education", "tutorial", "explained", "learn", "science", "history", "study",
            "lesson",
        ],
    ),
    (
        "Music",
        &[
            "music", "cover", "singer", "producer", "guitar", "piano", "beats", "song",
        ],
    ),
    (
        "Comedy",
        &["comedy", "funny", "sketch", "prank", "skit", "parody", "meme"],
    ),
    (
        "Lifestyle",
        &[
            "lifestyle", "daily vlog", "routine", "home decor", "minimalism", "productivity",
            "family",
        ],
    ),
    (
        "Parenting",
        &["parenting", "mom", "dad", "kids", "toddler", "baby"],
    ),
    (
        "Pets",
        &["pets", "dog", "puppy", "cat", "kitten", "animal"],
    ),
    (
        "Sports",
        &[
            "sports", "football", "soccer", "basketball", "nba", "nfl", "golf", "tennis",
            "cycling",
        ],
    ),
    (
        "Automotive",
        &["car", "automotive", "motorcycle", "detailing", "truck"],
    ),
];

/// Rank niches by keyword hits in `text`.
///
/// Matching is case-insensitive substring containment. Returns at most
/// [`MAX_NICHES`] niches with at least one hit, most hits first; when
/// nothing matches the result is exactly `[FALLBACK_NICHE]`.
#[must_use]
pub fn classify_niches(text: &str) -> Vec<&'static str> {
    let haystack = text.to_lowercase();

    let mut hits: Vec<(usize, &'static str)> = NICHE_KEYWORDS
        .iter()
        .filter_map(|(niche, keywords)| {
            let count = keywords.iter().filter(|kw| haystack.contains(*kw)).count();
            (count > 0).then_some((count, *niche))
        })
        .collect();

    if hits.is_empty() {
        return vec![FALLBACK_NICHE];
    }

    // Stable sort keeps table order among equal counts.
    hits.sort_by(|a, b| b.0.cmp(&a.0));
    hits.into_iter()
        .take(MAX_NICHES)
        .map(|(_, niche)| niche)
        .collect()
}

/// Classify a creator from their channel title and bio.
#[must_use]
pub fn classify_creator(title: &str, bio: Option<&str>) -> NicheSet {
    let text = match bio {
        Some(bio) => format!("{title} {bio}"),
        None => title.to_string(),
    };
    classify_niches(&text).into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unmatched_text_returns_single_fallback() {
        assert_eq!(classify_niches("zzz qqq"), vec![FALLBACK_NICHE]);
        assert_eq!(classify_niches(""), vec![FALLBACK_NICHE]);
    }

    #[test]
    fn ranks_by_hit_count() {
        let niches = classify_niches("Gaming streams, speedrun runs and one gadget review");
        assert_eq!(niches.first(), Some(&"Gaming"));
        assert!(niches.contains(&"Tech"));
    }

    #[test]
    fn matching_is_case_insensitive() {
        assert_eq!(classify_niches("RECIPE and COOKING"), vec!["Food"]);
    }

    #[test]
    fn returns_at_most_three() {
        let text = "gaming tech beauty fashion fitness food travel";
        assert_eq!(classify_niches(text).len(), MAX_NICHES);
    }

    #[test]
    fn ties_follow_table_order() {
        // One hit each: Tech precedes Food in the table.
        assert_eq!(classify_niches("recipe laptop"), vec!["Tech", "Food"]);
    }

    #[test]
    fn deterministic_across_calls() {
        let text = "Strength training, mobility routines and honest supplement reviews.";
        let first = classify_niches(text);
        for _ in 0..5 {
            assert_eq!(classify_niches(text), first);
        }
        assert_eq!(first.first(), Some(&"Fitness"));
    }

    #[test]
    fn classify_creator_combines_title_and_bio() {
        let set = classify_creator("Cook With Ana", Some("Quick weeknight recipes"));
        assert!(set.contains("food"));
        assert!(!set.is_empty());
    }

    #[test]
    fn classify_creator_without_bio_falls_back() {
        let set = classify_creator("Zed", None);
        assert_eq!(set.to_vec(), vec![FALLBACK_NICHE.to_string()]);
    }

    #[test]
    fn table_has_unique_niches() {
        let mut names: Vec<&str> = NICHE_KEYWORDS.iter().map(|(n, _)| *n).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), NICHE_KEYWORDS.len());
        assert!(!names.contains(&FALLBACK_NICHE));
    }
}
