use serde::{Deserialize, Serialize};

use crate::niches::NicheSet;
use crate::platform::Platform;

/// Targeting criteria a brand attaches to a campaign.
///
/// Every field is optional; an absent constraint is neither a match nor a
/// miss for the matcher, it simply earns the dimension's "unconstrained"
/// credit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CampaignCriteria {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub target_niches: NicheSet,
    pub min_followers: Option<i64>,
    pub max_followers: Option<i64>,
    /// Target engagement rate in percent (e.g. `3.0` for 3%).
    pub target_engagement_rate: Option<f64>,
    #[serde(default)]
    pub preferred_platforms: Vec<Platform>,
    #[serde(default)]
    pub content_styles: Vec<String>,
    pub brief: Option<String>,
    pub description: Option<String>,
}

impl CampaignCriteria {
    /// Concatenated free text used for keyword overlap scoring.
    #[must_use]
    pub fn free_text(&self) -> String {
        [
            Some(self.title.as_str()),
            self.brief.as_deref(),
            self.description.as_deref(),
        ]
        .into_iter()
        .flatten()
        .filter(|s| !s.trim().is_empty())
        .collect::<Vec<_>>()
        .join(" ")
    }

    #[must_use]
    pub fn has_follower_range(&self) -> bool {
        self.min_followers.is_some() || self.max_followers.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn free_text_joins_present_fields() {
        let criteria = CampaignCriteria {
            title: "Spring Launch".to_string(),
            brief: Some("Unboxing videos".to_string()),
            description: None,
            ..CampaignCriteria::default()
        };
        assert_eq!(criteria.free_text(), "Spring Launch Unboxing videos");
    }

    #[test]
    fn free_text_skips_blank_fields() {
        let criteria = CampaignCriteria {
            brief: Some("   ".to_string()),
            description: Some("gadgets".to_string()),
            ..CampaignCriteria::default()
        };
        assert_eq!(criteria.free_text(), "gadgets");
    }

    #[test]
    fn deserializes_with_missing_optional_fields() {
        let criteria: CampaignCriteria =
            serde_json::from_str(r#"{"target_niches":["Tech"],"preferred_platforms":["youtube"]}"#)
                .unwrap();
        assert!(criteria.target_niches.contains("tech"));
        assert_eq!(criteria.preferred_platforms, vec![Platform::YouTube]);
        assert!(!criteria.has_follower_range());
    }
}
