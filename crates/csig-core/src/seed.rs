//! YAML seed file describing creators and campaigns for local environments.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::campaign::CampaignCriteria;
use crate::niches::NicheSet;
use crate::ConfigError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatorSeed {
    pub name: String,
    pub bio: Option<String>,
    pub youtube_channel_id: Option<String>,
    pub instagram_handle: Option<String>,
    pub tiktok_handle: Option<String>,
    /// Follower counts for platforms the collector does not sync.
    pub instagram_followers: Option<i64>,
    pub tiktok_followers: Option<i64>,
    #[serde(default)]
    pub niches: NicheSet,
}

impl CreatorSeed {
    #[must_use]
    pub fn slug(&self) -> String {
        slugify(&self.name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignSeed {
    pub name: String,
    #[serde(flatten)]
    pub criteria: CampaignCriteria,
}

impl CampaignSeed {
    #[must_use]
    pub fn slug(&self) -> String {
        slugify(&self.name)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct SeedFile {
    #[serde(default)]
    pub creators: Vec<CreatorSeed>,
    #[serde(default)]
    pub campaigns: Vec<CampaignSeed>,
}

/// Generate a URL-safe slug from a display name.
#[must_use]
pub fn slugify(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' {
                c
            } else if c == ' ' || c == '_' {
                '-'
            } else {
                '\0'
            }
        })
        .filter(|&c| c != '\0')
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// Load and validate the seed file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_seed_file(path: &Path) -> Result<SeedFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::SeedFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let seed: SeedFile = serde_yaml::from_str(&content)?;
    validate_seed(&seed)?;
    Ok(seed)
}

fn validate_seed(seed: &SeedFile) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();
    for creator in &seed.creators {
        if creator.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "creator name must be non-empty".to_string(),
            ));
        }
        let slug = creator.slug();
        if slug.is_empty() || !seen.insert(slug.clone()) {
            return Err(ConfigError::Validation(format!(
                "duplicate or empty creator slug: '{slug}' (from '{}')",
                creator.name
            )));
        }
    }

    let mut seen = HashSet::new();
    for campaign in &seed.campaigns {
        let slug = campaign.slug();
        if slug.is_empty() || !seen.insert(slug.clone()) {
            return Err(ConfigError::Validation(format!(
                "duplicate or empty campaign slug: '{slug}' (from '{}')",
                campaign.name
            )));
        }
        let criteria = &campaign.criteria;
        if let (Some(min), Some(max)) = (criteria.min_followers, criteria.max_followers) {
            if min > max {
                return Err(ConfigError::Validation(format!(
                    "campaign '{}' has min_followers {min} above max_followers {max}",
                    campaign.name
                )));
            }
        }
    }

    Ok(())
}
