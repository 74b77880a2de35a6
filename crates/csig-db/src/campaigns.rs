//! Database operations for `campaigns` and the `campaign_matches` cache.

use chrono::{DateTime, Utc};
use csig_core::{CampaignCriteria, Platform};
use sqlx::{types::Json, PgPool};
use uuid::Uuid;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `campaigns` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CampaignRow {
    pub id: i64,
    pub public_id: Uuid,
    pub slug: String,
    pub title: String,
    pub target_niches: Vec<String>,
    pub min_followers: Option<i64>,
    pub max_followers: Option<i64>,
    pub target_engagement_rate: Option<f64>,
    pub preferred_platforms: Vec<String>,
    pub content_styles: Vec<String>,
    pub brief: Option<String>,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CampaignRow {
    /// Matcher input built from the stored columns. Unknown platform names are
    /// dropped rather than failing the whole campaign.
    #[must_use]
    pub fn criteria(&self) -> CampaignCriteria {
        CampaignCriteria {
            title: self.title.clone(),
            target_niches: self.target_niches.iter().collect(),
            min_followers: self.min_followers,
            max_followers: self.max_followers,
            target_engagement_rate: self.target_engagement_rate,
            preferred_platforms: self
                .preferred_platforms
                .iter()
                .filter_map(|p| p.parse::<Platform>().ok())
                .collect(),
            content_styles: self.content_styles.clone(),
            brief: self.brief.clone(),
            description: self.description.clone(),
        }
    }
}

/// A cached match from `campaign_matches`.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CampaignMatchRow {
    pub campaign_id: i64,
    pub creator_id: i64,
    pub score: i16,
    pub tier: String,
    pub reasons: Json<Vec<String>>,
    pub highlights: Json<Vec<String>>,
    pub misses: Json<Vec<String>>,
    pub breakdown: serde_json::Value,
    pub computed_at: DateTime<Utc>,
}

/// Values written into the match cache.
#[derive(Debug, Clone)]
pub struct MatchCacheEntry<'a> {
    pub score: i16,
    pub tier: &'a str,
    pub reasons: &'a [String],
    pub highlights: &'a [String],
    pub misses: &'a [String],
    pub breakdown: serde_json::Value,
}

const CAMPAIGN_COLUMNS: &str = "id, public_id, slug, title, target_niches, min_followers, \
     max_followers, target_engagement_rate, preferred_platforms, content_styles, brief, \
     description, is_active, created_at, updated_at";

const MATCH_COLUMNS: &str = "campaign_id, creator_id, score, tier, reasons, highlights, misses, \
     breakdown, computed_at";

// ---------------------------------------------------------------------------
// campaigns
// ---------------------------------------------------------------------------

/// Returns a campaign by public id, or `None` if not found.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_campaign_by_public_id(
    pool: &PgPool,
    public_id: Uuid,
) -> Result<Option<CampaignRow>, DbError> {
    let sql = format!("SELECT {CAMPAIGN_COLUMNS} FROM campaigns WHERE public_id = $1");
    let row = sqlx::query_as::<_, CampaignRow>(&sql)
        .bind(public_id)
        .fetch_optional(pool)
        .await?;

    Ok(row)
}

/// Returns all active campaigns ordered by title.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_active_campaigns(pool: &PgPool) -> Result<Vec<CampaignRow>, DbError> {
    let sql = format!(
        "SELECT {CAMPAIGN_COLUMNS} FROM campaigns WHERE is_active = true ORDER BY title, id"
    );
    let rows = sqlx::query_as::<_, CampaignRow>(&sql)
        .fetch_all(pool)
        .await?;

    Ok(rows)
}

// ---------------------------------------------------------------------------
// campaign_matches
// ---------------------------------------------------------------------------

/// Caches a computed match, replacing any earlier result for the pair.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn upsert_campaign_match(
    pool: &PgPool,
    campaign_id: i64,
    creator_id: i64,
    entry: &MatchCacheEntry<'_>,
) -> Result<CampaignMatchRow, DbError> {
    let sql = format!(
        "INSERT INTO campaign_matches \
             (campaign_id, creator_id, score, tier, reasons, highlights, misses, breakdown, \
              computed_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, NOW()) \
         ON CONFLICT (campaign_id, creator_id) DO UPDATE SET \
             score       = EXCLUDED.score, \
             tier        = EXCLUDED.tier, \
             reasons     = EXCLUDED.reasons, \
             highlights  = EXCLUDED.highlights, \
             misses      = EXCLUDED.misses, \
             breakdown   = EXCLUDED.breakdown, \
             computed_at = NOW() \
         RETURNING {MATCH_COLUMNS}"
    );
    let row = sqlx::query_as::<_, CampaignMatchRow>(&sql)
        .bind(campaign_id)
        .bind(creator_id)
        .bind(entry.score)
        .bind(entry.tier)
        .bind(Json(entry.reasons))
        .bind(Json(entry.highlights))
        .bind(Json(entry.misses))
        .bind(&entry.breakdown)
        .fetch_one(pool)
        .await?;

    Ok(row)
}

/// Returns the cached match for one pair, or `None` if never computed.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_campaign_match(
    pool: &PgPool,
    campaign_id: i64,
    creator_id: i64,
) -> Result<Option<CampaignMatchRow>, DbError> {
    let sql = format!(
        "SELECT {MATCH_COLUMNS} FROM campaign_matches \
         WHERE campaign_id = $1 AND creator_id = $2"
    );
    let row = sqlx::query_as::<_, CampaignMatchRow>(&sql)
        .bind(campaign_id)
        .bind(creator_id)
        .fetch_optional(pool)
        .await?;

    Ok(row)
}
