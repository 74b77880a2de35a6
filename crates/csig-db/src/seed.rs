use csig_core::{CampaignSeed, CreatorSeed, SeedFile};
use sqlx::{Postgres, Transaction};

use crate::DbError;

/// Rows written by [`seed_from_file`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedCounts {
    pub creators: usize,
    pub campaigns: usize,
}

/// Upsert every creator and campaign from a seed file.
///
/// All upserts run inside a single transaction; if any operation fails the
/// whole seed is rolled back. Existing metrics and sync state are left
/// untouched on re-seed.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any database operation fails.
pub async fn seed_from_file(pool: &sqlx::PgPool, seed: &SeedFile) -> Result<SeedCounts, DbError> {
    let mut tx = pool.begin().await?;
    let mut counts = SeedCounts::default();

    for creator in &seed.creators {
        seed_creator(&mut tx, creator).await?;
        counts.creators += 1;
    }
    for campaign in &seed.campaigns {
        seed_campaign(&mut tx, campaign).await?;
        counts.campaigns += 1;
    }

    tx.commit().await?;
    Ok(counts)
}

async fn seed_creator(
    tx: &mut Transaction<'_, Postgres>,
    creator: &CreatorSeed,
) -> Result<(), DbError> {
    let niches = creator.niches.to_vec();
    let total: i64 = [creator.instagram_followers, creator.tiktok_followers]
        .into_iter()
        .flatten()
        .sum();

    sqlx::query(
        "INSERT INTO creators \
             (slug, display_name, bio, youtube_channel_id, instagram_handle, tiktok_handle, \
              instagram_followers, tiktok_followers, total_followers, niches) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
         ON CONFLICT (slug) DO UPDATE SET \
             display_name        = EXCLUDED.display_name, \
             bio                 = EXCLUDED.bio, \
             youtube_channel_id  = EXCLUDED.youtube_channel_id, \
             instagram_handle    = EXCLUDED.instagram_handle, \
             tiktok_handle       = EXCLUDED.tiktok_handle, \
             instagram_followers = EXCLUDED.instagram_followers, \
             tiktok_followers    = EXCLUDED.tiktok_followers, \
             niches = CASE WHEN cardinality(EXCLUDED.niches) > 0 \
                           THEN EXCLUDED.niches ELSE creators.niches END, \
             updated_at          = NOW()",
    )
    .bind(creator.slug())
    .bind(&creator.name)
    .bind(&creator.bio)
    .bind(&creator.youtube_channel_id)
    .bind(&creator.instagram_handle)
    .bind(&creator.tiktok_handle)
    .bind(creator.instagram_followers)
    .bind(creator.tiktok_followers)
    .bind(total)
    .bind(&niches)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

async fn seed_campaign(
    tx: &mut Transaction<'_, Postgres>,
    campaign: &CampaignSeed,
) -> Result<(), DbError> {
    let criteria = &campaign.criteria;
    let title = if criteria.title.trim().is_empty() {
        campaign.name.as_str()
    } else {
        criteria.title.as_str()
    };
    let platforms: Vec<&str> = criteria
        .preferred_platforms
        .iter()
        .map(|p| p.as_str())
        .collect();

    sqlx::query(
        "INSERT INTO campaigns \
             (slug, title, target_niches, min_followers, max_followers, \
              target_engagement_rate, preferred_platforms, content_styles, brief, description) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
         ON CONFLICT (slug) DO UPDATE SET \
             title                  = EXCLUDED.title, \
             target_niches          = EXCLUDED.target_niches, \
             min_followers          = EXCLUDED.min_followers, \
             max_followers          = EXCLUDED.max_followers, \
             target_engagement_rate = EXCLUDED.target_engagement_rate, \
             preferred_platforms    = EXCLUDED.preferred_platforms, \
             content_styles         = EXCLUDED.content_styles, \
             brief                  = EXCLUDED.brief, \
             description            = EXCLUDED.description, \
             updated_at             = NOW()",
    )
    .bind(campaign.slug())
    .bind(title)
    .bind(criteria.target_niches.to_vec())
    .bind(criteria.min_followers)
    .bind(criteria.max_followers)
    .bind(criteria.target_engagement_rate)
    .bind(&platforms)
    .bind(&criteria.content_styles)
    .bind(&criteria.brief)
    .bind(&criteria.description)
    .execute(&mut **tx)
    .await?;

    Ok(())
}
