use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use csig_db::{CampaignRow, CreatorRow};
use csig_engine::{match_creator, DimensionScore, MatchResult, MatchTier};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::middleware::RequestId;

use super::creators::load_creator;
use super::{map_db_error, normalize_limit, ApiError, ApiResponse, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct MatchesQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub(super) struct MatchItem {
    creator_id: Uuid,
    slug: String,
    display_name: String,
    score: u8,
    tier: MatchTier,
    reasons: Vec<String>,
    highlights: Vec<String>,
    misses: Vec<String>,
    breakdown: Vec<DimensionScore>,
}

#[derive(Debug, Serialize)]
pub(super) struct CachedMatchItem {
    #[serde(flatten)]
    item: MatchItem,
    campaign_id: Uuid,
    computed_at: DateTime<Utc>,
}

impl MatchItem {
    fn new(creator: &CreatorRow, result: MatchResult) -> Self {
        Self {
            creator_id: creator.public_id,
            slug: creator.slug.clone(),
            display_name: creator.display_name.clone(),
            score: result.score,
            tier: result.tier,
            reasons: result.reasons,
            highlights: result.highlights,
            misses: result.misses,
            breakdown: result.breakdown,
        }
    }
}

/// Ranks matches best first; equal scores keep the larger audience first.
fn rank_matches(items: &mut [(MatchItem, i64)]) {
    items.sort_by(|(a, a_followers), (b, b_followers)| {
        b.score
            .cmp(&a.score)
            .then_with(|| b_followers.cmp(a_followers))
            .then_with(|| a.slug.cmp(&b.slug))
    });
}

pub(super) async fn list_campaign_matches(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(public_id): Path<Uuid>,
    Query(query): Query<MatchesQuery>,
) -> Result<Json<ApiResponse<Vec<MatchItem>>>, ApiError> {
    let campaign = load_campaign(&state, &req_id, public_id).await?;
    let criteria = campaign.criteria();
    let creators = csig_db::list_all_creators(&state.pool)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let mut ranked: Vec<(MatchItem, i64)> = creators
        .iter()
        .map(|creator| {
            let result = match_creator(&criteria, &csig_collector::creator_profile(creator));
            (MatchItem::new(creator, result), creator.total_followers)
        })
        .collect();
    rank_matches(&mut ranked);

    let limit = usize::try_from(normalize_limit(query.limit)).unwrap_or(usize::MAX);
    let data = ranked
        .into_iter()
        .take(limit)
        .map(|(item, _)| item)
        .collect();
    Ok(ApiResponse::new(data, req_id.0))
}

pub(super) async fn recompute_campaign_match(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path((campaign_id, creator_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<ApiResponse<CachedMatchItem>>, ApiError> {
    let campaign = load_campaign(&state, &req_id, campaign_id).await?;
    let creator = load_creator(&state, &req_id, creator_id).await?;

    let result = match_creator(
        &campaign.criteria(),
        &csig_collector::creator_profile(&creator),
    );
    let cached = csig_db::upsert_campaign_match(
        &state.pool,
        campaign.id,
        creator.id,
        &csig_collector::match_cache_entry(&result),
    )
    .await
    .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    tracing::debug!(
        campaign = %campaign.slug,
        creator = %creator.slug,
        score = result.score,
        "match cached"
    );

    let data = CachedMatchItem {
        item: MatchItem::new(&creator, result),
        campaign_id: campaign.public_id,
        computed_at: cached.computed_at,
    };
    Ok(ApiResponse::new(data, req_id.0))
}

async fn load_campaign(
    state: &AppState,
    req_id: &RequestId,
    public_id: Uuid,
) -> Result<CampaignRow, ApiError> {
    csig_db::get_campaign_by_public_id(&state.pool, public_id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?
        .ok_or_else(|| {
            ApiError::new(
                req_id.0.clone(),
                "not_found",
                format!("campaign {public_id} not found"),
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(slug: &str, score: u8) -> MatchItem {
        MatchItem {
            creator_id: Uuid::nil(),
            slug: slug.to_string(),
            display_name: slug.to_string(),
            score,
            tier: MatchTier::from_score(score),
            reasons: Vec::new(),
            highlights: Vec::new(),
            misses: Vec::new(),
            breakdown: Vec::new(),
        }
    }

    #[test]
    fn matches_rank_by_score_then_audience() {
        let mut ranked = vec![
            (item("small", 70), 1_000),
            (item("top", 90), 5_000),
            (item("large", 70), 80_000),
        ];
        rank_matches(&mut ranked);

        let slugs: Vec<_> = ranked.iter().map(|(m, _)| m.slug.as_str()).collect();
        assert_eq!(slugs, ["top", "large", "small"]);
    }

    #[test]
    fn match_item_serializes_tier_lowercase() {
        let json = serde_json::to_value(item("gadget-lab", 64)).expect("serialize");
        assert_eq!(json["tier"], "strong");
        assert_eq!(json["score"], 64);
    }
}
