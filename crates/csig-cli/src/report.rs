//! Read-only reporting commands: `creators`, `match`, `runs`, `classify`.

use chrono::{DateTime, Utc};
use csig_db::{DiscoveryFilter, DiscoverySort};

pub(crate) async fn run_creators(
    pool: &sqlx::PgPool,
    sort: DiscoverySort,
    niche: Option<&str>,
    limit: i64,
) -> anyhow::Result<()> {
    let filter = DiscoveryFilter {
        sort,
        niche,
        min_score: None,
        limit: limit.clamp(1, 200),
    };
    let creators = csig_db::list_creators_for_discovery(pool, &filter).await?;

    if creators.is_empty() {
        println!("no creators found; run `db seed` and `sync` first");
        return Ok(());
    }

    println!(
        "{:<24}{:>12}{:>8}{:>11}{:>9}  NICHES",
        "CREATOR", "FOLLOWERS", "RISING", "READINESS", "ENG %"
    );
    for creator in &creators {
        println!(
            "{:<24}{:>12}{:>8}{:>11}{:>9}  {}",
            truncate(&creator.display_name, 22),
            csig_engine::matcher::format_count(creator.total_followers),
            fmt_opt(creator.rising_score),
            fmt_opt(creator.brand_readiness_score),
            creator
                .engagement_rate
                .map_or_else(|| "\u{2014}".to_string(), |e| format!("{e:.2}")),
            creator.niches.join(", ")
        );
    }
    Ok(())
}

/// Rank every creator against the active campaign with slug `campaign_slug`.
///
/// # Errors
///
/// Returns an error if no active campaign has that slug or a query fails.
pub(crate) async fn run_match(
    pool: &sqlx::PgPool,
    campaign_slug: &str,
    limit: usize,
) -> anyhow::Result<()> {
    let campaign = csig_db::list_active_campaigns(pool)
        .await?
        .into_iter()
        .find(|c| c.slug == campaign_slug)
        .ok_or_else(|| anyhow::anyhow!("active campaign '{campaign_slug}' not found"))?;
    let criteria = campaign.criteria();
    let creators = csig_db::list_all_creators(pool).await?;

    let mut results: Vec<_> = creators
        .iter()
        .map(|creator| {
            let profile = csig_collector::creator_profile(creator);
            (creator, csig_engine::match_creator(&criteria, &profile))
        })
        .collect();
    results.sort_by(|a, b| b.1.score.cmp(&a.1.score));

    println!("Campaign: {}", campaign.title);
    println!();
    for (creator, result) in results.iter().take(limit) {
        println!(
            "{:>3}  {:<10}{}",
            result.score,
            result.tier.as_str(),
            creator.display_name
        );
        for highlight in &result.highlights {
            println!("       + {highlight}");
        }
        for miss in &result.misses {
            println!("       - {miss}");
        }
    }
    Ok(())
}

pub(crate) async fn run_runs(pool: &sqlx::PgPool, limit: i64) -> anyhow::Result<()> {
    let runs = csig_db::list_sync_runs(pool, limit.clamp(1, 200)).await?;

    if runs.is_empty() {
        println!("no sync runs recorded yet");
        return Ok(());
    }

    println!(
        "{:<22}{:<11}{:<11}{:>10}{:>8}{:>11}  ERROR",
        "CREATED", "TRIGGER", "STATUS", "PROCESSED", "ERRORS", "SNAPSHOTS"
    );
    for run in &runs {
        println!(
            "{:<22}{:<11}{:<11}{:>10}{:>8}{:>11}  {}",
            fmt_time(run.created_at),
            run.trigger_source,
            run.status,
            run.creators_processed,
            run.errors,
            run.snapshots_created,
            run.error_message.as_deref().unwrap_or("")
        );
    }
    Ok(())
}

pub(crate) fn run_classify(text: &str) {
    let niches = csig_engine::classify_niches(text);
    println!("{}", niches.join(", "));
}

fn fmt_opt(value: Option<i16>) -> String {
    value.map_or_else(|| "\u{2014}".to_string(), |v| v.to_string())
}

fn fmt_time(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M").to_string()
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        format!("{}...", text.chars().take(max_chars.saturating_sub(3)).collect::<String>())
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_keeps_short_names() {
        assert_eq!(truncate("Lift Lab", 22), "Lift Lab");
    }

    #[test]
    fn truncate_shortens_long_names_to_width() {
        let out = truncate("An Extremely Long Creator Channel Name", 22);
        assert_eq!(out.chars().count(), 22);
        assert!(out.ends_with("..."));
    }

    #[test]
    fn missing_scores_render_as_dash() {
        assert_eq!(fmt_opt(None), "\u{2014}");
        assert_eq!(fmt_opt(Some(72)), "72");
    }
}
