//! `db` subcommands.

pub(crate) async fn run_ping(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    csig_db::health_check(pool).await?;
    println!("database: ok");
    Ok(())
}

pub(crate) async fn run_migrate(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let applied = csig_db::run_migrations(pool).await?;
    println!("applied {applied} migration(s)");
    Ok(())
}

/// Upsert the seed file named by `CSIG_SEED_PATH` in one transaction.
///
/// # Errors
///
/// Returns an error if the file cannot be read or validated, or if any
/// upsert fails (in which case nothing is written).
pub(crate) async fn run_seed(
    pool: &sqlx::PgPool,
    config: &csig_core::AppConfig,
) -> anyhow::Result<()> {
    let seed = csig_core::load_seed_file(&config.seed_path)?;
    let counts = csig_db::seed_from_file(pool, &seed).await?;
    tracing::info!(
        path = %config.seed_path.display(),
        creators = counts.creators,
        campaigns = counts.campaigns,
        "seed: applied"
    );
    println!(
        "seeded {} creator(s) and {} campaign(s)",
        counts.creators, counts.campaigns
    );
    Ok(())
}
