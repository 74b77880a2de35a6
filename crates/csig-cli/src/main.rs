mod db;
mod report;
mod sync;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "csig-cli")]
#[command(about = "Creator signal engine command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Database maintenance
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
    /// Refresh creators due for a sync and recompute their scores
    Sync {
        /// List the creators that would be synced without calling any platform
        #[arg(long)]
        dry_run: bool,
    },
    /// List creators ranked by score
    Creators {
        #[arg(long, value_enum, default_value_t = SortArg::Rising)]
        sort: SortArg,
        /// Only creators tagged with this niche
        #[arg(long)]
        niche: Option<String>,
        #[arg(long, default_value = "20")]
        limit: i64,
    },
    /// Score every creator against a campaign
    Match {
        /// Campaign slug
        campaign: String,
        #[arg(long, default_value = "10")]
        limit: usize,
    },
    /// Classify free text into niches
    Classify {
        /// Text to classify (channel title, bio, description)
        text: String,
    },
    /// Show recent sync runs
    Runs {
        #[arg(long, default_value = "20")]
        limit: i64,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Check database connectivity
    Ping,
    /// Apply pending migrations
    Migrate,
    /// Upsert creators and campaigns from the seed file
    Seed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SortArg {
    Rising,
    Readiness,
}

impl From<SortArg> for csig_db::DiscoverySort {
    fn from(sort: SortArg) -> Self {
        match sort {
            SortArg::Rising => csig_db::DiscoverySort::Rising,
            SortArg::Readiness => csig_db::DiscoverySort::Readiness,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        println!("csig-cli ready; run with --help for commands");
        return Ok(());
    };

    // classify is pure and works without a database configured.
    if let Commands::Classify { text } = &command {
        init_tracing("warn")?;
        report::run_classify(text);
        return Ok(());
    }

    let config = csig_core::load_app_config()?;
    init_tracing(&config.log_level)?;

    let pool_config = csig_db::PoolConfig::from_app_config(&config);
    let pool = csig_db::connect_pool(&config.database_url, pool_config).await?;

    match command {
        Commands::Db { command } => match command {
            DbCommands::Ping => db::run_ping(&pool).await?,
            DbCommands::Migrate => db::run_migrate(&pool).await?,
            DbCommands::Seed => db::run_seed(&pool, &config).await?,
        },
        Commands::Sync { dry_run } => sync::run_sync(&pool, &config, dry_run).await?,
        Commands::Creators { sort, niche, limit } => {
            report::run_creators(&pool, sort.into(), niche.as_deref(), limit).await?;
        }
        Commands::Match { campaign, limit } => {
            report::run_match(&pool, &campaign, limit).await?;
        }
        Commands::Runs { limit } => report::run_runs(&pool, limit).await?,
        Commands::Classify { text } => report::run_classify(&text),
    }

    Ok(())
}

fn init_tracing(default_level: &str) -> anyhow::Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(default_level))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
    Ok(())
}
