mod api;
mod middleware;
mod scheduler;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::{
    api::{build_app, default_rate_limit_state, AppState},
    middleware::AuthState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Arc::new(csig_core::load_app_config()?);
    init_tracing(&config.log_level)?;

    let pool = csig_db::connect_pool(
        &config.database_url,
        csig_db::PoolConfig::from_app_config(&config),
    )
    .await?;
    let applied = csig_db::run_migrations(&pool).await?;
    tracing::info!(applied, "server: migrations up to date");

    if config.youtube_api_key.is_none() {
        tracing::warn!("server: YOUTUBE_API_KEY not set; scheduled syncs will be refused");
    }

    let state = AppState::new(pool, Arc::clone(&config));
    // Dropping the handle stops the cron job, so it lives until shutdown.
    let _scheduler = scheduler::build_scheduler(state.clone()).await?;

    let is_development = config.env == csig_core::Environment::Development;
    let app = build_app(
        state,
        AuthState::from_env(is_development)?,
        default_rate_limit_state(),
    );

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(
        addr = %config.bind_addr,
        env = %config.env,
        batch_size = config.sync_batch_size,
        refresh_hours = config.sync_refresh_hours,
        "server: listening"
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

fn init_tracing(default_level: &str) -> anyhow::Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(default_level))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("server: shutdown signal received; draining connections");
}
