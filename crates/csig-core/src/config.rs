use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Hard ceiling on a sync batch. Larger batches risk exhausting the platform
/// quota inside a single scheduler tick.
pub const MAX_SYNC_BATCH_SIZE: u32 = 50;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Platform credentials are optional here. The collector decides whether their
/// absence is fatal, since read-only consumers (API, `classify`) never need them.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let parse_num = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.trim()
            .parse::<u64>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let value = parse_num(var, default)?;
        u32::try_from(value).map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let database_url = require("DATABASE_URL")?;
    let env = parse_environment(&or_default("CSIG_ENV", "development"))?;

    let raw_bind = or_default("CSIG_BIND_ADDR", "0.0.0.0:3000");
    let bind_addr = raw_bind
        .parse::<SocketAddr>()
        .map_err(|e| ConfigError::InvalidEnvVar {
            var: "CSIG_BIND_ADDR".to_string(),
            reason: e.to_string(),
        })?;
    let log_level = or_default("CSIG_LOG_LEVEL", "info");
    let seed_path = PathBuf::from(or_default("CSIG_SEED_PATH", "./config/seed.yaml"));

    let db_max_connections = parse_u32("CSIG_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("CSIG_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_num("CSIG_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let sync_refresh_hours = parse_u32("CSIG_SYNC_REFRESH_HOURS", "6")?;
    let sync_batch_size = parse_u32("CSIG_SYNC_BATCH_SIZE", "25")?;
    if sync_batch_size == 0 || sync_batch_size > MAX_SYNC_BATCH_SIZE {
        return Err(ConfigError::InvalidEnvVar {
            var: "CSIG_SYNC_BATCH_SIZE".to_string(),
            reason: format!("must be between 1 and {MAX_SYNC_BATCH_SIZE}"),
        });
    }
    let sync_max_concurrent = usize::try_from(parse_num("CSIG_SYNC_MAX_CONCURRENT", "1")?)
        .map_err(|e| ConfigError::InvalidEnvVar {
            var: "CSIG_SYNC_MAX_CONCURRENT".to_string(),
            reason: e.to_string(),
        })?;
    let sync_inter_request_delay_ms = parse_num("CSIG_SYNC_INTER_REQUEST_DELAY_MS", "250")?;
    let sync_content_sample = parse_u32("CSIG_SYNC_CONTENT_SAMPLE", "20")?;

    let platform_request_timeout_secs = parse_num("CSIG_PLATFORM_TIMEOUT_SECS", "30")?;
    let platform_max_retries = parse_u32("CSIG_PLATFORM_MAX_RETRIES", "3")?;
    let platform_backoff_base_ms = parse_num("CSIG_PLATFORM_BACKOFF_BASE_MS", "1000")?;

    Ok(AppConfig {
        database_url,
        env,
        bind_addr,
        log_level,
        seed_path,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        sync_refresh_hours,
        sync_batch_size,
        sync_max_concurrent,
        sync_inter_request_delay_ms,
        sync_content_sample,
        platform_request_timeout_secs,
        platform_max_retries,
        platform_backoff_base_ms,
        youtube_api_key: optional("YOUTUBE_API_KEY"),
        youtube_client_id: optional("YOUTUBE_CLIENT_ID"),
        youtube_client_secret: optional("YOUTUBE_CLIENT_SECRET"),
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "CSIG_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
