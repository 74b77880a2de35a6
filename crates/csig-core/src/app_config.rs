use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub seed_path: PathBuf,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    /// Creators whose `last_synced_at` is older than this are due for sync.
    pub sync_refresh_hours: u32,
    /// Upper bound on creators processed per sync run (1..=50).
    pub sync_batch_size: u32,
    pub sync_max_concurrent: usize,
    /// Minimum gap between outbound platform API calls.
    pub sync_inter_request_delay_ms: u64,
    /// Number of recent uploads fetched per creator.
    pub sync_content_sample: u32,
    pub platform_request_timeout_secs: u64,
    pub platform_max_retries: u32,
    pub platform_backoff_base_ms: u64,
    pub youtube_api_key: Option<String>,
    pub youtube_client_id: Option<String>,
    pub youtube_client_secret: Option<String>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("seed_path", &self.seed_path)
            .field("database_url", &"[redacted]")
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("sync_refresh_hours", &self.sync_refresh_hours)
            .field("sync_batch_size", &self.sync_batch_size)
            .field("sync_max_concurrent", &self.sync_max_concurrent)
            .field(
                "sync_inter_request_delay_ms",
                &self.sync_inter_request_delay_ms,
            )
            .field("sync_content_sample", &self.sync_content_sample)
            .field(
                "platform_request_timeout_secs",
                &self.platform_request_timeout_secs,
            )
            .field("platform_max_retries", &self.platform_max_retries)
            .field("platform_backoff_base_ms", &self.platform_backoff_base_ms)
            .field(
                "youtube_api_key",
                &self.youtube_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field(
                "youtube_client_id",
                &self.youtube_client_id.as_ref().map(|_| "[redacted]"),
            )
            .field(
                "youtube_client_secret",
                &self.youtube_client_secret.as_ref().map(|_| "[redacted]"),
            )
            .finish()
    }
}
