//! Shared domain types and configuration for the creator signal engine.

pub mod app_config;
pub mod campaign;
pub mod config;
pub mod niches;
pub mod normalized;
pub mod platform;
pub mod seed;

pub use app_config::{AppConfig, Environment};
pub use campaign::CampaignCriteria;
pub use config::{load_app_config, load_app_config_from_env};
pub use niches::NicheSet;
pub use normalized::{NormalizedChannelStats, NormalizedContentItem};
pub use platform::{ParsePlatformError, Platform};
pub use seed::{load_seed_file, CampaignSeed, CreatorSeed, SeedFile};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read seed file {path}: {source}")]
    SeedFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse seed file: {0}")]
    SeedFileParse(#[from] serde_yaml::Error),

    #[error("seed file validation failed: {0}")]
    Validation(String),
}
