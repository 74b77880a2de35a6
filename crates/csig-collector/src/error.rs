use csig_db::DbError;
use csig_platform::PlatformError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CollectorError {
    /// A credential the sync needs is not configured. Fatal for the batch.
    #[error("missing credential: {0} is not set")]
    MissingCredential(&'static str),

    /// Sync options out of range. Fatal for the batch.
    #[error("invalid sync configuration: {0}")]
    InvalidConfig(String),

    #[error("store error: {0}")]
    Store(#[from] DbError),

    #[error("platform error: {0}")]
    Platform(#[from] PlatformError),
}

impl CollectorError {
    /// Whether this error aborts the whole batch rather than one creator.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            CollectorError::MissingCredential(_) | CollectorError::InvalidConfig(_)
        )
    }
}
