use thiserror::Error;

/// Errors returned by platform API clients.
#[derive(Debug, Error)]
pub enum PlatformError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// HTTP 429; the platform asked us to back off.
    #[error("rate limited by {platform} (retry after {retry_after_secs}s)")]
    RateLimited {
        platform: &'static str,
        retry_after_secs: u64,
    },

    /// Non-2xx response carrying a platform error envelope.
    #[error("{platform} API error {status} ({reason}): {message}")]
    ApiError {
        platform: &'static str,
        status: u16,
        reason: String,
        message: String,
    },

    /// The requested channel or resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The OAuth token endpoint rejected a refresh.
    #[error("token refresh failed: {0}")]
    TokenRefresh(String),

    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

impl PlatformError {
    /// Whether the platform reported an exhausted daily quota.
    #[must_use]
    pub fn is_quota_exceeded(&self) -> bool {
        matches!(
            self,
            PlatformError::ApiError { reason, .. }
                if reason == "quotaExceeded" || reason == "dailyLimitExceeded"
        )
    }
}
