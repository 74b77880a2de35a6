//! OAuth 2.0 refresh-token exchange against the Google token endpoint.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use csig_core::AppConfig;
use reqwest::StatusCode;

use crate::client::{rate_limited, YouTubeClient};
use crate::error::PlatformError;
use crate::retry::retry_with_backoff;
use crate::types::{TokenErrorResponse, TokenResponse};

/// Application credentials registered with Google.
#[derive(Clone)]
pub struct OAuthCredentials {
    pub client_id: String,
    pub client_secret: String,
}

impl std::fmt::Debug for OAuthCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[redacted]")
            .finish()
    }
}

impl OAuthCredentials {
    /// Credentials from config, or `None` when either half is unset.
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Option<Self> {
        match (&config.youtube_client_id, &config.youtube_client_secret) {
            (Some(id), Some(secret)) => Some(Self {
                client_id: id.clone(),
                client_secret: secret.clone(),
            }),
            _ => None,
        }
    }
}

/// A freshly minted access token.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken {
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
    /// Set when the provider rotated the refresh token.
    pub refresh_token: Option<String>,
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken")
            .field("access_token", &"[redacted]")
            .field("expires_at", &self.expires_at)
            .field("rotated", &self.refresh_token.is_some())
            .finish()
    }
}

impl YouTubeClient {
    /// Exchanges a refresh token for a new access token.
    ///
    /// `expires_at` is computed from `now + expires_in` as reported by the
    /// token endpoint.
    ///
    /// # Errors
    ///
    /// - [`PlatformError::TokenRefresh`] if the endpoint rejects the grant
    ///   (revoked or expired refresh token, bad client credentials).
    /// - [`PlatformError::RateLimited`] / [`PlatformError::Http`] after all
    ///   retries are exhausted.
    /// - [`PlatformError::Deserialize`] if a 2xx body does not match.
    pub async fn refresh_access_token(
        &self,
        credentials: &OAuthCredentials,
        refresh_token: &str,
    ) -> Result<AccessToken, PlatformError> {
        let form = [
            ("client_id", credentials.client_id.as_str()),
            ("client_secret", credentials.client_secret.as_str()),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ];

        let token: TokenResponse =
            retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
                let url = self.token_url.clone();
                async move {
                    self.pacer.wait().await;

                    let response = self.client.post(url).form(&form).send().await?;
                    let status = response.status();

                    if status == StatusCode::TOO_MANY_REQUESTS {
                        return Err(rate_limited(&response));
                    }
                    if status.is_server_error() {
                        return Err(PlatformError::ApiError {
                            platform: "youtube",
                            status: status.as_u16(),
                            reason: "tokenEndpointUnavailable".to_owned(),
                            message: response.text().await.unwrap_or_default(),
                        });
                    }
                    if !status.is_success() {
                        let body = response.text().await.unwrap_or_default();
                        return Err(PlatformError::TokenRefresh(describe_token_error(
                            status, &body,
                        )));
                    }

                    let text = response.text().await?;
                    serde_json::from_str::<TokenResponse>(&text).map_err(|e| {
                        PlatformError::Deserialize {
                            context: "oauth token refresh".to_owned(),
                            source: e,
                        }
                    })
                }
            })
            .await?;

        let expires_at = Utc::now() + ChronoDuration::seconds(token.expires_in.max(0));
        tracing::debug!(%expires_at, "youtube: refreshed access token");

        Ok(AccessToken {
            access_token: token.access_token,
            expires_at,
            refresh_token: token.refresh_token.filter(|t| !t.is_empty()),
        })
    }
}

fn describe_token_error(status: StatusCode, body: &str) -> String {
    match serde_json::from_str::<TokenErrorResponse>(body) {
        Ok(err) => match err.error_description {
            Some(description) => format!("{} ({}): {description}", err.error, status.as_u16()),
            None => format!("{} ({})", err.error, status.as_u16()),
        },
        Err(_) => format!("HTTP {}", status.as_u16()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describes_invalid_grant() {
        let body = r#"{"error":"invalid_grant","error_description":"Token has been revoked."}"#;
        let msg = describe_token_error(StatusCode::BAD_REQUEST, body);
        assert_eq!(msg, "invalid_grant (400): Token has been revoked.");
    }

    #[test]
    fn describes_non_json_error() {
        assert_eq!(
            describe_token_error(StatusCode::UNAUTHORIZED, "<html>"),
            "HTTP 401"
        );
    }

    #[test]
    fn debug_output_hides_secrets() {
        let creds = OAuthCredentials {
            client_id: "id".to_owned(),
            client_secret: "shh".to_owned(),
        };
        let token = AccessToken {
            access_token: "ya29.secret".to_owned(),
            expires_at: Utc::now(),
            refresh_token: None,
        };
        assert!(!format!("{creds:?}").contains("shh"));
        assert!(!format!("{token:?}").contains("ya29"));
    }
}
