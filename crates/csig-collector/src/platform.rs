//! Platform seam for the collector.

use std::future::Future;

use csig_core::{AppConfig, NormalizedContentItem};
use csig_platform::{
    AccessToken, ClientSettings, OAuthCredentials, PlatformError, YouTubeChannel, YouTubeClient,
};

use crate::error::CollectorError;

pub trait PlatformApi: Send + Sync {
    fn refresh_access_token(
        &self,
        refresh_token: &str,
    ) -> impl Future<Output = Result<AccessToken, PlatformError>> + Send;

    fn fetch_channel(
        &self,
        channel_id: &str,
        access_token: Option<&str>,
    ) -> impl Future<Output = Result<YouTubeChannel, PlatformError>> + Send;

    fn fetch_recent_content(
        &self,
        uploads_playlist_id: &str,
        max_results: u32,
        access_token: Option<&str>,
    ) -> impl Future<Output = Result<Vec<NormalizedContentItem>, PlatformError>> + Send;
}

/// Live YouTube access used by scheduled and CLI syncs.
#[derive(Debug)]
pub struct YouTubeSource {
    client: YouTubeClient,
    oauth: Option<OAuthCredentials>,
}

impl YouTubeSource {
    #[must_use]
    pub fn new(client: YouTubeClient, oauth: Option<OAuthCredentials>) -> Self {
        Self { client, oauth }
    }

    /// Builds the source from config.
    ///
    /// # Errors
    ///
    /// Returns [`CollectorError::MissingCredential`] when `YOUTUBE_API_KEY`
    /// is unset, or [`CollectorError::Platform`] if the HTTP client cannot
    /// be built.
    pub fn from_app_config(config: &AppConfig) -> Result<Self, CollectorError> {
        let api_key = config
            .youtube_api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or(CollectorError::MissingCredential("YOUTUBE_API_KEY"))?;

        let oauth = OAuthCredentials::from_app_config(config);
        if oauth.is_none() {
            tracing::info!("sync: YouTube OAuth client not configured; token refresh disabled");
        }

        let client = YouTubeClient::new(api_key, ClientSettings::from_app_config(config))?;
        Ok(Self::new(client, oauth))
    }
}

impl PlatformApi for YouTubeSource {
    async fn refresh_access_token(&self, refresh_token: &str) -> Result<AccessToken, PlatformError> {
        let Some(oauth) = &self.oauth else {
            return Err(PlatformError::TokenRefresh(
                "YOUTUBE_CLIENT_ID / YOUTUBE_CLIENT_SECRET not configured".to_owned(),
            ));
        };
        self.client.refresh_access_token(oauth, refresh_token).await
    }

    async fn fetch_channel(
        &self,
        channel_id: &str,
        access_token: Option<&str>,
    ) -> Result<YouTubeChannel, PlatformError> {
        self.client.fetch_channel(channel_id, access_token).await
    }

    async fn fetch_recent_content(
        &self,
        uploads_playlist_id: &str,
        max_results: u32,
        access_token: Option<&str>,
    ) -> Result<Vec<NormalizedContentItem>, PlatformError> {
        self.client
            .fetch_recent_videos(uploads_playlist_id, max_results, access_token)
            .await
    }
}
