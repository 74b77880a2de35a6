//! HTTP client for the YouTube Data API v3.
//!
//! Wraps `reqwest` with YouTube-specific error handling, API key management,
//! request pacing and retry. Error envelopes are surfaced as
//! [`PlatformError::ApiError`] carrying the Google `reason` so callers can
//! tell quota exhaustion from a bad request.

use std::sync::Arc;
use std::time::Duration;

use csig_core::{AppConfig, NormalizedChannelStats, NormalizedContentItem};
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;

use crate::error::PlatformError;
use crate::normalize::{normalize_channel, normalize_video, uploads_playlist_id};
use crate::pacer::RequestPacer;
use crate::retry::retry_with_backoff;
use crate::types::{Channel, ErrorEnvelope, ListResponse, PlaylistItem, Video};

const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/youtube/v3/";
pub(crate) const DEFAULT_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const PLATFORM: &str = "youtube";

/// `playlistItems.list` and `videos.list` both cap `maxResults` at 50.
pub const MAX_PAGE_SIZE: u32 = 50;

/// Transport settings shared by every platform client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientSettings {
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub backoff_base_ms: u64,
    pub min_request_gap_ms: u64,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            max_retries: 3,
            backoff_base_ms: 1_000,
            min_request_gap_ms: 250,
        }
    }
}

impl ClientSettings {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            timeout_secs: config.platform_request_timeout_secs,
            max_retries: config.platform_max_retries,
            backoff_base_ms: config.platform_backoff_base_ms,
            min_request_gap_ms: config.sync_inter_request_delay_ms,
        }
    }
}

/// A channel's current statistics plus the playlist holding its uploads.
#[derive(Debug, Clone, PartialEq)]
pub struct YouTubeChannel {
    pub stats: NormalizedChannelStats,
    pub uploads_playlist_id: Option<String>,
}

/// Client for the YouTube Data API v3.
///
/// Use [`YouTubeClient::new`] for production or
/// [`YouTubeClient::with_base_urls`] to point at a mock server in tests.
/// Every request, including OAuth refreshes, goes through one shared
/// [`RequestPacer`].
pub struct YouTubeClient {
    pub(crate) client: Client,
    api_key: String,
    base_url: Url,
    pub(crate) token_url: Url,
    pub(crate) pacer: Arc<RequestPacer>,
    pub(crate) max_retries: u32,
    pub(crate) backoff_base_ms: u64,
}

impl std::fmt::Debug for YouTubeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YouTubeClient")
            .field("base_url", &self.base_url.as_str())
            .field("token_url", &self.token_url.as_str())
            .field("api_key", &"[redacted]")
            .field("max_retries", &self.max_retries)
            .finish_non_exhaustive()
    }
}

impl YouTubeClient {
    /// Creates a client pointed at the production Google endpoints.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(api_key: &str, settings: ClientSettings) -> Result<Self, PlatformError> {
        Self::with_base_urls(api_key, settings, DEFAULT_BASE_URL, DEFAULT_TOKEN_URL)
    }

    /// Creates a client with custom API and token URLs (for testing with
    /// wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::Http`] if the `reqwest::Client` cannot be
    /// constructed, or [`PlatformError::InvalidBaseUrl`] if either URL does
    /// not parse.
    pub fn with_base_urls(
        api_key: &str,
        settings: ClientSettings,
        base_url: &str,
        token_url: &str,
    ) -> Result<Self, PlatformError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("csig/0.1 (creator-signals)")
            .build()?;

        // Exactly one trailing slash so `Url::join` appends the endpoint
        // instead of replacing the last path segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = parse_url(&normalised)?;
        let token_url = parse_url(token_url)?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            base_url,
            token_url,
            pacer: Arc::new(RequestPacer::new(Duration::from_millis(
                settings.min_request_gap_ms,
            ))),
            max_retries: settings.max_retries,
            backoff_base_ms: settings.backoff_base_ms,
        })
    }

    /// Fetches channel statistics and the uploads playlist id.
    ///
    /// When `access_token` is given the request is sent with a bearer token
    /// on behalf of the channel owner; otherwise only the API key is used.
    ///
    /// # Errors
    ///
    /// - [`PlatformError::NotFound`] if the API returns no channel for the id.
    /// - [`PlatformError::ApiError`] for Google error envelopes (quota, auth).
    /// - [`PlatformError::RateLimited`] / [`PlatformError::Http`] after all
    ///   retries are exhausted.
    /// - [`PlatformError::Deserialize`] if the body does not match.
    pub async fn fetch_channel(
        &self,
        channel_id: &str,
        access_token: Option<&str>,
    ) -> Result<YouTubeChannel, PlatformError> {
        let url = self.build_url(
            "channels",
            &[
                ("part", "snippet,statistics,contentDetails"),
                ("id", channel_id),
            ],
        )?;
        let response: ListResponse<Channel> = self
            .get_json(&url, access_token, &format!("channels.list(id={channel_id})"))
            .await?;

        let channel = response
            .items
            .into_iter()
            .find(|c| c.id == channel_id)
            .ok_or_else(|| PlatformError::NotFound(format!("youtube channel {channel_id}")))?;

        Ok(YouTubeChannel {
            stats: normalize_channel(&channel),
            uploads_playlist_id: uploads_playlist_id(&channel),
        })
    }

    /// Fetches the newest `max_results` uploads with their statistics.
    ///
    /// Two calls: `playlistItems.list` for ids, then one batched
    /// `videos.list`. Videos that disappear between the two calls (deleted
    /// or made private) are skipped. Results are ordered newest first.
    ///
    /// # Errors
    ///
    /// Same as [`YouTubeClient::fetch_channel`], except an empty playlist is
    /// returned as an empty vector rather than [`PlatformError::NotFound`].
    pub async fn fetch_recent_videos(
        &self,
        uploads_playlist_id: &str,
        max_results: u32,
        access_token: Option<&str>,
    ) -> Result<Vec<NormalizedContentItem>, PlatformError> {
        let page_size = max_results.clamp(1, MAX_PAGE_SIZE).to_string();
        let url = self.build_url(
            "playlistItems",
            &[
                ("part", "contentDetails"),
                ("playlistId", uploads_playlist_id),
                ("maxResults", &page_size),
            ],
        )?;
        let playlist: ListResponse<PlaylistItem> = self
            .get_json(
                &url,
                access_token,
                &format!("playlistItems.list(playlistId={uploads_playlist_id})"),
            )
            .await?;

        let video_ids: Vec<String> = playlist
            .items
            .into_iter()
            .filter_map(|item| item.content_details.map(|d| d.video_id))
            .collect();
        if video_ids.is_empty() {
            return Ok(Vec::new());
        }

        let joined = video_ids.join(",");
        let url = self.build_url(
            "videos",
            &[("part", "snippet,statistics,contentDetails"), ("id", &joined)],
        )?;
        let videos: ListResponse<Video> = self
            .get_json(&url, access_token, "videos.list")
            .await?;

        let mut items: Vec<NormalizedContentItem> =
            videos.items.iter().map(normalize_video).collect();
        items.sort_by(|a, b| b.posted_at.cmp(&a.posted_at));

        tracing::debug!(
            playlist = uploads_playlist_id,
            requested = video_ids.len(),
            returned = items.len(),
            "youtube: fetched recent videos"
        );

        Ok(items)
    }

    /// Builds an endpoint URL with `key` and the given query parameters,
    /// percent-encoded via [`Url::query_pairs_mut`].
    fn build_url(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<Url, PlatformError> {
        let mut url = self
            .base_url
            .join(endpoint)
            .map_err(|e| PlatformError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: e.to_string(),
            })?;
        {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in params {
                pairs.append_pair(key, value);
            }
            pairs.append_pair("key", &self.api_key);
        }
        Ok(url)
    }

    /// Paced, retried GET that deserializes the body into `T`.
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &Url,
        access_token: Option<&str>,
        context: &str,
    ) -> Result<T, PlatformError> {
        retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            let url = url.clone();
            async move {
                self.pacer.wait().await;

                let mut request = self.client.get(url);
                if let Some(token) = access_token {
                    request = request.bearer_auth(token);
                }
                let response = request.send().await?;
                let status = response.status();

                if status == StatusCode::TOO_MANY_REQUESTS {
                    return Err(rate_limited(&response));
                }
                if !status.is_success() {
                    let body = response.text().await.unwrap_or_default();
                    return Err(api_error(status, &body));
                }

                let text = response.text().await?;
                serde_json::from_str::<T>(&text).map_err(|e| PlatformError::Deserialize {
                    context: context.to_owned(),
                    source: e,
                })
            }
        })
        .await
    }
}

fn parse_url(raw: &str) -> Result<Url, PlatformError> {
    Url::parse(raw).map_err(|e| PlatformError::InvalidBaseUrl {
        url: raw.to_owned(),
        reason: e.to_string(),
    })
}

pub(crate) fn rate_limited(response: &reqwest::Response) -> PlatformError {
    let retry_after_secs = response
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse::<u64>().ok())
        .unwrap_or(60);

    PlatformError::RateLimited {
        platform: PLATFORM,
        retry_after_secs,
    }
}

/// Maps a non-2xx response to [`PlatformError::ApiError`], reading the
/// Google error envelope when present.
///
/// A 403 with reason `rateLimitExceeded`/`userRateLimitExceeded` is a
/// short-term throttle and becomes [`PlatformError::RateLimited`].
pub(crate) fn api_error(status: StatusCode, body: &str) -> PlatformError {
    let envelope = serde_json::from_str::<ErrorEnvelope>(body).ok();
    let reason = envelope
        .as_ref()
        .and_then(|e| e.error.errors.first())
        .map(|d| d.reason.clone())
        .unwrap_or_default();
    let message = envelope.map_or_else(
        || body.chars().take(200).collect(),
        |e| e.error.message,
    );

    if reason == "rateLimitExceeded" || reason == "userRateLimitExceeded" {
        return PlatformError::RateLimited {
            platform: PLATFORM,
            retry_after_secs: 60,
        };
    }

    PlatformError::ApiError {
        platform: PLATFORM,
        status: status.as_u16(),
        reason,
        message,
    }
}
