//! Platform API clients. YouTube is the only live platform; Instagram and
//! TikTok figures come from seed data.

pub mod client;
pub mod error;
pub mod normalize;
pub mod oauth;
pub mod pacer;
pub(crate) mod retry;
pub mod types;

pub use client::{ClientSettings, YouTubeChannel, YouTubeClient, MAX_PAGE_SIZE};
pub use error::PlatformError;
pub use normalize::parse_iso8601_duration;
pub use oauth::{AccessToken, OAuthCredentials};
pub use pacer::RequestPacer;
