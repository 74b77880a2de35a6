//! Minimum-gap pacing shared by every call a client makes.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

/// Serialises outbound requests so that consecutive calls are at least
/// `min_gap` apart, regardless of how many workers share the client.
#[derive(Debug)]
pub struct RequestPacer {
    min_gap: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl RequestPacer {
    #[must_use]
    pub fn new(min_gap: Duration) -> Self {
        Self {
            min_gap,
            last_request: Mutex::new(None),
        }
    }

    /// Waits until the next request slot opens, then claims it.
    pub async fn wait(&self) {
        if self.min_gap.is_zero() {
            return;
        }

        let mut last = self.last_request.lock().await;
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.min_gap {
                tokio::time::sleep(self.min_gap - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }
}
