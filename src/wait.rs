//! Deadline-bound polling.

use std::future::Future;
use std::time::Duration;

use tokio::time::{Instant, sleep};
use tracing::debug;

use crate::{Error, Result};

/// Timing for [`poll_until`] and [`Messages::wait_for`](crate::Messages::wait_for).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitForOptions {
    /// Total time to keep polling. Default: 30 seconds.
    pub timeout: Duration,
    /// Fixed pause between attempts. Default: 1 second.
    pub interval: Duration,
}

impl Default for WaitForOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            interval: Duration::from_secs(1),
        }
    }
}

impl WaitForOptions {
    /// Set the total time to keep polling. [`Duration::MAX`] waits without a
    /// deadline.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the pause between attempts.
    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }
}

/// Call `lookup` every `interval` until it succeeds.
///
/// A not-found API error (HTTP 404) means "not there yet" and is retried.
/// Any other error is returned at once. When the deadline passes without a
/// success the result is [`Error::Timeout`]. The loop never sleeps past the
/// deadline, so the total wait is bounded by `timeout + interval`. A timeout
/// too large to represent as an instant means no deadline at all.
pub async fn poll_until<T, F, Fut>(options: WaitForOptions, mut lookup: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let deadline = Instant::now().checked_add(options.timeout);
    let mut attempt = 0u32;

    while deadline.is_none_or(|deadline| Instant::now() < deadline) {
        attempt += 1;
        match lookup().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_not_found() => {
                debug!(attempt, "nothing found yet");
            }
            Err(err) => return Err(err),
        }

        if let Some(deadline) = deadline {
            let next = Instant::now().checked_add(options.interval);
            if next.is_none_or(|next| next > deadline) {
                break;
            }
        }
        sleep(options.interval).await;
    }

    debug!(attempt, timeout = ?options.timeout, "gave up waiting");
    Err(Error::Timeout)
}
