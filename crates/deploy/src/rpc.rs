//! Shared RPC utilities for interacting with Ethereum JSON-RPC endpoints.

use std::time::Duration;

use anyhow::Context;
use tokio::time::Instant;

use crate::CancelSignal;

/// Default timeout for RPC requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default interval between polling attempts.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Create an HTTP client configured for JSON-RPC requests.
pub fn create_client() -> Result<reqwest::Client, anyhow::Error> {
    reqwest::Client::builder()
        .timeout(DEFAULT_TIMEOUT)
        .build()
        .context("Failed to create HTTP client")
}

/// Why [`poll_until`] gave up.
#[derive(Debug)]
pub enum PollError {
    /// The check itself failed.
    Failed(anyhow::Error),
    /// The deadline passed before the check succeeded.
    TimedOut { polls: u32, waited: Duration },
    /// The cancel signal fired.
    Cancelled,
}

/// Repeatedly run `check` until it yields a value.
///
/// `check` returns `Ok(None)` while the awaited condition does not hold yet. Any
/// error ends polling immediately. Between attempts the loop sleeps for
/// `interval`, and it stops once `max_wait` has elapsed or `cancel` fires.
///
/// # Arguments
/// * `name` - What is being waited for (for logs)
/// * `interval` - Delay between two checks
/// * `max_wait` - Upper bound on the total wait
/// * `cancel` - Aborts the wait when cancelled
/// * `check` - The condition to poll
pub async fn poll_until<T, F, Fut>(
    name: &str,
    interval: Duration,
    max_wait: Duration,
    cancel: &CancelSignal,
    mut check: F,
) -> Result<T, PollError>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<Option<T>, anyhow::Error>>,
{
    let start = Instant::now();
    let mut cancel = cancel.clone();
    let mut polls = 0u32;

    loop {
        if cancel.is_cancelled() {
            return Err(PollError::Cancelled);
        }

        polls += 1;
        let outcome = tokio::select! {
            _ = cancel.cancelled() => return Err(PollError::Cancelled),
            outcome = check() => outcome,
        };

        match outcome {
            Ok(Some(value)) => return Ok(value),
            Ok(None) => {
                tracing::trace!(target_name = %name, polls, "Not ready yet, polling again...");
            }
            Err(e) => return Err(PollError::Failed(e)),
        }

        let waited = start.elapsed();
        if waited >= max_wait {
            return Err(PollError::TimedOut { polls, waited });
        }

        tokio::select! {
            _ = cancel.cancelled() => return Err(PollError::Cancelled),
            _ = tokio::time::sleep(interval.min(max_wait - waited)) => {}
        }
    }
}
