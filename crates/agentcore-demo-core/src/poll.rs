//! Bounded polling for vendor-side asynchronous work.

use std::time::Duration;

/// How often and how long to poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub max_attempts: u32,
    pub interval: Duration,
}

impl PollPolicy {
    #[must_use]
    pub const fn new(max_attempts: u32, interval: Duration) -> Self {
        Self {
            max_attempts,
            interval,
        }
    }
}

/// Result of a bounded poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome<T> {
    Ready(T),
    /// Every attempt came back empty.
    NotYetAvailable { attempts: u32 },
}

/// Call `check` until it yields `Some`, an error, or attempts run out.
///
/// Sleeps `interval` between attempts, never after the last one. At least
/// one attempt is always made.
///
/// # Errors
/// Returns the first error produced by `check`.
pub async fn poll_bounded<T, E, F, Fut>(policy: PollPolicy, mut check: F) -> Result<PollOutcome<T>, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<Option<T>, E>>,
{
    let attempts = policy.max_attempts.max(1);
    for attempt in 1..=attempts {
        if let Some(value) = check(attempt).await? {
            return Ok(PollOutcome::Ready(value));
        }
        if attempt < attempts {
            tokio::time::sleep(policy.interval).await;
        }
    }
    Ok(PollOutcome::NotYetAvailable { attempts })
}
