use std::fmt::Display;
use std::time::Duration;
use tokio::time::sleep;
use tracing::warn;

/// Backoff schedule for model calls.
///
/// Memory calls are never retried; only the model invoker uses this.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Delays after each of the first failures, in order.
    pub base_delays: Vec<Duration>,
    /// Extra attempts once the base schedule is used up.
    pub final_retries: usize,
    /// Delay between the extra attempts.
    pub final_delay: Duration,
}

impl Default for RetryPolicy {
    /// 2s, 4s, 6s, 8s, then 10s x 3.
    fn default() -> Self {
        Self {
            base_delays: [2, 4, 6, 8].map(Duration::from_secs).to_vec(),
            final_retries: 3,
            final_delay: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    /// A single attempt, no retries.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            base_delays: Vec::new(),
            final_retries: 0,
            final_delay: Duration::ZERO,
        }
    }

    /// Total number of attempts, counting the first.
    #[must_use]
    pub fn max_attempts(&self) -> usize {
        1 + self.base_delays.len() + self.final_retries
    }

    fn delay_after(&self, attempt: usize) -> Duration {
        self.base_delays
            .get(attempt - 1)
            .copied()
            .unwrap_or(self.final_delay)
    }
}

/// Retry an async operation following `policy`.
///
/// Errors for which `retryable` returns `false` are returned at once.
/// Otherwise returns the first success, or the last error once every
/// attempt failed.
pub async fn retry_with_backoff<F, Fut, T, E, R>(
    policy: &RetryPolicy,
    mut operation: F,
    retryable: R,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
    E: Display,
    R: Fn(&E) -> bool,
{
    let max_attempts = policy.max_attempts();
    let mut attempt = 1;

    loop {
        match operation().await {
            Ok(result) => return Ok(result),
            Err(e) if attempt >= max_attempts => return Err(e),
            Err(e) if !retryable(&e) => {
                warn!("Request failed (attempt {attempt}/{max_attempts}): {e}. Not retrying");
                return Err(e);
            }
            Err(e) => {
                let delay = policy.delay_after(attempt);
                warn!(
                    "Request failed (attempt {attempt}/{max_attempts}): {e}. \
                     Retrying after {}ms...",
                    delay.as_millis()
                );
                sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
