use std::future::Future;
use std::time::Duration;

// ============================================================================
// Exponential Backoff for Transient Failures
// ============================================================================

#[derive(Debug, Clone)]
pub struct Backoff {
    pub max_attempts: u32,
    pub first_delay: Duration,
    pub max_delay: Duration,
    pub factor: u32,
}

impl Default for Backoff {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            first_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(5),
            factor: 2,
        }
    }
}

impl Backoff {
    fn delay_after(&self, attempt: u32) -> Duration {
        let grow = self.factor.saturating_pow(attempt.saturating_sub(1));
        self.first_delay.saturating_mul(grow).min(self.max_delay)
    }
}

/// Whether retrying the same call could succeed
pub trait IsTransient {
    fn is_transient(&self) -> bool;
}

/// Run `operation` until it succeeds, fails permanently, or attempts run out.
/// The last error is returned as-is.
pub async fn retry_on_transient<F, Fut, T, E>(backoff: &Backoff, mut operation: F) -> Result<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display + IsTransient,
{
    let mut attempt = 0;
    loop {
        attempt += 1;

        let error = match operation(attempt).await {
            Ok(value) => {
                if attempt > 1 {
                    tracing::info!(attempt, "Succeeded after retry");
                }
                return Ok(value);
            }
            Err(e) => e,
        };

        if !error.is_transient() || attempt >= backoff.max_attempts {
            return Err(error);
        }

        let delay = backoff.delay_after(attempt);
        tracing::warn!(
            attempt,
            error = %error,
            delay_ms = delay.as_millis() as u64,
            "Transient failure, retrying"
        );
        tokio::time::sleep(delay).await;
    }
}
