//! Retry with exponential backoff.
//!
//! Both extractors and the lifecycle signaler retry through [`retry`]; they
//! differ only in where the exponent starts and whether the final failure is
//! followed by a delay.

use std::future::Future;
use std::time::Duration;

/// Attempt count and delay schedule of a retry loop.
///
/// The delay after failed attempt `k` (0-indexed) is
/// `base_delay * 2^(k + exponent_offset)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub exponent_offset: u32,
    /// Also wait after the last failed attempt before giving up.
    pub delay_after_last: bool,
}

impl RetryPolicy {
    /// Zero-match polling in schema mode: attempts counted from 1, every
    /// failure (including the last) waits `base * 2^attempt`.
    #[must_use]
    pub fn schema_poll(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
            exponent_offset: 1,
            delay_after_last: true,
        }
    }

    /// Generic extraction: the `k`-th failure waits
    /// `base * 2^k`, with no delay after the final attempt.
    #[must_use]
    pub fn exponential(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
            exponent_offset: 0,
            delay_after_last: false,
        }
    }

    /// Delay following failed attempt `attempt` (0-indexed).
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_add(self.exponent_offset).min(16);
        self.base_delay.saturating_mul(1_u32 << exponent)
    }

    /// Sum of every delay slept when all attempts fail.
    #[must_use]
    pub fn total_delay(&self) -> Duration {
        (0..self.max_attempts)
            .filter(|attempt| self.delay_after_last || attempt + 1 < self.max_attempts)
            .map(|attempt| self.delay_for(attempt))
            .sum()
    }
}

/// Run `op` until it succeeds or the policy is exhausted.
///
/// `op` receives the 0-indexed attempt number. On exhaustion the last error
/// is returned. A policy with zero attempts is treated as one attempt.
pub async fn retry<T, E, F, Fut>(policy: &RetryPolicy, mut op: F) -> Result<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let attempts = policy.max_attempts.max(1);
    let mut attempt = 0;
    loop {
        match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(err) => {
                let last = attempt + 1 >= attempts;
                if !last || policy.delay_after_last {
                    tokio::time::sleep(policy.delay_for(attempt)).await;
                }
                if last {
                    return Err(err);
                }
            }
        }
        attempt += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    #[test]
    fn schedules_match_both_extractors() {
        let schema = RetryPolicy::schema_poll(3, Duration::from_millis(1000));
        assert_eq!(schema.delay_for(0), Duration::from_millis(2000));
        assert_eq!(schema.total_delay(), Duration::from_millis(14_000));

        let generic = RetryPolicy::exponential(3, Duration::from_millis(1000));
        assert_eq!(generic.delay_for(0), Duration::from_millis(1000));
        assert_eq!(generic.total_delay(), Duration::from_millis(3000));
    }

    #[tokio::test(start_paused = true)]
    async fn returns_last_error_after_exhaustion() {
        let policy = RetryPolicy::exponential(3, Duration::from_millis(1000));
        let started = Instant::now();
        let result: Result<(), String> =
            retry(&policy, |attempt| async move { Err(format!("fail {attempt}")) }).await;

        assert_eq!(result, Err("fail 2".to_string()));
        assert!(started.elapsed() >= Duration::from_millis(3000));
        assert!(started.elapsed() < Duration::from_millis(3100));
    }

    #[tokio::test(start_paused = true)]
    async fn stops_on_first_success() {
        let policy = RetryPolicy::schema_poll(3, Duration::from_millis(1000));
        let started = Instant::now();
        let result: Result<u32, ()> = retry(&policy, |attempt| async move {
            if attempt == 1 {
                Ok(attempt)
            } else {
                Err(())
            }
        })
        .await;

        assert_eq!(result, Ok(1));
        assert!(started.elapsed() >= Duration::from_millis(2000));
        assert!(started.elapsed() < Duration::from_millis(2100));
    }
}
