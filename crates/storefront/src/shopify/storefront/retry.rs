//! Retry with exponential back-off and jitter for Storefront API calls.
//!
//! [`retry_with_backoff`] wraps a single request and repeats it while
//! [`ShopifyError::is_retryable`] holds. A `Retry-After` from a 429 replaces
//! the computed delay, still bounded by [`RetryPolicy::max_delay`].

use std::future::Future;
use std::time::Duration;

use crate::shopify::ShopifyError;

/// How many times, and how patiently, a failed request is repeated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Additional attempts after the first one.
    pub max_retries: u32,
    /// Delay before the first retry; doubles on each subsequent retry.
    pub base_delay: Duration,
    /// Upper bound on any single delay, including server-requested ones.
    pub max_delay: Duration,
    /// Spread each computed delay by ±25%.
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            jitter: true,
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            max_retries: 0,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            jitter: false,
        }
    }

    /// Delay before retry number `attempt` (1-based) after `err`.
    ///
    /// | Retry | Delay (base = 1s)      |
    /// |-------|------------------------|
    /// | 1     | 1s × 2⁰ ± 25% jitter   |
    /// | 2     | 1s × 2¹ ± 25% jitter   |
    /// | 3     | 1s × 2² ± 25% jitter   |
    #[must_use]
    pub fn delay_for(&self, attempt: u32, err: &ShopifyError) -> Duration {
        if let Some(secs) = err.retry_after() {
            return Duration::from_secs(secs).min(self.max_delay);
        }

        let factor = 1u32 << attempt.saturating_sub(1).min(16);
        let capped = self.base_delay.saturating_mul(factor).min(self.max_delay);
        if !self.jitter {
            return capped;
        }
        capped.mul_f64(rand::random::<f64>().mul_add(0.5, 0.75))
    }
}

/// Runs `operation` until it succeeds, fails permanently, or the policy's
/// retries are used up. The last error is returned.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    policy: &RetryPolicy,
    mut operation: F,
) -> Result<T, ShopifyError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ShopifyError>>,
{
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !err.is_retryable() || attempt >= policy.max_retries {
                    return Err(err);
                }
                attempt += 1;
                let delay = policy.delay_for(attempt, &err);
                #[allow(clippy::cast_possible_truncation)]
                let delay_ms = delay.as_millis() as u64;
                tracing::warn!(
                    attempt,
                    max_retries = policy.max_retries,
                    delay_ms,
                    error = %err,
                    "Shopify transient error, retrying after back-off"
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    fn instant(max_retries: u32) -> RetryPolicy {
        RetryPolicy {
            max_retries,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            jitter: false,
        }
    }

    fn server_error() -> ShopifyError {
        ShopifyError::Status {
            status: 502,
            message: "Bad Gateway".to_string(),
        }
    }

    #[test]
    fn test_default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_retries, 3);
        assert_eq!(policy.base_delay, Duration::from_secs(1));
        assert_eq!(policy.max_delay, Duration::from_secs(30));
    }

    #[test]
    fn test_delay_doubles_without_jitter() {
        let policy = RetryPolicy {
            jitter: false,
            ..RetryPolicy::default()
        };
        let err = server_error();
        assert_eq!(policy.delay_for(1, &err), Duration::from_secs(1));
        assert_eq!(policy.delay_for(2, &err), Duration::from_secs(2));
        assert_eq!(policy.delay_for(3, &err), Duration::from_secs(4));
        assert_eq!(policy.delay_for(10, &err), Duration::from_secs(30));
    }

    #[test]
    fn test_jitter_stays_within_a_quarter() {
        let policy = RetryPolicy::default();
        let err = server_error();
        for _ in 0..50 {
            let delay = policy.delay_for(3, &err);
            assert!(delay >= Duration::from_secs(3), "{delay:?}");
            assert!(delay <= Duration::from_secs(5), "{delay:?}");
        }
    }

    #[test]
    fn test_retry_after_is_honored_and_clamped() {
        let policy = RetryPolicy::default();
        let short = ShopifyError::RateLimited {
            retry_after: Some(2),
        };
        let long = ShopifyError::RateLimited {
            retry_after: Some(600),
        };
        assert_eq!(policy.delay_for(1, &short), Duration::from_secs(2));
        assert_eq!(policy.delay_for(1, &long), Duration::from_secs(30));
    }

    #[tokio::test]
    async fn test_succeeds_immediately_on_first_try() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(&instant(3), || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Ok::<u32, ShopifyError>(42)
            }
        })
        .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_rate_limited_exhausts_all_attempts() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(&instant(3), || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err::<u32, _>(ShopifyError::RateLimited { retry_after: None })
            }
        })
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 4);
        assert!(matches!(result, Err(ShopifyError::RateLimited { .. })));
    }

    #[tokio::test]
    async fn test_retries_then_succeeds() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(&instant(3), || {
            let c = Arc::clone(&c);
            async move {
                let attempt = c.fetch_add(1, Ordering::SeqCst) + 1;
                if attempt < 3 {
                    Err(server_error())
                } else {
                    Ok(99)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 99);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_client_errors_are_not_retried() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(&instant(3), || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err::<u32, _>(ShopifyError::Status {
                    status: 400,
                    message: "Bad Request".to_string(),
                })
            }
        })
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(
            result,
            Err(ShopifyError::Status { status: 400, .. })
        ));
    }

    #[tokio::test]
    async fn test_none_policy_makes_one_attempt() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let _ = retry_with_backoff(&RetryPolicy::none(), || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err::<u32, _>(server_error())
            }
        })
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
