//! Retry Policy
//!
//! Fixed-delay retries for authentication-class failures. The decision
//! (`next_delay`) is pure so it can be checked without timers.

use std::future::Future;
use std::time::Duration;

use shoplist_backend_lib::domain::{DomainError, DomainResult};

use crate::cancel::CancelToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::auth_refresh()
    }
}

impl RetryPolicy {
    /// 4 attempts, 500 ms apart
    pub fn auth_refresh() -> Self {
        Self {
            max_attempts: 4,
            delay: Duration::from_millis(500),
        }
    }

    /// A single attempt
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            delay: Duration::ZERO,
        }
    }

    /// Delay before the attempt after `attempt` (1-based), or `None` to give up
    pub fn next_delay(&self, attempt: u32, err: &DomainError) -> Option<Duration> {
        if attempt >= self.max_attempts || !err.is_auth_failure() {
            return None;
        }
        Some(self.delay)
    }

    /// Run `op` until it succeeds, fails for a non-auth reason, or attempts run out.
    /// `op` receives the attempt number. Both the attempts and the waits between
    /// them stop early with `Cancelled` when `cancel` fires.
    pub async fn run<T, F, Fut>(&self, cancel: &CancelToken, mut op: F) -> DomainResult<T>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = DomainResult<T>>,
    {
        let mut attempt = 1;
        loop {
            let err = match cancel.guard(op(attempt)).await {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };
            let Some(delay) = self.next_delay(attempt, &err) else {
                return Err(err);
            };
            log::warn!(
                "Attempt {}/{} failed ({}), retrying in {:?}",
                attempt,
                self.max_attempts,
                err,
                delay
            );
            cancel.sleep(delay).await?;
            attempt += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cancel::cancel_pair;
    use std::cell::Cell;

    fn auth_error() -> DomainError {
        DomainError::NotAuthenticated("session expired".into())
    }

    #[test]
    fn test_next_delay_only_for_auth_failures() {
        let policy = RetryPolicy::auth_refresh();
        assert_eq!(policy.next_delay(1, &auth_error()), Some(Duration::from_millis(500)));
        assert_eq!(policy.next_delay(3, &DomainError::network(Some(401), "unauthorized")), Some(Duration::from_millis(500)));
        assert_eq!(policy.next_delay(1, &DomainError::network(Some(500), "boom")), None);
        assert_eq!(policy.next_delay(1, &DomainError::Cancelled), None);
    }

    #[test]
    fn test_next_delay_stops_at_budget() {
        let policy = RetryPolicy::auth_refresh();
        assert!(policy.next_delay(3, &auth_error()).is_some());
        assert_eq!(policy.next_delay(4, &auth_error()), None);
        assert_eq!(RetryPolicy::none().next_delay(1, &auth_error()), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_waits_fixed_delay_between_attempts() {
        let (_handle, token) = cancel_pair();
        let calls = Cell::new(0);
        let start = tokio::time::Instant::now();

        let result = RetryPolicy::auth_refresh()
            .run(&token, |attempt| {
                calls.set(calls.get() + 1);
                async move {
                    if attempt < 3 {
                        Err(auth_error())
                    } else {
                        Ok(attempt)
                    }
                }
            })
            .await;

        assert_eq!(result, Ok(3));
        assert_eq!(calls.get(), 3);
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(1000) && elapsed < Duration::from_millis(1500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_gives_up_after_budget() {
        let (_handle, token) = cancel_pair();
        let calls = Cell::new(0);

        let result: DomainResult<()> = RetryPolicy::auth_refresh()
            .run(&token, |_| {
                calls.set(calls.get() + 1);
                async { Err(auth_error()) }
            })
            .await;

        assert_eq!(result, Err(auth_error()));
        assert_eq!(calls.get(), 4);
    }

    #[tokio::test]
    async fn test_run_does_not_retry_other_errors() {
        let (_handle, token) = cancel_pair();
        let calls = Cell::new(0);

        let result: DomainResult<()> = RetryPolicy::auth_refresh()
            .run(&token, |_| {
                calls.set(calls.get() + 1);
                async { Err(DomainError::network(Some(500), "boom")) }
            })
            .await;

        assert_eq!(result.unwrap_err().status(), Some(500));
        assert_eq!(calls.get(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_during_backoff() {
        let (handle, token) = cancel_pair();
        let calls = Cell::new(0);

        let policy = RetryPolicy::auth_refresh();
        let run = policy.run(&token, |_| {
            calls.set(calls.get() + 1);
            async { Err::<(), _>(auth_error()) }
        });
        let canceller = async {
            tokio::time::sleep(Duration::from_millis(200)).await;
            handle.cancel();
        };
        let (result, _) = tokio::join!(run, canceller);

        assert_eq!(result, Err(DomainError::Cancelled));
        assert_eq!(calls.get(), 1);
    }
}
