//! Timeout and bounded retry for every store call.
//!
//! Retries use a fixed pause between attempts, not backoff. Only errors that
//! report themselves retryable are tried again; `NotAuthenticated` and
//! validation failures return immediately.

use std::future::Future;

use futures::future::{select, Either};

use console_types::{profile::DeviceProfile, ConsoleError, Result};

use crate::ports::ClockPort;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Extra attempts after the first
    pub max_retries: u32,
    /// Per attempt; zero disables the timeout
    pub timeout_ms: u64,
    pub retry_delay_ms: u64,
}

impl RetryPolicy {
    /// A single attempt with the given timeout
    pub fn once(timeout_ms: u64) -> Self {
        Self {
            max_retries: 0,
            timeout_ms,
            retry_delay_ms: 0,
        }
    }
}

impl From<&DeviceProfile> for RetryPolicy {
    fn from(p: &DeviceProfile) -> Self {
        Self {
            max_retries: p.max_retries,
            timeout_ms: p.timeout_ms,
            retry_delay_ms: p.retry_delay_ms,
        }
    }
}

/// Race `fut` against the clock.
pub async fn with_timeout<T, F>(clock: &dyn ClockPort, timeout_ms: u64, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    if timeout_ms == 0 {
        return fut.await;
    }
    let op = Box::pin(fut);
    let timer = clock.sleep(timeout_ms);
    match select(op, timer).await {
        Either::Left((result, _)) => result,
        Either::Right(((), _)) => Err(ConsoleError::NetworkTimeout(timeout_ms)),
    }
}

/// Run `op` until it succeeds, fails with a non-retryable error, or the
/// policy's attempts are used up. The last error is returned.
pub async fn with_retry<T, F, Fut>(clock: &dyn ClockPort, policy: &RetryPolicy, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 0;
    loop {
        match with_timeout(clock, policy.timeout_ms, op()).await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_retryable() && attempt < policy.max_retries => {
                attempt += 1;
                log::debug!(
                    "Attempt {} failed ({}), retrying in {}ms",
                    attempt,
                    e,
                    policy.retry_delay_ms
                );
                if policy.retry_delay_ms > 0 {
                    clock.sleep(policy.retry_delay_ms).await;
                }
            }
            Err(e) => return Err(e),
        }
    }
}
