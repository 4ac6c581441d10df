//! Wait-until combinator for state that settles asynchronously on chain.
//!
//! The probe runs immediately, then on a fixed interval until it yields a
//! value or the deadline passes. No backoff: chain finality is round based.

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tokio::time::{sleep, Instant};
use tracing::debug;

#[derive(Debug, Error)]
#[error("condition not met after {attempts} attempts in {waited:?}")]
pub struct WaitTimeout {
    pub attempts: u32,
    pub waited: Duration,
}

/// Polling parameters.
#[derive(Debug, Clone, Copy)]
pub struct PollPolicy {
    pub interval: Duration,
    pub timeout: Duration,
}

impl PollPolicy {
    pub fn new(interval: Duration, timeout: Duration) -> Self {
        Self { interval, timeout }
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self { interval: Duration::from_secs(1), timeout: Duration::from_secs(120) }
    }
}

/// Run `probe` until it returns `Some`, or time out.
pub async fn poll_until<T, F, Fut>(policy: PollPolicy, mut probe: F) -> Result<T, WaitTimeout>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Option<T>>,
{
    let start = Instant::now();
    let mut attempts = 0u32;
    loop {
        attempts += 1;
        if let Some(v) = probe().await {
            return Ok(v);
        }
        let waited = start.elapsed();
        if waited + policy.interval > policy.timeout {
            return Err(WaitTimeout { attempts, waited });
        }
        debug!(attempts, ?waited, "condition not met yet");
        sleep(policy.interval).await;
    }
}

/// Boolean flavour of [`poll_until`].
pub async fn wait_until<F, Fut>(policy: PollPolicy, mut probe: F) -> Result<(), WaitTimeout>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    poll_until(policy, || {
        let fut = probe();
        async move { fut.await.then_some(()) }
    })
    .await
}
