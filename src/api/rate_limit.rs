//! Pacing and retry for rate-limited upstream calls.
//!
//! Every request waits `delay` first. A rate-limited answer (HTTP 429) earns
//! one more try after `backoff`; a second 429 gives up.

use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;
use tracing::warn;

use crate::error::{Error, Result};

/// Outcome of a single upstream attempt.
#[derive(Debug)]
pub enum Attempt<T> {
    Done(T),
    RateLimited,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub delay: Duration,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            delay: Duration::from_secs(1),
            backoff: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    pub async fn run<T, F, Fut>(&self, what: &str, mut attempt: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<Attempt<T>>>,
    {
        sleep(self.delay).await;
        if let Attempt::Done(value) = attempt().await? {
            return Ok(value);
        }

        warn!("Rate limit hit for {}, waiting {:?} before retry", what, self.backoff);
        sleep(self.backoff).await;
        match attempt().await? {
            Attempt::Done(value) => Ok(value),
            Attempt::RateLimited => Err(Error::RateLimited(what.to_string())),
        }
    }
}
