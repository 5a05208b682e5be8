//! Bounded retry with exponential backoff around one prediction request

use std::future::Future;
use std::time::Duration;
use tokio::sync::watch;
use tracing::warn;

use super::error::PredictError;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: DEFAULT_BASE_DELAY,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    /// Wait after the failed attempt `attempt` (0-indexed): `base * 2^attempt`
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay
            .saturating_mul(2_u32.saturating_pow(attempt))
    }

    /// Run `op` until it succeeds, fails with a non-retriable error, or the
    /// attempts run out.
    ///
    /// `cancel` is checked before every attempt and cuts a backoff short; once
    /// it reads `true` no further attempt is started. An attempt already in
    /// flight is not interrupted.
    pub async fn run<F, Fut, T>(
        &self,
        mut op: F,
        cancel: Option<&watch::Receiver<bool>>,
    ) -> Result<T, PredictError>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, PredictError>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            if cancel.is_some_and(|rx| *rx.borrow()) {
                return Err(PredictError::Cancelled);
            }

            match op(attempt).await {
                Ok(value) => return Ok(value),
                Err(e) if !e.is_retriable() => return Err(e),
                Err(e) if attempt + 1 >= max_attempts => {
                    warn!(
                        "Prediction attempt {}/{} failed: {}. Giving up",
                        attempt + 1,
                        max_attempts,
                        e
                    );
                    return Err(PredictError::Exhausted {
                        attempts: attempt + 1,
                        last: Box::new(e),
                    });
                }
                Err(e) => {
                    let delay = self.delay_for(attempt);
                    warn!(
                        "Prediction attempt {}/{} failed: {}. Retrying in {}ms",
                        attempt + 1,
                        max_attempts,
                        e,
                        delay.as_millis()
                    );
                    backoff(delay, cancel).await;
                    attempt += 1;
                }
            }
        }
    }
}

/// Sleep for `delay`, returning early once `cancel` flips to true
async fn backoff(delay: Duration, cancel: Option<&watch::Receiver<bool>>) {
    let Some(cancel) = cancel else {
        tokio::time::sleep(delay).await;
        return;
    };

    let mut cancel = cancel.clone();
    let sleep = tokio::time::sleep(delay);
    tokio::pin!(sleep);

    loop {
        tokio::select! {
            _ = &mut sleep => return,
            changed = cancel.changed() => match changed {
                Ok(()) if *cancel.borrow_and_update() => return,
                Ok(()) => {}
                // sender gone: nobody can cancel any more
                Err(_) => {
                    sleep.await;
                    return;
                }
            },
        }
    }
}
