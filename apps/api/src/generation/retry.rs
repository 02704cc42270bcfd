//! Bounded retry for generation calls.
//!
//! Fixed delay between attempts; only transient backend failures are retried.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::llm_client::LlmError;

pub const MAX_ATTEMPTS: u32 = 3;
pub const RETRY_DELAY: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: MAX_ATTEMPTS,
            delay: RETRY_DELAY,
        }
    }
}

impl RetryPolicy {
    /// Runs `call` until it succeeds, fails non-transiently, or attempts run out.
    /// The last error is returned when every attempt was transient.
    pub async fn run<T, F, Fut>(&self, mut call: F) -> Result<T, LlmError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, LlmError>>,
    {
        let mut attempt = 1;
        loop {
            match call().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transient() && attempt < self.max_attempts => {
                    warn!(
                        "Generation attempt {}/{} failed ({}), retrying after {}s",
                        attempt,
                        self.max_attempts,
                        e,
                        self.delay.as_secs()
                    );
                    tokio::time::sleep(self.delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
