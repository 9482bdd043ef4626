use anyhow::Result;
use std::time::Duration;
use tokio::time::sleep;

/// Linear backoff: attempt `n` waits `n * base_delay` before the next try.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(250),
        }
    }
}

impl RetryPolicy {
    pub async fn execute<F, Fut, T>(&self, mut func: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T>>,
    {
        let mut attempt = 0;

        loop {
            attempt += 1;
            match func().await {
                Ok(result) => return Ok(result),
                Err(e) => {
                    if attempt >= self.max_attempts.max(1) {
                        return Err(e);
                    }

                    let delay = self.base_delay * attempt;
                    tracing::debug!("Attempt {} failed, retrying in {:?}: {:#}", attempt, delay, e);
                    sleep(delay).await;
                }
            }
        }
    }
}
