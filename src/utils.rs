//! Shared utility functions for cardflow

use std::future::Future;
use std::time::Duration;

use anyhow::Result;

#[derive(Debug, Clone, Copy)]
pub struct RetryOptions {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub exponential_backoff: bool,
}

impl Default for RetryOptions {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            exponential_backoff: true,
        }
    }
}

/// Run `op` up to `max_attempts` times, sleeping between attempts. The last
/// error is returned if every attempt fails.
pub async fn with_retry<T, F, Fut>(options: RetryOptions, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut last_err = None;

    for attempt in 0..options.max_attempts {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) => {
                if attempt + 1 < options.max_attempts {
                    let wait = if options.exponential_backoff {
                        options.base_delay * 2u32.pow(attempt)
                    } else {
                        options.base_delay
                    };
                    tracing::warn!(
                        "Attempt {}/{} failed: {}. Retrying in {:?}",
                        attempt + 1,
                        options.max_attempts,
                        e,
                        wait
                    );
                    tokio::time::sleep(wait).await;
                }
                last_err = Some(e);
            }
        }
    }

    Err(last_err.unwrap_or_else(|| anyhow::anyhow!("retry loop ran zero attempts")))
}
