use anyhow::{Context, Result};
use std::future::Future;
use std::time::Duration;

use crate::config::Settings;

/// Bounded retry with a fixed delay between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
    pub attempt_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(1),
            attempt_timeout: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            max_attempts: settings.retries.max(1),
            delay: settings.retry_delay,
            attempt_timeout: settings.request_timeout,
        }
    }
}

/// Runs `op` until it succeeds or `policy.max_attempts` is reached.
///
/// Each attempt is cut off after `policy.attempt_timeout`. No delay follows the final attempt;
/// its error is returned with the attempt count attached as context.
pub async fn retry<T, F, Fut>(policy: &RetryPolicy, label: &str, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt: u32 = 0;
    loop {
        attempt += 1;
        let res = match tokio::time::timeout(policy.attempt_timeout, op()).await {
            Ok(res) => res,
            Err(_) => Err(anyhow::anyhow!(
                "{label} timed out after {:?}",
                policy.attempt_timeout
            )),
        };

        match res {
            Ok(v) => return Ok(v),
            Err(err) => {
                if attempt >= max_attempts {
                    tracing::error!(attempt, label, error = %err, "all retries failed");
                    return Err(err)
                        .with_context(|| format!("{label} failed after {attempt} attempts"));
                }
                tracing::warn!(
                    attempt,
                    max_attempts,
                    delay = ?policy.delay,
                    label,
                    error = %err,
                    "attempt failed; retrying"
                );
                tokio::time::sleep(policy.delay).await;
            }
        }
    }
}
