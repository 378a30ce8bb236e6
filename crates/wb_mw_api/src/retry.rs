use crate::error::MwApiError;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::warn;
use wb_domain::profile::ThrottlePolicy;

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(2),
            max_delay: Duration::from_secs(60),
        }
    }
}

impl From<&ThrottlePolicy> for RetryPolicy {
    fn from(policy: &ThrottlePolicy) -> Self {
        Self {
            max_retries: policy.max_retries,
            base_delay: policy.backoff_base,
            ..Default::default()
        }
    }
}

impl RetryPolicy {
    pub async fn execute<F, Fut, T>(&self, mut op: F) -> Result<T, MwApiError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, MwApiError>>,
    {
        let mut attempt = 0;
        loop {
            match op().await {
                Ok(val) => return Ok(val),
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    let delay = self.delay_for(attempt);
                    warn!(attempt, ?delay, error = %e, "Retrying after error");
                    sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Exponential backoff plus up to one base delay of jitter, capped.
    fn delay_for(&self, attempt: u32) -> Duration {
        let base = self.base_delay.as_secs_f64();
        let delay_secs = base * 2f64.powi(attempt as i32) + rand_jitter() * base;
        Duration::from_secs_f64(delay_secs.min(self.max_delay.as_secs_f64()))
    }
}

/// Uniform in `[0, 1)`.
fn rand_jitter() -> f64 {
    rand::random::<f64>()
}
