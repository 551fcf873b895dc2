use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use crate::error::FillError;

/// How a fallible operation is re-attempted.
///
/// `attempts` is the total budget (1 means "run once, never retry"). The
/// optional predicate is consulted before the attempt-count gate, so a policy
/// can refuse to retry whole classes of failure even with budget remaining.
#[derive(Clone)]
pub struct RetryPolicy {
    attempts: u32,
    initial_delay: Duration,
    backoff: f64,
    retry_if: Option<Arc<dyn Fn(&FillError) -> bool + Send + Sync>>,
}

impl std::fmt::Debug for RetryPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("attempts", &self.attempts)
            .field("initial_delay", &self.initial_delay)
            .field("backoff", &self.backoff)
            .field("retry_if", &self.retry_if.is_some())
            .finish()
    }
}

impl RetryPolicy {
    pub fn new(attempts: u32, initial_delay: Duration, backoff: f64) -> Self {
        Self {
            attempts: attempts.max(1),
            initial_delay,
            backoff: backoff.max(1.0),
            retry_if: None,
        }
    }

    /// A policy that executes exactly once.
    pub fn once() -> Self {
        Self::new(1, Duration::ZERO, 1.0)
    }

    /// Restrict which failures may be retried.
    pub fn retry_if<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&FillError) -> bool + Send + Sync + 'static,
    {
        self.retry_if = Some(Arc::new(predicate));
        self
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Delay slept after the i-th failed attempt (0-based):
    /// `round(initial_delay * backoff^i)`.
    pub fn delay_for(&self, failed_attempt: u32) -> Duration {
        let ms = self.initial_delay.as_millis() as f64 * self.backoff.powi(failed_attempt as i32);
        Duration::from_millis(ms.round() as u64)
    }

    fn allows_retry_of(&self, err: &FillError) -> bool {
        self.retry_if.as_ref().map_or(true, |p| p(err))
    }
}

/// Run `op` under `policy`, sleeping between attempts.
///
/// On exhaustion, or when the policy's predicate rejects retrying, the last
/// underlying error is wrapped in `FillError::RetryExhausted` together with
/// the scope label and the number of attempts actually made. One diagnostic
/// line is emitted per retry (never on final success), carrying the computed
/// delay and the failure it is absorbing.
pub async fn with_retry<T, F, Fut>(
    scope: &str,
    policy: &RetryPolicy,
    mut op: F,
) -> Result<T, FillError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, FillError>>,
{
    let mut attempt: u32 = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                attempt += 1;
                if !policy.allows_retry_of(&err) || attempt >= policy.attempts {
                    return Err(FillError::RetryExhausted {
                        scope: scope.to_string(),
                        attempts: attempt,
                        source: Box::new(err),
                    });
                }
                let delay = policy.delay_for(attempt - 1);
                warn!(
                    scope,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    reason = %err,
                    "retrying after failure"
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}
