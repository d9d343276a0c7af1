use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tracing::warn;

use super::ExternalError;

/// Shared gate for outbound calls. Cloning shares the same permits.
#[derive(Clone, Debug)]
pub struct ExternalCallPool {
    permits: Arc<Semaphore>,
    timeout: Duration,
    backoff: Duration,
}

impl ExternalCallPool {
    pub fn new(max_concurrency: usize, timeout: Duration, backoff: Duration) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(max_concurrency.max(1))),
            timeout,
            backoff,
        }
    }

    /// Runs `op` holding one permit. A transient failure of the first attempt is
    /// retried once after the backoff; the permit is kept across the retry.
    pub async fn run<T, F, Fut>(&self, service: &'static str, mut op: F) -> Result<T, ExternalError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ExternalError>>,
    {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| ExternalError::PoolClosed)?;

        let mut attempt = 1;
        loop {
            let result = match tokio::time::timeout(self.timeout, op()).await {
                Ok(r) => r,
                Err(_) => Err(ExternalError::Timeout(self.timeout)),
            };
            match result {
                Err(e) if attempt == 1 && e.is_transient() => {
                    warn!(service, error = %e, backoff_ms = self.backoff.as_millis() as u64, "transient failure, retrying once");
                    tokio::time::sleep(self.backoff).await;
                    attempt += 1;
                }
                other => return other,
            }
        }
    }
}
