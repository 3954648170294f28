//! Bounded-wait critical sections on top of an [`EntityLock`].

use std::future::Future;
use std::sync::Arc;

use thiserror::Error;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::metrics::{LOCK_TIMEOUTS, LOCK_WAIT_DURATION};

use super::{EntityLock, LockConfig, LockKey};

/// Errors raised by the lock coordinator.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LockError {
    /// The critical section did not complete within the configured bound.
    #[error("timed out after {timeout_ms}ms waiting on lock {key}")]
    Timeout { key: LockKey, timeout_ms: u64 },
}

/// Releases the key when dropped, including when the owning future is cancelled.
struct HeldLock<'a> {
    lock: &'a dyn EntityLock,
    key: &'a LockKey,
}

impl Drop for HeldLock<'_> {
    fn drop(&mut self) {
        self.lock.release(self.key);
    }
}

/// Runs operations while holding a keyed lock.
///
/// Acquisition polls [`EntityLock::try_acquire`] at a fixed interval. The
/// configured timeout bounds the whole call, acquisition plus the wrapped
/// operation; a slow operation is cancelled at the deadline like a slow
/// acquisition would be.
#[derive(Clone)]
pub struct LockCoordinator {
    lock: Arc<dyn EntityLock>,
    config: LockConfig,
}

impl LockCoordinator {
    pub fn new(lock: Arc<dyn EntityLock>, config: LockConfig) -> Self {
        Self { lock, config }
    }

    /// Run `operation` while holding `key`.
    ///
    /// The key is released after the operation finishes, fails, or is cut off
    /// by the deadline. If the deadline passes before the key is acquired,
    /// nothing is released and `LockError::Timeout` is returned.
    pub async fn with_lock<T, E, F, Fut>(&self, key: LockKey, operation: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: From<LockError>,
    {
        let started = Instant::now();
        let mut acquired = false;

        let outcome = tokio::time::timeout(self.config.timeout(), async {
            let _held = self.acquire(&key).await;
            acquired = true;
            LOCK_WAIT_DURATION.observe(started.elapsed().as_secs_f64());
            operation().await
        })
        .await;

        match outcome {
            Ok(result) => result,
            Err(_) => {
                LOCK_TIMEOUTS
                    .with_label_values(&[if acquired { "operation" } else { "acquire" }])
                    .inc();
                if acquired {
                    warn!(
                        key = %key,
                        timeout_ms = self.config.timeout_ms,
                        "Operation overran lock deadline and was cancelled"
                    );
                } else {
                    warn!(
                        key = %key,
                        timeout_ms = self.config.timeout_ms,
                        "Could not acquire lock before deadline"
                    );
                }
                Err(LockError::Timeout {
                    key,
                    timeout_ms: self.config.timeout_ms,
                }
                .into())
            }
        }
    }

    async fn acquire<'a>(&'a self, key: &'a LockKey) -> HeldLock<'a> {
        let mut attempts: u32 = 0;
        loop {
            attempts += 1;
            if self.lock.try_acquire(key) {
                if attempts > 1 {
                    debug!(key = %key, attempts, "Lock acquired after waiting");
                }
                return HeldLock {
                    lock: self.lock.as_ref(),
                    key,
                };
            }
            tokio::time::sleep(self.config.poll_interval()).await;
        }
    }
}
