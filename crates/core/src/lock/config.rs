//! Lock timing configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Timing for [`LockCoordinator::with_lock`](super::LockCoordinator::with_lock).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockConfig {
    /// Overall bound for one `with_lock` call (acquisition and the wrapped operation).
    #[serde(default = "default_timeout")]
    pub timeout_ms: u64,

    /// Sleep between acquisition attempts.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
}

fn default_timeout() -> u64 {
    1000
}

fn default_poll_interval() -> u64 {
    100
}

impl LockConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout(),
            poll_interval_ms: default_poll_interval(),
        }
    }
}
