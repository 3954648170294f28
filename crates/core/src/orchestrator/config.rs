//! Lifecycle configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for the order lifecycle orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LifecycleConfig {
    /// Total fulfillment submission attempts before giving up (minimum 1).
    #[serde(default = "default_fulfillment_attempts")]
    pub fulfillment_attempts: u32,

    /// Pause between a failed submission and the next attempt (milliseconds).
    #[serde(default = "default_retry_delay")]
    pub retry_delay_ms: u64,
}

fn default_fulfillment_attempts() -> u32 {
    3
}

fn default_retry_delay() -> u64 {
    100
}

impl LifecycleConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            fulfillment_attempts: default_fulfillment_attempts(),
            retry_delay_ms: default_retry_delay(),
        }
    }
}
