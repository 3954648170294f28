use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use orderflow_core::{Config, OrderOrchestrator};

/// Shared application state
pub struct AppState {
    config: Config,
    orchestrator: Arc<OrderOrchestrator>,
    /// Calls received by the built-in fulfillment endpoint
    mock_fulfillment_calls: AtomicU64,
}

impl AppState {
    pub fn new(config: Config, orchestrator: Arc<OrderOrchestrator>) -> Self {
        Self {
            config,
            orchestrator,
            mock_fulfillment_calls: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn orchestrator(&self) -> &OrderOrchestrator {
        self.orchestrator.as_ref()
    }

    /// Count one call to the built-in fulfillment endpoint and return its
    /// 1-based sequence number.
    pub fn next_mock_fulfillment_call(&self) -> u64 {
        self.mock_fulfillment_calls.fetch_add(1, Ordering::Relaxed) + 1
    }
}
