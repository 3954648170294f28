//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Order lifecycle transitions
//! - Fulfillment hand-off attempts
//! - Entity lock contention

use once_cell::sync::Lazy;
use prometheus::{Histogram, HistogramOpts, IntCounterVec, Opts};

// =============================================================================
// Lifecycle Metrics
// =============================================================================

/// Lifecycle operations by operation and outcome.
pub static ORDER_OPERATIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "orderflow_order_operations_total",
            "Total order lifecycle operations",
        ),
        // result: "transitioned", "unchanged", "not_found", "rejected", "failed"
        &["operation", "result"],
    )
    .unwrap()
});

/// Fulfillment submission attempts by result.
pub static FULFILLMENT_ATTEMPTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "orderflow_fulfillment_attempts_total",
            "Total fulfillment submission attempts",
        ),
        &["result"], // "success", "failure"
    )
    .unwrap()
});

// =============================================================================
// Lock Metrics
// =============================================================================

/// Time spent waiting to acquire an entity lock.
pub static LOCK_WAIT_DURATION: Lazy<Histogram> = Lazy::new(|| {
    Histogram::with_opts(
        HistogramOpts::new(
            "orderflow_lock_wait_seconds",
            "Time spent waiting for an entity lock",
        )
        .buckets(vec![0.001, 0.01, 0.05, 0.1, 0.2, 0.3, 0.5, 0.75, 1.0]),
    )
    .unwrap()
});

/// Lock deadlines missed, by phase.
pub static LOCK_TIMEOUTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "orderflow_lock_timeouts_total",
            "Total lock deadlines missed",
        ),
        &["phase"], // "acquire", "operation"
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Lifecycle
        Box::new(ORDER_OPERATIONS.clone()),
        Box::new(FULFILLMENT_ATTEMPTS.clone()),
        // Lock
        Box::new(LOCK_WAIT_DURATION.clone()),
        Box::new(LOCK_TIMEOUTS.clone()),
    ]
}
