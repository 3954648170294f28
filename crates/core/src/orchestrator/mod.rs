//! Order lifecycle orchestrator.
//!
//! Drives orders through `Created -> Paid -> InFulfillment -> Closed`. Every
//! operation reads, decides, acts and persists while holding the order's
//! entity lock, so transitions of one order never interleave.

mod config;
mod service;
mod types;

pub use config::LifecycleConfig;
pub use service::OrderOrchestrator;
pub use types::OrderError;
