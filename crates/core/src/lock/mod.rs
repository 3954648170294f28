//! Per-entity locking.
//!
//! Serializes mutations of one entity while letting operations on other
//! entities run in parallel. Suitable for a single process only.

mod config;
mod coordinator;
mod memory;

pub use config::LockConfig;
pub use coordinator::{LockCoordinator, LockError};
pub use memory::{EntityLock, InMemoryEntityLock, LockKey, ORDER_KIND};
