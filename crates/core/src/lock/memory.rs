//! Keyed mutual exclusion over a shared held-key set.

use std::collections::HashSet;
use std::fmt;
use std::sync::Mutex;

use tracing::debug;

/// Entity kind used for order locks.
pub const ORDER_KIND: &str = "Order";

/// Identifies one lockable entity: `(kind, id)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LockKey {
    pub kind: &'static str,
    pub id: String,
}

impl LockKey {
    pub fn new(kind: &'static str, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }

    /// Key for an order id.
    pub fn order(id: impl Into<String>) -> Self {
        Self::new(ORDER_KIND, id)
    }
}

impl fmt::Display for LockKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind, self.id)
    }
}

/// Non-blocking keyed lock primitive.
///
/// Implementations must make `try_acquire` an atomic insert-if-absent and
/// `release` an idempotent removal. Waiting and timeouts live in
/// [`LockCoordinator`](super::LockCoordinator).
pub trait EntityLock: Send + Sync {
    /// Mark the key as held. Returns false if it was already held.
    fn try_acquire(&self, key: &LockKey) -> bool;

    /// Remove the key from the held set. Releasing a free key is a no-op.
    fn release(&self, key: &LockKey);
}

/// Single-process lock backed by a mutex-guarded `HashSet`.
#[derive(Debug, Default)]
pub struct InMemoryEntityLock {
    held: Mutex<HashSet<LockKey>>,
}

impl InMemoryEntityLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the key is currently held.
    pub fn is_held(&self, key: &LockKey) -> bool {
        self.held
            .lock()
            .map(|held| held.contains(key))
            .unwrap_or(false)
    }

    /// Number of keys currently held.
    pub fn held_count(&self) -> usize {
        self.held.lock().map(|held| held.len()).unwrap_or(0)
    }
}

impl EntityLock for InMemoryEntityLock {
    fn try_acquire(&self, key: &LockKey) -> bool {
        // A poisoned set still has consistent membership: insert/remove never panic midway.
        let mut held = self.held.lock().unwrap_or_else(|e| e.into_inner());
        let acquired = held.insert(key.clone());
        if acquired {
            debug!(key = %key, "Lock acquired");
        }
        acquired
    }

    fn release(&self, key: &LockKey) {
        let mut held = self.held.lock().unwrap_or_else(|e| e.into_inner());
        if held.remove(key) {
            debug!(key = %key, "Lock released");
        }
    }
}
