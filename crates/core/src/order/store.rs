//! Order storage trait and error type.

use async_trait::async_trait;
use thiserror::Error;

use super::Order;

/// Error type for order storage backends.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error.
    #[error("Database error: {0}")]
    Database(String),

    /// Stored data could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Database(e.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serialization(e.to_string())
    }
}

/// Trait for order storage backends.
///
/// The contract is a plain key-value upsert keyed by order id. Serializing
/// concurrent writers to the same order is the orchestrator's job, not the
/// store's; a store only has to keep individual reads and writes untorn.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Insert or replace the order with the same id. Returns the persisted value.
    async fn save(&self, order: Order) -> Result<Order, StoreError>;

    /// Get an order by id.
    async fn find_by_id(&self, id: &str) -> Result<Option<Order>, StoreError>;
}
