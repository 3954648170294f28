//! Fulfillment client trait and types.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from a fulfillment hand-off attempt.
///
/// The `Display` text is what gets recorded as the failure reason on the order.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FulfillmentError {
    /// The fulfillment process answered but refused the order.
    #[error("{0}")]
    Rejected(String),

    /// The fulfillment process could not be reached.
    #[error("Connection failed: {0}")]
    Transport(String),

    #[error("Request timeout")]
    Timeout,
}

/// Payload handed to the fulfillment process.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FulfillmentRequest {
    pub order_id: String,
    /// Amount per product id.
    pub items: BTreeMap<String, i32>,
}

/// Hands orders off to an external fulfillment process.
///
/// Each call is one attempt; retrying is the caller's decision.
#[async_trait]
pub trait FulfillmentClient: Send + Sync {
    /// Submit an order's items for fulfillment.
    async fn submit(
        &self,
        order_id: &str,
        items: &BTreeMap<String, i32>,
    ) -> Result<(), FulfillmentError>;
}
