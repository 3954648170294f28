//! Testing utilities and mock implementations.
//!
//! Lets the lifecycle and HTTP layers be exercised without a real
//! fulfillment process.

mod mock_fulfillment;

pub use mock_fulfillment::MockFulfillmentClient;

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::order::OrderItem;

    /// Build order items from `(product_id, amount)` pairs.
    pub fn items(pairs: &[(&str, i32)]) -> Vec<OrderItem> {
        pairs
            .iter()
            .map(|(product_id, amount)| OrderItem::new(*product_id, *amount))
            .collect()
    }

    /// A single-product basket.
    pub fn single_item(product_id: &str) -> Vec<OrderItem> {
        items(&[(product_id, 1)])
    }
}
