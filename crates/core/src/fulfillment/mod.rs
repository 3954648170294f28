//! Fulfillment hand-off abstraction.
//!
//! This module provides a `FulfillmentClient` trait for handing orders to an
//! external fulfillment process, and an HTTP implementation.

mod rest;
mod types;

pub use rest::RestFulfillmentClient;
pub use types::{FulfillmentClient, FulfillmentError, FulfillmentRequest};
