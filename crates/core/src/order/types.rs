//! Core order data types.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state of an order.
///
/// The variants are declared in lifecycle order, so `Ord` reflects progress:
///
/// ```text
/// Created -> Paid -> InFulfillment -> Closed
/// ```
///
/// No transition ever moves an order backwards.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum OrderState {
    /// Order accepted, waiting for payment.
    Created,
    /// Payment resolved, fulfillment not yet started.
    Paid,
    /// Handed off to the fulfillment process.
    InFulfillment,
    /// Fulfillment resolved (terminal).
    Closed,
}

impl OrderState {
    /// Returns the state as its wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderState::Created => "created",
            OrderState::Paid => "paid",
            OrderState::InFulfillment => "in_fulfillment",
            OrderState::Closed => "closed",
        }
    }

    /// Returns true if no further transitions are possible.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderState::Closed)
    }
}

impl fmt::Display for OrderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single line of an order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderItem {
    /// Product identifier.
    pub product_id: String,
    /// Ordered quantity.
    pub amount: i32,
}

impl OrderItem {
    pub fn new(product_id: impl Into<String>, amount: i32) -> Self {
        Self {
            product_id: product_id.into(),
            amount,
        }
    }
}

/// Outcome of payment resolution.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PaymentState {
    /// Payment confirmed.
    Paid { timestamp: DateTime<Utc> },
}

/// Progress of the external fulfillment process.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FulfillmentState {
    /// Fulfillment was handed off successfully.
    Started { timestamp: DateTime<Utc> },

    /// Fulfillment completed.
    Fulfilled { timestamp: DateTime<Utc> },

    /// Handing off fulfillment failed after all attempts.
    /// The order stays `Paid` so the hand-off can be retried.
    Failed {
        timestamp: DateTime<Utc>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },
}

/// An order tracked through its lifecycle.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Order {
    /// Caller-assigned identifier, immutable.
    pub id: String,

    /// Ordered items, fixed at creation.
    #[serde(default)]
    pub items: Vec<OrderItem>,

    /// Current lifecycle state.
    pub state: OrderState,

    /// Set once payment is resolved, never cleared.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_state: Option<PaymentState>,

    /// Set once fulfillment begins (or fails to begin), never cleared.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fulfillment_state: Option<FulfillmentState>,
}

impl Order {
    /// Create a fresh order in the `Created` state.
    pub fn new(id: impl Into<String>, items: Vec<OrderItem>) -> Self {
        Self {
            id: id.into(),
            items,
            state: OrderState::Created,
            payment_state: None,
            fulfillment_state: None,
        }
    }

    /// Override the state (mostly useful for seeding stores in tests).
    pub fn with_state(mut self, state: OrderState) -> Self {
        self.state = state;
        self
    }

    /// Items keyed by product id, as handed to the fulfillment process.
    ///
    /// If a product appears more than once the last line wins.
    pub fn items_by_product(&self) -> BTreeMap<String, i32> {
        self.items
            .iter()
            .map(|item| (item.product_id.clone(), item.amount))
            .collect()
    }
}
