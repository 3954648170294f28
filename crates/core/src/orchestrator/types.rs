//! Types for the order lifecycle orchestrator.

use thiserror::Error;

use crate::lock::LockError;
use crate::order::{Order, OrderState, StoreError};

/// Errors returned by lifecycle operations.
///
/// An absent order is not an error; operations report it as `Ok(None)`.
#[derive(Debug, Error)]
pub enum OrderError {
    /// Creation requested with unusable input. Nothing was persisted.
    #[error("{0}")]
    Validation(String),

    /// The order is in a state the operation cannot start from.
    #[error("Order with id '{id}' has an unsupported state of '{state}'")]
    UnsupportedState { id: String, state: OrderState },

    /// The order's lock could not be taken, or the locked section overran.
    #[error("Timed out waiting for lock on order with id '{id}'")]
    LockTimeout { id: String },

    /// Every fulfillment submission attempt failed.
    ///
    /// The order has been saved with a `Failed` fulfillment state.
    #[error("Could not begin fulfillment for order with id '{id}' after {attempts} attempts")]
    FulfillmentBegin { id: String, attempts: u32 },

    #[error("order store error: {0}")]
    Store(#[from] StoreError),
}

impl From<LockError> for OrderError {
    fn from(err: LockError) -> Self {
        match err {
            LockError::Timeout { key, .. } => OrderError::LockTimeout { id: key.id },
        }
    }
}

impl OrderError {
    pub(crate) fn unsupported(order: &Order) -> Self {
        OrderError::UnsupportedState {
            id: order.id.clone(),
            state: order.state,
        }
    }

    /// True for errors caused by the request rather than by the system.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            OrderError::Validation(_) | OrderError::UnsupportedState { .. }
        )
    }
}

/// What a locked lifecycle step did.
#[derive(Debug)]
pub(crate) enum Outcome {
    /// The order moved forward and was saved.
    Transitioned(Order),
    /// The order was already at the target state; nothing was written.
    Unchanged(Order),
}

impl Outcome {
    pub(crate) fn into_order(self) -> Order {
        match self {
            Outcome::Transitioned(order) | Outcome::Unchanged(order) => order,
        }
    }
}

/// Metric label for the result of a lifecycle step.
pub(crate) trait ResultLabel {
    fn result_label(&self) -> &'static str;
}

impl ResultLabel for Outcome {
    fn result_label(&self) -> &'static str {
        match self {
            Outcome::Transitioned(_) => "transitioned",
            Outcome::Unchanged(_) => "unchanged",
        }
    }
}

impl ResultLabel for Option<Outcome> {
    fn result_label(&self) -> &'static str {
        match self {
            Some(outcome) => outcome.result_label(),
            None => "not_found",
        }
    }
}
