//! Built-in stand-in for the external fulfillment process.

use axum::{extract::State, http::StatusCode};
use std::sync::Arc;
use tracing::debug;

use crate::metrics::MOCK_FULFILLMENT_CALLS;
use crate::state::AppState;

/// Accept or refuse a fulfillment request according to the configured mode.
///
/// The request body is not inspected.
pub async fn fulfill(State(state): State<Arc<AppState>>) -> (StatusCode, &'static str) {
    let call = state.next_mock_fulfillment_call();
    let mode = state.config().mock_fulfillment.mode;

    if mode.succeeds(call) {
        MOCK_FULFILLMENT_CALLS.with_label_values(&["success"]).inc();
        debug!("Mock fulfillment call {} accepted", call);
        (StatusCode::OK, "success")
    } else {
        MOCK_FULFILLMENT_CALLS.with_label_values(&["failure"]).inc();
        debug!("Mock fulfillment call {} refused ({:?})", call, mode);
        (StatusCode::INTERNAL_SERVER_ERROR, "failure")
    }
}
