//! Order API handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use orderflow_core::{Order, OrderError, OrderItem};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;

use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for creating an order
#[derive(Debug, Deserialize)]
pub struct CreateOrderBody {
    pub items: Vec<OrderItem>,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct OrderErrorResponse {
    pub error: String,
}

type ApiError = (StatusCode, Json<OrderErrorResponse>);

fn not_found(id: &str) -> ApiError {
    (
        StatusCode::NOT_FOUND,
        Json(OrderErrorResponse {
            error: format!("Order not found: {}", id),
        }),
    )
}

/// Map a lifecycle error onto a status code.
fn order_error(err: OrderError) -> ApiError {
    let status = match &err {
        OrderError::Validation(_)
        | OrderError::UnsupportedState { .. }
        | OrderError::FulfillmentBegin { .. } => StatusCode::BAD_REQUEST,
        OrderError::LockTimeout { .. } => StatusCode::CONFLICT,
        OrderError::Store(e) => {
            error!("Order store failure: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    (
        status,
        Json(OrderErrorResponse {
            error: err.to_string(),
        }),
    )
}

fn found(id: &str, result: Result<Option<Order>, OrderError>) -> Result<Json<Order>, ApiError> {
    match result {
        Ok(Some(order)) => Ok(Json(order)),
        Ok(None) => Err(not_found(id)),
        Err(e) => Err(order_error(e)),
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// Get an order by ID
pub async fn get_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Order>, ApiError> {
    found(&id, state.orchestrator().find_order(&id).await)
}

/// Create an order (idempotent while the order is still `created`)
pub async fn create_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<CreateOrderBody>,
) -> Result<Json<Order>, ApiError> {
    state
        .orchestrator()
        .create_order(&id, body.items)
        .await
        .map(Json)
        .map_err(order_error)
}

/// Record payment for an order
pub async fn resolve_payment(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Order>, ApiError> {
    found(&id, state.orchestrator().resolve_payment(&id).await)
}

/// Hand an order over to fulfillment
pub async fn start_fulfillment(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Order>, ApiError> {
    found(&id, state.orchestrator().start_fulfillment(&id).await)
}

/// Mark an order's fulfillment as done
pub async fn resolve_fulfillment(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Order>, ApiError> {
    found(&id, state.orchestrator().resolve_fulfillment(&id).await)
}
