use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

use super::{fulfillment_mock, handlers, middleware::metrics_middleware, orders};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let mock = state.config().mock_fulfillment.clone();

    // API routes
    let api_routes = Router::new()
        // Health, config and metrics
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        .route("/metrics", get(handlers::get_metrics))
        // Orders
        .route("/orders/{id}", get(orders::get_order))
        .route("/orders/{id}", post(orders::create_order))
        .route(
            "/orders/{id}/payment-resolution",
            post(orders::resolve_payment),
        )
        .route(
            "/orders/{id}/fulfillment-start",
            post(orders::start_fulfillment),
        )
        .route(
            "/orders/{id}/fulfillment-resolution",
            post(orders::resolve_fulfillment),
        )
        .with_state(Arc::clone(&state));

    let mut router = Router::new().nest("/api/v1", api_routes);

    if mock.enabled {
        info!("Serving mock fulfillment endpoint at {}", mock.path);
        router = router.route(
            &mock.path,
            post(fulfillment_mock::fulfill).with_state(state),
        );
    }

    router
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
}
