//! HTTP API server for the order workflow.
//!
//! Exposes order creation/cancellation, checkout, health, and
//! Prometheus metrics over axum, with structured logging via tracing.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use ledger::{AccountLedger, InventoryLedger};
use metrics_exporter_prometheus::PrometheusHandle;
use order_store::OrderStore;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use workflow::OrderWorkflow;

/// Shared application state accessible from all handlers.
pub struct AppState<St, A, I>
where
    St: OrderStore,
    A: AccountLedger,
    I: InventoryLedger,
{
    pub workflow: OrderWorkflow<St, A, I>,
}

impl<St, A, I> AppState<St, A, I>
where
    St: OrderStore,
    A: AccountLedger,
    I: InventoryLedger,
{
    /// Wraps a workflow engine in shared state.
    pub fn new(workflow: OrderWorkflow<St, A, I>) -> Arc<Self> {
        Arc::new(Self { workflow })
    }
}

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<St, A, I>(
    state: Arc<AppState<St, A, I>>,
    metrics_handle: PrometheusHandle,
) -> Router
where
    St: OrderStore + 'static,
    A: AccountLedger + 'static,
    I: InventoryLedger + 'static,
{
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::render))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check::<St, A, I>))
        .route("/api/orders", post(routes::orders::create::<St, A, I>))
        .route("/api/orders", get(routes::orders::list::<St, A, I>))
        .route("/api/orders/{id}", get(routes::orders::get::<St, A, I>))
        .route(
            "/api/orders/{id}/cancel",
            post(routes::orders::cancel::<St, A, I>),
        )
        .route("/api/checkout", post(routes::checkout::checkout::<St, A, I>))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}
