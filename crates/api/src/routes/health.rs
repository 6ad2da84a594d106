//! Health check endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use ledger::{AccountLedger, InventoryLedger};
use order_store::OrderStore;
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
}

/// GET /health — reflects order store reachability.
pub async fn check<St, A, I>(
    State(state): State<Arc<AppState<St, A, I>>>,
) -> (StatusCode, Json<HealthResponse>)
where
    St: OrderStore + 'static,
    A: AccountLedger + 'static,
    I: InventoryLedger + 'static,
{
    match state.workflow.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "healthy",
                service: "orders",
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "unhealthy",
                    service: "orders",
                }),
            )
        }
    }
}
