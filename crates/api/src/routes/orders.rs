//! Order creation, lookup, and cancellation endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use common::{OrderId, ProductId, UserId};
use ledger::{AccountLedger, InventoryLedger};
use order_store::{Order, OrderStore};
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub user_id: UserId,
    pub product_id: ProductId,
    pub quantity: u32,
}

#[derive(Serialize)]
pub struct CancelResponse {
    pub already_cancelled: bool,
    pub order: Order,
}

/// POST /api/orders — run the order creation workflow.
#[tracing::instrument(skip(state))]
pub async fn create<St, A, I>(
    State(state): State<Arc<AppState<St, A, I>>>,
    Json(req): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<Order>), ApiError>
where
    St: OrderStore + 'static,
    A: AccountLedger + 'static,
    I: InventoryLedger + 'static,
{
    let order = state
        .workflow
        .create_order(req.user_id, req.product_id, req.quantity)
        .await?;

    Ok((StatusCode::CREATED, Json(order)))
}

/// GET /api/orders/:id — load an order by id.
#[tracing::instrument(skip(state))]
pub async fn get<St, A, I>(
    State(state): State<Arc<AppState<St, A, I>>>,
    Path(id): Path<i64>,
) -> Result<Json<Order>, ApiError>
where
    St: OrderStore + 'static,
    A: AccountLedger + 'static,
    I: InventoryLedger + 'static,
{
    let order_id = OrderId::new(id);
    let order = state
        .workflow
        .get_order(order_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Order {order_id} not found")))?;

    Ok(Json(order))
}

/// GET /api/orders — list all orders, newest first.
#[tracing::instrument(skip(state))]
pub async fn list<St, A, I>(
    State(state): State<Arc<AppState<St, A, I>>>,
) -> Result<Json<Vec<Order>>, ApiError>
where
    St: OrderStore + 'static,
    A: AccountLedger + 'static,
    I: InventoryLedger + 'static,
{
    let orders = state.workflow.list_orders().await?;
    Ok(Json(orders))
}

/// POST /api/orders/:id/cancel — run the cancellation workflow.
#[tracing::instrument(skip(state))]
pub async fn cancel<St, A, I>(
    State(state): State<Arc<AppState<St, A, I>>>,
    Path(id): Path<i64>,
) -> Result<Json<CancelResponse>, ApiError>
where
    St: OrderStore + 'static,
    A: AccountLedger + 'static,
    I: InventoryLedger + 'static,
{
    let outcome = state.workflow.cancel_order(OrderId::new(id)).await?;

    Ok(Json(CancelResponse {
        already_cancelled: outcome.was_already_cancelled(),
        order: outcome.order().clone(),
    }))
}
