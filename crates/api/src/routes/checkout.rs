//! Checkout endpoint: multi-line cart fan-out.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use common::UserId;
use ledger::{AccountLedger, InventoryLedger};
use order_store::OrderStore;
use serde::Deserialize;
use workflow::{Cart, CheckoutReport};

use crate::AppState;
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    pub user_id: UserId,
    /// Product id → requested quantity. JSON object keys are strings;
    /// serde parses them back into integer product ids.
    pub cart: Cart,
}

/// POST /api/checkout — place one order per cart line.
///
/// The response is structurally 200 even when lines failed; the caller
/// inspects the `failed` list. Only the upfront aggregate rejection
/// (missing user, insufficient funds for the whole cart) surfaces as an
/// error status.
#[tracing::instrument(skip(state, req), fields(user_id = %req.user_id, lines = req.cart.len()))]
pub async fn checkout<St, A, I>(
    State(state): State<Arc<AppState<St, A, I>>>,
    Json(req): Json<CheckoutRequest>,
) -> Result<Json<CheckoutReport>, ApiError>
where
    St: OrderStore + 'static,
    A: AccountLedger + 'static,
    I: InventoryLedger + 'static,
{
    let report = state.workflow.checkout(req.user_id, &req.cart).await?;
    Ok(Json(report))
}
