use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use common::OrderId;
use tokio::sync::RwLock;

use crate::error::{Result, StoreError};
use crate::order::{NewOrder, Order, OrderStatus};
use crate::store::OrderStore;

#[derive(Default)]
struct MemoryState {
    orders: BTreeMap<i64, Order>,
    next_id: i64,
    fail_on_insert: bool,
    fail_on_update: bool,
}

/// In-memory order store implementation for testing.
///
/// Provides the same interface as the PostgreSQL implementation, plus
/// failure toggles to exercise the workflow rollback paths.
#[derive(Clone, Default)]
pub struct InMemoryOrderStore {
    state: Arc<RwLock<MemoryState>>,
}

impl InMemoryOrderStore {
    /// Creates a new empty in-memory order store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of stored orders.
    pub async fn order_count(&self) -> usize {
        self.state.read().await.orders.len()
    }

    /// Configures inserts to fail.
    pub async fn set_fail_on_insert(&self, fail: bool) {
        self.state.write().await.fail_on_insert = fail;
    }

    /// Configures status updates to fail.
    pub async fn set_fail_on_update(&self, fail: bool) {
        self.state.write().await.fail_on_update = fail;
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn insert(&self, new_order: NewOrder) -> Result<Order> {
        let mut state = self.state.write().await;
        if state.fail_on_insert {
            return Err(StoreError::Unavailable("insert failed".to_string()));
        }

        state.next_id += 1;
        let now = Utc::now();
        let order = Order {
            id: OrderId::new(state.next_id),
            user_id: new_order.user_id,
            product_id: new_order.product_id,
            quantity: new_order.quantity,
            total_price: new_order.total_price,
            status: new_order.status,
            created_at: now,
            updated_at: now,
        };
        state.orders.insert(order.id.as_i64(), order.clone());
        Ok(order)
    }

    async fn get(&self, id: OrderId) -> Result<Option<Order>> {
        Ok(self.state.read().await.orders.get(&id.as_i64()).cloned())
    }

    async fn list(&self) -> Result<Vec<Order>> {
        let state = self.state.read().await;
        let mut orders: Vec<Order> = state.orders.values().cloned().collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(orders)
    }

    async fn delete(&self, id: OrderId) -> Result<()> {
        self.state.write().await.orders.remove(&id.as_i64());
        Ok(())
    }

    async fn mark_cancelled(&self, id: OrderId) -> Result<Option<Order>> {
        let mut state = self.state.write().await;
        if state.fail_on_update {
            return Err(StoreError::Unavailable("update failed".to_string()));
        }
        Ok(state.orders.get_mut(&id.as_i64()).map(|order| {
            order.status = OrderStatus::Cancelled;
            order.updated_at = Utc::now();
            order.clone()
        }))
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}
