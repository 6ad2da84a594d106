use async_trait::async_trait;
use common::OrderId;

use crate::error::Result;
use crate::order::{NewOrder, Order};

/// Core trait for order store implementations.
///
/// All implementations must be thread-safe (Send + Sync). The workflow
/// engine is the only caller of the mutating methods; `delete` exists
/// solely as the compensating action for a failed creation saga.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Inserts a new order row and returns the persisted record with
    /// its assigned id and timestamps.
    async fn insert(&self, new_order: NewOrder) -> Result<Order>;

    /// Retrieves an order by id, or None if absent.
    async fn get(&self, id: OrderId) -> Result<Option<Order>>;

    /// Retrieves all orders, newest first.
    async fn list(&self) -> Result<Vec<Order>>;

    /// Removes an order row. Removing an absent row is not an error;
    /// the compensation path must be idempotent.
    async fn delete(&self, id: OrderId) -> Result<()>;

    /// Sets an order's status to cancelled and bumps `updated_at`.
    ///
    /// Returns the updated record, or None if the order is absent.
    async fn mark_cancelled(&self, id: OrderId) -> Result<Option<Order>>;

    /// Checks that the underlying storage is reachable.
    async fn ping(&self) -> Result<()>;
}
