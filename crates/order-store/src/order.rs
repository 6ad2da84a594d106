//! Order record types.

use chrono::{DateTime, Utc};
use common::{Money, OrderId, ProductId, UserId};
use serde::{Deserialize, Serialize};

/// Lifecycle status of an order.
///
/// The only transition the workflow exposes is `Completed → Cancelled`.
/// `Pending` exists in the schema for compatibility but is never
/// written by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Completed,
    Cancelled,
}

impl OrderStatus {
    /// Returns the status name as stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(OrderStatus::Pending),
            "completed" => Ok(OrderStatus::Completed),
            "cancelled" => Ok(OrderStatus::Cancelled),
            other => Err(other.to_string()),
        }
    }
}

/// A persisted order record.
///
/// `total_price` is fixed at creation time from the catalog price and
/// never changes afterwards, even if the referenced user or product is
/// later deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub product_id: ProductId,
    pub quantity: u32,
    pub total_price: Money,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Returns true if the order has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.status == OrderStatus::Cancelled
    }
}

/// Fields for a new order row; the id and timestamps are assigned by
/// the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub user_id: UserId,
    pub product_id: ProductId,
    pub quantity: u32,
    pub total_price: Money,
    pub status: OrderStatus,
}

impl NewOrder {
    /// Creates a new order row in `completed` status.
    pub fn completed(
        user_id: UserId,
        product_id: ProductId,
        quantity: u32,
        total_price: Money,
    ) -> Self {
        Self {
            user_id,
            product_id,
            quantity,
            total_price,
            status: OrderStatus::Completed,
        }
    }
}
