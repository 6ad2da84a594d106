//! Inventory ledger contract for the products service.

use async_trait::async_trait;
use common::{Money, ProductId};
use serde::{Deserialize, Serialize};

use crate::WriteOutcome;
use crate::error::Result;

/// A product record as exposed by the products service.
///
/// The PUT contract is a full replace, so every field is carried even
/// though the workflow only ever changes `stock`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Money,
    /// Units on hand; last-write-wins, no version field.
    #[serde(default)]
    pub stock: u32,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub image_url: String,
}

/// Read/write access to product stock levels.
#[async_trait]
pub trait InventoryLedger: Send + Sync {
    /// Fetches a product by ID.
    ///
    /// `Ok(None)` means the product does not exist; `Err` means the call
    /// itself failed.
    async fn get_product(&self, id: ProductId) -> Result<Option<Product>>;

    /// Overwrites a product's stock level (last-write-wins).
    async fn set_stock(&self, id: ProductId, stock: u32) -> Result<WriteOutcome>;

    /// Overwrites a product's stock level only if it still equals
    /// `expected`.
    ///
    /// Same contract as [`AccountLedger::set_balance_guarded`]: the
    /// default is last-write-wins.
    ///
    /// [`AccountLedger::set_balance_guarded`]: crate::account::AccountLedger::set_balance_guarded
    async fn set_stock_guarded(
        &self,
        id: ProductId,
        expected: u32,
        stock: u32,
    ) -> Result<WriteOutcome> {
        let _ = expected;
        self.set_stock(id, stock).await
    }
}
