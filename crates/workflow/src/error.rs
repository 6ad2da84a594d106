//! Workflow error taxonomy.

use common::{Money, OrderId, ProductId, UserId};
use order_store::StoreError;
use thiserror::Error;

/// Errors that can occur during workflow operations.
///
/// Business-rule violations (`InvalidInput`, `InsufficientFunds`,
/// `InsufficientStock`) are detected before any mutation.
/// `DependencyFailure` is only surfaced after the compensating rollback
/// has run.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// The referenced user does not exist.
    #[error("User {0} not found")]
    UserNotFound(UserId),

    /// The referenced product does not exist.
    #[error("Product {0} not found")]
    ProductNotFound(ProductId),

    /// The referenced order does not exist.
    #[error("Order {0} not found")]
    OrderNotFound(OrderId),

    /// The request carried an invalid field.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The user's balance does not cover the total price.
    #[error("Insufficient balance: {balance} available, {total} required")]
    InsufficientFunds { balance: Money, total: Money },

    /// The product's stock does not cover the requested quantity.
    #[error("Insufficient stock: {available} available, {requested} requested")]
    InsufficientStock { available: u32, requested: u32 },

    /// A remote ledger call errored or timed out.
    #[error("Dependency failure: {0}")]
    DependencyFailure(String),

    /// Order store error.
    #[error("Order store error: {0}")]
    Store(#[from] StoreError),
}

impl WorkflowError {
    /// Returns true for the not-found family of errors.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            WorkflowError::UserNotFound(_)
                | WorkflowError::ProductNotFound(_)
                | WorkflowError::OrderNotFound(_)
        )
    }

    /// Returns true for business-rule violations that are rejected
    /// before any mutation.
    pub fn is_business_rule(&self) -> bool {
        matches!(
            self,
            WorkflowError::InvalidInput(_)
                | WorkflowError::InsufficientFunds { .. }
                | WorkflowError::InsufficientStock { .. }
        )
    }
}

/// Result type for workflow operations.
pub type Result<T> = std::result::Result<T, WorkflowError>;
