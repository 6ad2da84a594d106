//! Order store error types.

use thiserror::Error;

/// Errors that can occur when interacting with the order store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A row carried a status value outside the known set.
    #[error("Unknown order status in database: {0}")]
    UnknownStatus(String),

    /// A stored total price could not be represented as cents.
    #[error("Total price out of range: {0}")]
    PriceOutOfRange(String),

    /// The store is unreachable. Used by test doubles to inject
    /// failures.
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Result type for order store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
