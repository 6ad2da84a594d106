//! Durable storage for order records.
//!
//! The order store is exclusively owned by the workflow engine: it is
//! the only writer. Two implementations are provided, a PostgreSQL
//! store for production and an in-memory store for testing that
//! exposes the same interface.

pub mod error;
pub mod memory;
pub mod order;
pub mod postgres;
pub mod store;

pub use error::StoreError;
pub use memory::InMemoryOrderStore;
pub use order::{NewOrder, Order, OrderStatus};
pub use postgres::PostgresOrderStore;
pub use store::OrderStore;
