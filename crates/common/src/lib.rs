//! Shared types used across the order workflow services.

pub mod types;

pub use types::{Money, OrderId, ProductId, UserId};
