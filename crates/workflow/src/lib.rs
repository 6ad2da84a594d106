//! Order workflow engine and checkout orchestrator.
//!
//! Order creation spans three independently owned resources (order row,
//! cash balance, stock level) with no distributed transaction, so the
//! engine runs a manual compensation sequence:
//! 1. Insert the order row
//! 2. Debit the user's balance
//! 3. Decrement the product's stock
//!
//! If a step fails, previously completed steps are undone in reverse
//! order before the failure is surfaced, so callers never observe a
//! half-committed order. Cancellation reverses the same edges
//! best-effort: a refund or restock against since-deleted catalog data
//! is skipped rather than blocking the cancellation.
//!
//! # Known limitation
//!
//! Compensation only runs while the process is alive. A crash after
//! the debit has been applied but before the stock decrement (or the
//! rollback) completes leaves a debited balance alongside an order row
//! without its stock effect. There is no persisted saga journal, so
//! that partial state is unrecoverable by the engine and has to be
//! reconciled by hand against the owning services.

pub mod checkout;
pub mod engine;
pub mod error;

pub use checkout::{Cart, CheckoutReport, LineFailure, LineResult};
pub use engine::{CancelOutcome, OrderWorkflow};
pub use error::WorkflowError;
