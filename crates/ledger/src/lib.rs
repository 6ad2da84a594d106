//! Client contracts for the external account and inventory ledgers.
//!
//! The users and products services each own a single resource of record
//! (cash balance, stock level). The order workflow only ever talks to
//! them through the traits in this crate: a read that distinguishes
//! "found" from "missing" from "call failed", and a last-write-wins
//! write. A guarded write variant exists as the extension point for an
//! optimistic-concurrency fix; the default implementation delegates to
//! the plain write.

pub mod account;
pub mod error;
pub mod http;
pub mod inventory;
pub mod memory;

pub use account::{AccountLedger, User};
pub use error::LedgerError;
pub use http::{HttpAccountLedger, HttpInventoryLedger, HttpLedgerConfig};
pub use inventory::{InventoryLedger, Product};
pub use memory::{InMemoryAccountLedger, InMemoryInventoryLedger};

/// Outcome of a ledger write.
///
/// A write against a deleted resource is not an error: the caller
/// decides whether `Missing` is fatal (order creation) or skippable
/// (best-effort refund during cancellation).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The write was accepted by the owning service.
    Applied,
    /// The resource no longer exists; nothing was written.
    Missing,
}

impl WriteOutcome {
    /// Returns true if the write was applied.
    pub fn is_applied(&self) -> bool {
        matches!(self, WriteOutcome::Applied)
    }
}
