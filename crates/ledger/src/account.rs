//! Account ledger contract for the users service.

use async_trait::async_trait;
use common::{Money, UserId};
use serde::{Deserialize, Serialize};

use crate::WriteOutcome;
use crate::error::Result;

/// A user record as exposed by the users service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    /// Current cash balance; last-write-wins, no version field.
    #[serde(default)]
    pub cash_balance: Money,
}

/// Read/write access to user cash balances.
#[async_trait]
pub trait AccountLedger: Send + Sync {
    /// Fetches a user by ID.
    ///
    /// `Ok(None)` means the user does not exist; `Err` means the call
    /// itself failed.
    async fn get_user(&self, id: UserId) -> Result<Option<User>>;

    /// Overwrites a user's cash balance (last-write-wins).
    async fn set_balance(&self, id: UserId, balance: Money) -> Result<WriteOutcome>;

    /// Overwrites a user's cash balance only if it still equals
    /// `expected`.
    ///
    /// The default implementation is last-write-wins and ignores
    /// `expected`; implementations backed by a service with optimistic
    /// concurrency support can reject stale writes instead.
    async fn set_balance_guarded(
        &self,
        id: UserId,
        expected: Money,
        balance: Money,
    ) -> Result<WriteOutcome> {
        let _ = expected;
        self.set_balance(id, balance).await
    }
}
