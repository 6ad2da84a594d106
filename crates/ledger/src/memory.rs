//! In-memory ledger implementations for testing.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::{Money, ProductId, UserId};

use crate::WriteOutcome;
use crate::account::{AccountLedger, User};
use crate::error::{LedgerError, Result};
use crate::inventory::{InventoryLedger, Product};

#[derive(Debug, Default)]
struct AccountState {
    users: HashMap<UserId, User>,
    fail_on_read: bool,
    fail_on_write: bool,
    write_count: usize,
}

/// In-memory account ledger with failure injection for tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAccountLedger {
    state: Arc<RwLock<AccountState>>,
}

impl InMemoryAccountLedger {
    /// Creates a new empty in-memory account ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a user record.
    pub fn put_user(&self, user: User) {
        self.state.write().unwrap().users.insert(user.id, user);
    }

    /// Removes a user record.
    pub fn remove_user(&self, id: UserId) {
        self.state.write().unwrap().users.remove(&id);
    }

    /// Returns a user's current balance, if the user exists.
    pub fn balance_of(&self, id: UserId) -> Option<Money> {
        self.state
            .read()
            .unwrap()
            .users
            .get(&id)
            .map(|u| u.cash_balance)
    }

    /// Configures reads to fail.
    pub fn set_fail_on_read(&self, fail: bool) {
        self.state.write().unwrap().fail_on_read = fail;
    }

    /// Configures writes to fail.
    pub fn set_fail_on_write(&self, fail: bool) {
        self.state.write().unwrap().fail_on_write = fail;
    }

    /// Returns the number of balance writes applied.
    pub fn write_count(&self) -> usize {
        self.state.read().unwrap().write_count
    }
}

#[async_trait]
impl AccountLedger for InMemoryAccountLedger {
    async fn get_user(&self, id: UserId) -> Result<Option<User>> {
        let state = self.state.read().unwrap();
        if state.fail_on_read {
            return Err(LedgerError::Unavailable("users service down".to_string()));
        }
        Ok(state.users.get(&id).cloned())
    }

    async fn set_balance(&self, id: UserId, balance: Money) -> Result<WriteOutcome> {
        let mut state = self.state.write().unwrap();
        if state.fail_on_write {
            return Err(LedgerError::Unavailable("users service down".to_string()));
        }
        match state.users.get_mut(&id) {
            Some(user) => {
                user.cash_balance = balance;
                state.write_count += 1;
                Ok(WriteOutcome::Applied)
            }
            None => Ok(WriteOutcome::Missing),
        }
    }
}

#[derive(Debug, Default)]
struct InventoryState {
    products: HashMap<ProductId, Product>,
    fail_on_read: bool,
    fail_on_write: bool,
    write_count: usize,
}

/// In-memory inventory ledger with failure injection for tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryInventoryLedger {
    state: Arc<RwLock<InventoryState>>,
}

impl InMemoryInventoryLedger {
    /// Creates a new empty in-memory inventory ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a product record.
    pub fn put_product(&self, product: Product) {
        self.state
            .write()
            .unwrap()
            .products
            .insert(product.id, product);
    }

    /// Removes a product record.
    pub fn remove_product(&self, id: ProductId) {
        self.state.write().unwrap().products.remove(&id);
    }

    /// Returns a product's current stock, if the product exists.
    pub fn stock_of(&self, id: ProductId) -> Option<u32> {
        self.state
            .read()
            .unwrap()
            .products
            .get(&id)
            .map(|p| p.stock)
    }

    /// Configures reads to fail.
    pub fn set_fail_on_read(&self, fail: bool) {
        self.state.write().unwrap().fail_on_read = fail;
    }

    /// Configures writes to fail.
    pub fn set_fail_on_write(&self, fail: bool) {
        self.state.write().unwrap().fail_on_write = fail;
    }

    /// Returns the number of stock writes applied.
    pub fn write_count(&self) -> usize {
        self.state.read().unwrap().write_count
    }
}

#[async_trait]
impl InventoryLedger for InMemoryInventoryLedger {
    async fn get_product(&self, id: ProductId) -> Result<Option<Product>> {
        let state = self.state.read().unwrap();
        if state.fail_on_read {
            return Err(LedgerError::Unavailable(
                "products service down".to_string(),
            ));
        }
        Ok(state.products.get(&id).cloned())
    }

    async fn set_stock(&self, id: ProductId, stock: u32) -> Result<WriteOutcome> {
        let mut state = self.state.write().unwrap();
        if state.fail_on_write {
            return Err(LedgerError::Unavailable(
                "products service down".to_string(),
            ));
        }
        match state.products.get_mut(&id) {
            Some(product) => {
                product.stock = stock;
                state.write_count += 1;
                Ok(WriteOutcome::Applied)
            }
            None => Ok(WriteOutcome::Missing),
        }
    }
}
