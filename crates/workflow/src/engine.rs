//! Order workflow engine.

use common::{Money, OrderId, ProductId, UserId};
use ledger::{AccountLedger, InventoryLedger, WriteOutcome};
use order_store::{NewOrder, Order, OrderStore};

use crate::error::{Result, WorkflowError};

/// Forward steps of the order creation sequence, in execution order.
/// Compensations run over the completed prefix in reverse.
const STEP_INSERT_ORDER: &str = "insert_order";
const STEP_DEBIT_BALANCE: &str = "debit_balance";

/// Outcome of a cancellation request.
///
/// Cancelling an already-cancelled order is an idempotent short-circuit,
/// not an error: the refund and restock are not repeated.
#[derive(Debug, Clone, PartialEq)]
pub enum CancelOutcome {
    /// The order was cancelled by this call.
    Cancelled(Order),
    /// The order was already cancelled; returned unchanged.
    AlreadyCancelled(Order),
}

impl CancelOutcome {
    /// Returns the order record regardless of outcome.
    pub fn order(&self) -> &Order {
        match self {
            CancelOutcome::Cancelled(order) | CancelOutcome::AlreadyCancelled(order) => order,
        }
    }

    /// Returns true if this call found the order already cancelled.
    pub fn was_already_cancelled(&self) -> bool {
        matches!(self, CancelOutcome::AlreadyCancelled(_))
    }
}

/// Orchestrates order creation and cancellation across the order store
/// and the two external ledgers.
///
/// The engine is the only writer of the order store. It holds no locks
/// across ledger calls; concurrent creations against the same user or
/// product race on check-then-act, which the guarded ledger writes exist
/// to tighten when the owning services grow version support.
pub struct OrderWorkflow<St, A, I>
where
    St: OrderStore,
    A: AccountLedger,
    I: InventoryLedger,
{
    store: St,
    accounts: A,
    inventory: I,
}

impl<St, A, I> OrderWorkflow<St, A, I>
where
    St: OrderStore,
    A: AccountLedger,
    I: InventoryLedger,
{
    /// Creates a new workflow engine.
    pub fn new(store: St, accounts: A, inventory: I) -> Self {
        Self {
            store,
            accounts,
            inventory,
        }
    }

    /// Returns a reference to the account ledger.
    pub fn accounts(&self) -> &A {
        &self.accounts
    }

    /// Returns a reference to the inventory ledger.
    pub fn inventory(&self) -> &I {
        &self.inventory
    }

    /// Checks that the order store is reachable.
    pub async fn ping(&self) -> Result<()> {
        self.store.ping().await?;
        Ok(())
    }

    /// Retrieves an order by id.
    pub async fn get_order(&self, id: OrderId) -> Result<Option<Order>> {
        Ok(self.store.get(id).await?)
    }

    /// Retrieves all orders, newest first.
    pub async fn list_orders(&self) -> Result<Vec<Order>> {
        Ok(self.store.list().await?)
    }

    /// Creates an order, debiting the user and decrementing stock.
    ///
    /// The three effects either all become visible or none do: a failed
    /// debit rolls back the insert, a failed stock decrement rolls back
    /// the debit and the insert. Business-rule checks happen before the
    /// first mutation. This guarantee does not survive a process crash
    /// mid-sequence; see the crate docs for the unrecoverable window.
    #[tracing::instrument(skip(self))]
    pub async fn create_order(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<Order> {
        metrics::counter!("orders_create_attempts_total").increment(1);
        let start = std::time::Instant::now();

        if quantity == 0 {
            return Err(WorkflowError::InvalidInput(
                "quantity must be greater than zero".to_string(),
            ));
        }

        let user = self
            .accounts
            .get_user(user_id)
            .await
            .map_err(|e| WorkflowError::DependencyFailure(e.to_string()))?
            .ok_or(WorkflowError::UserNotFound(user_id))?;

        let product = self
            .inventory
            .get_product(product_id)
            .await
            .map_err(|e| WorkflowError::DependencyFailure(e.to_string()))?
            .ok_or(WorkflowError::ProductNotFound(product_id))?;

        let total_price = product.price.checked_mul(quantity).ok_or_else(|| {
            WorkflowError::DependencyFailure("total price overflows".to_string())
        })?;

        if user.cash_balance < total_price {
            return Err(WorkflowError::InsufficientFunds {
                balance: user.cash_balance,
                total: total_price,
            });
        }

        if product.stock < quantity {
            return Err(WorkflowError::InsufficientStock {
                available: product.stock,
                requested: quantity,
            });
        }

        // Step 1: insert the order row. Nothing to compensate if this
        // fails.
        let order = self
            .store
            .insert(NewOrder::completed(
                user_id,
                product_id,
                quantity,
                total_price,
            ))
            .await?;
        let mut completed = vec![STEP_INSERT_ORDER];

        // Step 2: debit the balance. The guarded write carries the
        // balance read above as the expected value.
        let debited = user.cash_balance - total_price;
        match self
            .accounts
            .set_balance_guarded(user_id, user.cash_balance, debited)
            .await
        {
            Ok(WriteOutcome::Applied) => completed.push(STEP_DEBIT_BALANCE),
            Ok(WriteOutcome::Missing) => {
                self.roll_back(&completed, &order, user.cash_balance).await;
                return Err(WorkflowError::DependencyFailure(format!(
                    "user {user_id} disappeared before debit"
                )));
            }
            Err(e) => {
                self.roll_back(&completed, &order, user.cash_balance).await;
                return Err(WorkflowError::DependencyFailure(e.to_string()));
            }
        }

        // Step 3: decrement the stock. On failure both earlier effects
        // are undone.
        let remaining = product.stock - quantity;
        match self
            .inventory
            .set_stock_guarded(product_id, product.stock, remaining)
            .await
        {
            Ok(WriteOutcome::Applied) => {}
            Ok(WriteOutcome::Missing) => {
                self.roll_back(&completed, &order, user.cash_balance).await;
                return Err(WorkflowError::DependencyFailure(format!(
                    "product {product_id} disappeared before stock decrement"
                )));
            }
            Err(e) => {
                self.roll_back(&completed, &order, user.cash_balance).await;
                return Err(WorkflowError::DependencyFailure(e.to_string()));
            }
        }

        metrics::counter!("orders_created_total").increment(1);
        metrics::histogram!("order_workflow_duration_seconds")
            .record(start.elapsed().as_secs_f64());
        tracing::info!(order_id = %order.id, %user_id, %product_id, quantity, total = %total_price, "order created");

        Ok(order)
    }

    /// Undoes completed creation steps in reverse order.
    ///
    /// Compensation failures are logged, not surfaced; the caller is
    /// about to receive the original failure.
    async fn roll_back(&self, completed: &[&'static str], order: &Order, prior_balance: Money) {
        metrics::counter!("order_rollbacks_total").increment(1);

        for step in completed.iter().rev() {
            match *step {
                STEP_DEBIT_BALANCE => {
                    match self.accounts.set_balance(order.user_id, prior_balance).await {
                        Ok(WriteOutcome::Applied) => {
                            tracing::info!(order_id = %order.id, step, "compensation applied");
                        }
                        Ok(WriteOutcome::Missing) => {
                            tracing::warn!(order_id = %order.id, step, "user missing during balance restore");
                        }
                        Err(e) => {
                            tracing::error!(order_id = %order.id, step, error = %e, "compensation failed");
                        }
                    }
                }
                STEP_INSERT_ORDER => {
                    if let Err(e) = self.store.delete(order.id).await {
                        tracing::error!(order_id = %order.id, step, error = %e, "compensation failed");
                    } else {
                        tracing::info!(order_id = %order.id, step, "compensation applied");
                    }
                }
                _ => {}
            }
        }
    }

    /// Cancels an order, refunding the user and restocking the product.
    ///
    /// Refund and restock are best-effort: a missing user or product, or
    /// an unreachable ledger, is logged and skipped so the cancellation
    /// itself can still complete.
    #[tracing::instrument(skip(self))]
    pub async fn cancel_order(&self, order_id: OrderId) -> Result<CancelOutcome> {
        let order = self
            .store
            .get(order_id)
            .await?
            .ok_or(WorkflowError::OrderNotFound(order_id))?;

        if order.is_cancelled() {
            tracing::info!(%order_id, "order already cancelled");
            return Ok(CancelOutcome::AlreadyCancelled(order));
        }

        self.refund_balance(&order).await;
        self.restock_product(&order).await;

        let updated = self
            .store
            .mark_cancelled(order_id)
            .await?
            .ok_or(WorkflowError::OrderNotFound(order_id))?;

        metrics::counter!("orders_cancelled_total").increment(1);
        tracing::info!(%order_id, refund = %order.total_price, "order cancelled");

        Ok(CancelOutcome::Cancelled(updated))
    }

    /// Best-effort refund of the order total to the user's balance.
    async fn refund_balance(&self, order: &Order) {
        let user = match self.accounts.get_user(order.user_id).await {
            Ok(Some(user)) => user,
            Ok(None) => {
                tracing::info!(order_id = %order.id, user_id = %order.user_id, "user no longer exists, skipping refund");
                return;
            }
            Err(e) => {
                tracing::warn!(order_id = %order.id, error = %e, "users service unreachable, skipping refund");
                return;
            }
        };

        let Some(refunded) = user.cash_balance.checked_add(order.total_price) else {
            tracing::warn!(order_id = %order.id, "refund overflows balance, skipping");
            return;
        };

        match self.accounts.set_balance(order.user_id, refunded).await {
            Ok(WriteOutcome::Applied) => {}
            Ok(WriteOutcome::Missing) => {
                tracing::info!(order_id = %order.id, user_id = %order.user_id, "user disappeared during refund, skipping");
            }
            Err(e) => {
                tracing::warn!(order_id = %order.id, error = %e, "refund write failed, skipping");
            }
        }
    }

    /// Best-effort restock of the order quantity.
    async fn restock_product(&self, order: &Order) {
        let product = match self.inventory.get_product(order.product_id).await {
            Ok(Some(product)) => product,
            Ok(None) => {
                tracing::info!(order_id = %order.id, product_id = %order.product_id, "product no longer exists, skipping restock");
                return;
            }
            Err(e) => {
                tracing::warn!(order_id = %order.id, error = %e, "products service unreachable, skipping restock");
                return;
            }
        };

        let Some(restocked) = product.stock.checked_add(order.quantity) else {
            tracing::warn!(order_id = %order.id, "restock overflows stock level, skipping");
            return;
        };

        match self.inventory.set_stock(order.product_id, restocked).await {
            Ok(WriteOutcome::Applied) => {}
            Ok(WriteOutcome::Missing) => {
                tracing::info!(order_id = %order.id, product_id = %order.product_id, "product disappeared during restock, skipping");
            }
            Err(e) => {
                tracing::warn!(order_id = %order.id, error = %e, "restock write failed, skipping");
            }
        }
    }
}
