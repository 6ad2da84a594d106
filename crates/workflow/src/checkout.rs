//! Checkout orchestrator: per-line fan-out over the workflow engine.

use std::collections::BTreeMap;

use common::{Money, OrderId, ProductId, UserId};
use ledger::{AccountLedger, InventoryLedger, Product};
use order_store::OrderStore;
use serde::Serialize;

use crate::engine::OrderWorkflow;
use crate::error::{Result, WorkflowError};

/// A cart is an explicit value supplied by the caller: product id to
/// requested quantity. The core holds no session state.
pub type Cart = BTreeMap<ProductId, u32>;

/// A successfully placed line item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineResult {
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: u32,
    pub line_total: Money,
}

/// A line item that could not be placed, with a human-readable reason.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineFailure {
    pub product_id: ProductId,
    pub reason: String,
}

/// Aggregated checkout outcome. The checkout call itself succeeds
/// structurally even when every line failed; callers must inspect the
/// failure list.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CheckoutReport {
    pub successful: Vec<LineResult>,
    pub failed: Vec<LineFailure>,
}

/// A cart line priced against the current catalog.
struct PricedLine {
    product_id: ProductId,
    quantity: u32,
    product: Product,
}

impl<St, A, I> OrderWorkflow<St, A, I>
where
    St: OrderStore,
    A: AccountLedger,
    I: InventoryLedger,
{
    /// Places one order per cart line, independently.
    ///
    /// An upfront advisory check rejects the whole checkout with
    /// `InsufficientFunds` when the balance cannot cover the aggregate
    /// total at current prices; in that case no order is placed. Past
    /// that gate, each line re-validates balance and stock on its own
    /// (the aggregate figure can be stale by then), and one line's
    /// failure never rolls back a sibling that already committed.
    #[tracing::instrument(skip(self, cart), fields(lines = cart.len()))]
    pub async fn checkout(&self, user_id: UserId, cart: &Cart) -> Result<CheckoutReport> {
        if cart.is_empty() {
            return Err(WorkflowError::InvalidInput("cart is empty".to_string()));
        }

        let mut priced: Vec<PricedLine> = Vec::new();
        let mut failed: Vec<LineFailure> = Vec::new();
        let mut total = Money::zero();

        // Price every line against the current catalog. Lines that
        // cannot be priced fail here and are excluded from the
        // aggregate.
        for (&product_id, &quantity) in cart {
            if quantity == 0 {
                failed.push(LineFailure {
                    product_id,
                    reason: "quantity must be greater than zero".to_string(),
                });
                continue;
            }

            match self.inventory().get_product(product_id).await {
                Ok(Some(product)) => match product.price.checked_mul(quantity) {
                    Some(line_total) => {
                        total = total.checked_add(line_total).ok_or_else(|| {
                            WorkflowError::DependencyFailure("cart total overflows".to_string())
                        })?;
                        priced.push(PricedLine {
                            product_id,
                            quantity,
                            product,
                        });
                    }
                    None => failed.push(LineFailure {
                        product_id,
                        reason: "line total overflows".to_string(),
                    }),
                },
                Ok(None) => failed.push(LineFailure {
                    product_id,
                    reason: format!("Product {product_id} not found"),
                }),
                Err(e) => failed.push(LineFailure {
                    product_id,
                    reason: e.to_string(),
                }),
            }
        }

        let user = self
            .accounts()
            .get_user(user_id)
            .await
            .map_err(|e| WorkflowError::DependencyFailure(e.to_string()))?
            .ok_or(WorkflowError::UserNotFound(user_id))?;

        if user.cash_balance < total {
            return Err(WorkflowError::InsufficientFunds {
                balance: user.cash_balance,
                total,
            });
        }

        let mut successful: Vec<LineResult> = Vec::new();
        for line in priced {
            match self
                .create_order(user_id, line.product_id, line.quantity)
                .await
            {
                Ok(order) => successful.push(LineResult {
                    order_id: order.id,
                    product_id: line.product_id,
                    product_name: line.product.name.clone(),
                    quantity: line.quantity,
                    line_total: order.total_price,
                }),
                // The product resolved during pricing, so the reason
                // can carry its name.
                Err(e) => failed.push(LineFailure {
                    product_id: line.product_id,
                    reason: format!("{}: {}", line.product.name, e),
                }),
            }
        }

        metrics::counter!("checkout_lines_placed_total").increment(successful.len() as u64);
        metrics::counter!("checkout_lines_failed_total").increment(failed.len() as u64);
        tracing::info!(
            %user_id,
            placed = successful.len(),
            failed = failed.len(),
            "checkout finished"
        );

        Ok(CheckoutReport { successful, failed })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledger::{InMemoryAccountLedger, InMemoryInventoryLedger, User};
    use order_store::InMemoryOrderStore;

    fn setup() -> (
        OrderWorkflow<InMemoryOrderStore, InMemoryAccountLedger, InMemoryInventoryLedger>,
        InMemoryOrderStore,
        InMemoryAccountLedger,
        InMemoryInventoryLedger,
    ) {
        let store = InMemoryOrderStore::new();
        let accounts = InMemoryAccountLedger::new();
        let inventory = InMemoryInventoryLedger::new();
        let workflow = OrderWorkflow::new(store.clone(), accounts.clone(), inventory.clone());
        (workflow, store, accounts, inventory)
    }

    fn seed_user(accounts: &InMemoryAccountLedger, id: i64, cents: i64) {
        accounts.put_user(User {
            id: UserId::new(id),
            name: format!("User {id}"),
            email: format!("user{id}@example.com"),
            cash_balance: Money::from_cents(cents),
        });
    }

    fn seed_product(inventory: &InMemoryInventoryLedger, id: i64, price_cents: i64, stock: u32) {
        inventory.put_product(Product {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            description: String::new(),
            price: Money::from_cents(price_cents),
            stock,
            category: String::new(),
            image_url: String::new(),
        });
    }

    fn cart(lines: &[(i64, u32)]) -> Cart {
        lines
            .iter()
            .map(|&(id, qty)| (ProductId::new(id), qty))
            .collect()
    }

    #[tokio::test]
    async fn test_checkout_all_lines_succeed() {
        let (workflow, store, accounts, inventory) = setup();
        seed_user(&accounts, 1, 20000);
        seed_product(&inventory, 1, 3000, 5);
        seed_product(&inventory, 2, 2500, 4);

        let report = workflow
            .checkout(UserId::new(1), &cart(&[(1, 2), (2, 1)]))
            .await
            .unwrap();

        assert_eq!(report.successful.len(), 2);
        assert!(report.failed.is_empty());
        assert_eq!(store.order_count().await, 2);
        // 2 * $30 + 1 * $25 debited
        assert_eq!(
            accounts.balance_of(UserId::new(1)),
            Some(Money::from_cents(20000 - 8500))
        );
    }

    #[tokio::test]
    async fn test_checkout_partial_failure_keeps_siblings() {
        let (workflow, store, accounts, inventory) = setup();
        seed_user(&accounts, 1, 20000);
        seed_product(&inventory, 1, 3000, 5);
        seed_product(&inventory, 2, 2500, 0); // out of stock

        let report = workflow
            .checkout(UserId::new(1), &cart(&[(1, 2), (2, 1)]))
            .await
            .unwrap();

        assert_eq!(report.successful.len(), 1);
        assert_eq!(report.failed.len(), 1);
        // The line priced, so the reason names the product.
        assert!(report.failed[0].reason.starts_with("Product 2: "));
        assert!(report.failed[0].reason.contains("Insufficient stock"));
        // The committed sibling is not rolled back.
        assert_eq!(store.order_count().await, 1);
        assert_eq!(inventory.stock_of(ProductId::new(1)), Some(3));
    }

    #[tokio::test]
    async fn test_checkout_missing_product_becomes_failed_line() {
        let (workflow, _, accounts, inventory) = setup();
        seed_user(&accounts, 1, 20000);
        seed_product(&inventory, 1, 3000, 5);

        let report = workflow
            .checkout(UserId::new(1), &cart(&[(1, 1), (99, 1)]))
            .await
            .unwrap();

        assert_eq!(report.successful.len(), 1);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].product_id, ProductId::new(99));
        assert!(report.failed[0].reason.contains("not found"));
    }

    #[tokio::test]
    async fn test_checkout_aggregate_insufficient_funds_places_nothing() {
        let (workflow, store, accounts, inventory) = setup();
        seed_user(&accounts, 1, 5000);
        seed_product(&inventory, 1, 3000, 5);
        seed_product(&inventory, 2, 2500, 4);

        let result = workflow
            .checkout(UserId::new(1), &cart(&[(1, 1), (2, 1)]))
            .await;

        assert!(matches!(result, Err(WorkflowError::InsufficientFunds { .. })));
        // Zero orders placed, zero ledger writes issued.
        assert_eq!(store.order_count().await, 0);
        assert_eq!(accounts.write_count(), 0);
        assert_eq!(inventory.write_count(), 0);
    }

    #[tokio::test]
    async fn test_checkout_unknown_user_rejected() {
        let (workflow, _, _, inventory) = setup();
        seed_product(&inventory, 1, 3000, 5);

        let result = workflow.checkout(UserId::new(9), &cart(&[(1, 1)])).await;
        assert!(matches!(result, Err(WorkflowError::UserNotFound(_))));
    }

    #[tokio::test]
    async fn test_checkout_empty_cart_rejected() {
        let (workflow, _, accounts, _) = setup();
        seed_user(&accounts, 1, 5000);

        let result = workflow.checkout(UserId::new(1), &Cart::new()).await;
        assert!(matches!(result, Err(WorkflowError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_checkout_line_split_counts() {
        // N = 4 lines, M = 2 failing: expect 2 successful, 2 failed.
        let (workflow, _, accounts, inventory) = setup();
        seed_user(&accounts, 1, 100_000);
        seed_product(&inventory, 1, 1000, 10);
        seed_product(&inventory, 2, 1000, 0); // out of stock
        seed_product(&inventory, 3, 1000, 10);
        // product 4 unseeded: not found

        let report = workflow
            .checkout(UserId::new(1), &cart(&[(1, 1), (2, 1), (3, 2), (4, 1)]))
            .await
            .unwrap();

        assert_eq!(report.successful.len(), 2);
        assert_eq!(report.failed.len(), 2);
    }
}
