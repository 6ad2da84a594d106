use std::time::Duration;

use async_trait::async_trait;
use common::{Money, OrderId, ProductId, UserId};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};

use crate::error::{Result, StoreError};
use crate::order::{NewOrder, Order, OrderStatus};
use crate::store::OrderStore;

/// Connection attempts made at startup before giving up.
const CONNECT_ATTEMPTS: u32 = 5;

/// Fixed delay between connection attempts.
const CONNECT_RETRY_DELAY: Duration = Duration::from_secs(2);

/// PostgreSQL-backed order store implementation.
///
/// `total_price` is stored as NUMERIC(10,2) and converted to the
/// cents-based [`Money`] at this boundary.
#[derive(Clone)]
pub struct PostgresOrderStore {
    pool: PgPool,
}

impl PostgresOrderStore {
    /// Creates a new PostgreSQL order store from an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects to the database, retrying a fixed number of times with
    /// a fixed delay. Only this startup path retries; workflow calls
    /// fail immediately.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let mut attempt = 1;
        loop {
            match PgPoolOptions::new()
                .max_connections(5)
                .connect(database_url)
                .await
            {
                Ok(pool) => return Ok(Self { pool }),
                Err(e) if attempt < CONNECT_ATTEMPTS => {
                    tracing::warn!(attempt, error = %e, "database connection failed, retrying");
                    tokio::time::sleep(CONNECT_RETRY_DELAY).await;
                    attempt += 1;
                }
                Err(e) => return Err(StoreError::Database(e)),
            }
        }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }

    fn row_to_order(row: PgRow) -> Result<Order> {
        let status_str: String = row.try_get("status")?;
        let status: OrderStatus = status_str
            .parse()
            .map_err(StoreError::UnknownStatus)?;

        let total: Decimal = row.try_get("total_price")?;
        let cents = (total * Decimal::from(100))
            .to_i64()
            .ok_or_else(|| StoreError::PriceOutOfRange(total.to_string()))?;

        Ok(Order {
            id: OrderId::new(row.try_get("id")?),
            user_id: UserId::new(row.try_get("user_id")?),
            product_id: ProductId::new(row.try_get("product_id")?),
            quantity: row.try_get::<i32, _>("quantity")? as u32,
            total_price: Money::from_cents(cents),
            status,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn money_to_decimal(money: Money) -> Decimal {
        Decimal::new(money.cents(), 2)
    }
}

#[async_trait]
impl OrderStore for PostgresOrderStore {
    async fn insert(&self, new_order: NewOrder) -> Result<Order> {
        let row = sqlx::query(
            r#"
            INSERT INTO orders (user_id, product_id, quantity, total_price, status)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, product_id, quantity, total_price, status, created_at, updated_at
            "#,
        )
        .bind(new_order.user_id.as_i64())
        .bind(new_order.product_id.as_i64())
        .bind(new_order.quantity as i32)
        .bind(Self::money_to_decimal(new_order.total_price))
        .bind(new_order.status.as_str())
        .fetch_one(&self.pool)
        .await?;

        Self::row_to_order(row)
    }

    async fn get(&self, id: OrderId) -> Result<Option<Order>> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, product_id, quantity, total_price, status, created_at, updated_at
            FROM orders WHERE id = $1
            "#,
        )
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_order).transpose()
    }

    async fn list(&self) -> Result<Vec<Order>> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, product_id, quantity, total_price, status, created_at, updated_at
            FROM orders ORDER BY created_at DESC, id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_order).collect()
    }

    async fn delete(&self, id: OrderId) -> Result<()> {
        sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(id.as_i64())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn mark_cancelled(&self, id: OrderId) -> Result<Option<Order>> {
        let row = sqlx::query(
            r#"
            UPDATE orders SET status = 'cancelled', updated_at = now()
            WHERE id = $1
            RETURNING id, user_id, product_id, quantity, total_price, status, created_at, updated_at
            "#,
        )
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_order).transpose()
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_to_decimal_two_places() {
        assert_eq!(
            PostgresOrderStore::money_to_decimal(Money::from_cents(6000)).to_string(),
            "60.00"
        );
        assert_eq!(
            PostgresOrderStore::money_to_decimal(Money::from_cents(5)).to_string(),
            "0.05"
        );
    }
}
