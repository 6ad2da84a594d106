//! HTTP/JSON ledger clients over reqwest.
//!
//! Both services expose the same shape of contract: `GET /api/...` for
//! reads (404 means missing) and `PUT /api/...` for full-replace writes.
//! The write path first re-reads the resource because the PUT body must
//! carry every field, not just the one being changed.

use std::time::Duration;

use async_trait::async_trait;
use common::{Money, ProductId, UserId};
use reqwest::StatusCode;

use crate::WriteOutcome;
use crate::account::{AccountLedger, User};
use crate::error::{LedgerError, Result};
use crate::inventory::{InventoryLedger, Product};

/// Connection settings shared by the HTTP ledger clients.
#[derive(Debug, Clone)]
pub struct HttpLedgerConfig {
    /// Base URL of the owning service, e.g. `http://users-service:5000`.
    pub base_url: String,
    /// Timeout for read calls.
    pub read_timeout: Duration,
    /// Timeout for writes on the order-creation path.
    pub write_timeout: Duration,
}

impl HttpLedgerConfig {
    /// Creates a config with the default 5s read / 10s write timeouts.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            read_timeout: Duration::from_secs(5),
            write_timeout: Duration::from_secs(10),
        }
    }
}

/// Account ledger backed by the users service HTTP API.
#[derive(Debug, Clone)]
pub struct HttpAccountLedger {
    client: reqwest::Client,
    config: HttpLedgerConfig,
}

impl HttpAccountLedger {
    /// Creates a client for the users service at the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_config(HttpLedgerConfig::new(base_url))
    }

    /// Creates a client with explicit timeouts.
    pub fn with_config(config: HttpLedgerConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    fn user_url(&self, id: UserId) -> String {
        format!("{}/api/users/{}", self.config.base_url, id)
    }
}

#[async_trait]
impl AccountLedger for HttpAccountLedger {
    async fn get_user(&self, id: UserId) -> Result<Option<User>> {
        let url = self.user_url(id);
        let response = self
            .client
            .get(&url)
            .timeout(self.config.read_timeout)
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => Ok(Some(response.json().await?)),
            StatusCode::NOT_FOUND => Ok(None),
            status => {
                tracing::warn!(%url, %status, "users service returned unexpected status");
                Err(LedgerError::UnexpectedStatus {
                    status: status.as_u16(),
                    url,
                })
            }
        }
    }

    async fn set_balance(&self, id: UserId, balance: Money) -> Result<WriteOutcome> {
        // PUT is a full replace, so the current name/email must be read
        // back first.
        let Some(user) = self.get_user(id).await? else {
            return Ok(WriteOutcome::Missing);
        };

        let url = self.user_url(id);
        let body = serde_json::json!({
            "name": user.name,
            "email": user.email,
            "cash_balance": balance,
        });

        let response = self
            .client
            .put(&url)
            .timeout(self.config.write_timeout)
            .json(&body)
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => Ok(WriteOutcome::Applied),
            StatusCode::NOT_FOUND => Ok(WriteOutcome::Missing),
            status => {
                tracing::warn!(%url, %status, "users service rejected balance write");
                Err(LedgerError::UnexpectedStatus {
                    status: status.as_u16(),
                    url,
                })
            }
        }
    }
}

/// Inventory ledger backed by the products service HTTP API.
#[derive(Debug, Clone)]
pub struct HttpInventoryLedger {
    client: reqwest::Client,
    config: HttpLedgerConfig,
}

impl HttpInventoryLedger {
    /// Creates a client for the products service at the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_config(HttpLedgerConfig::new(base_url))
    }

    /// Creates a client with explicit timeouts.
    pub fn with_config(config: HttpLedgerConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    fn product_url(&self, id: ProductId) -> String {
        format!("{}/api/products/{}", self.config.base_url, id)
    }
}

#[async_trait]
impl InventoryLedger for HttpInventoryLedger {
    async fn get_product(&self, id: ProductId) -> Result<Option<Product>> {
        let url = self.product_url(id);
        let response = self
            .client
            .get(&url)
            .timeout(self.config.read_timeout)
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => Ok(Some(response.json().await?)),
            StatusCode::NOT_FOUND => Ok(None),
            status => {
                tracing::warn!(%url, %status, "products service returned unexpected status");
                Err(LedgerError::UnexpectedStatus {
                    status: status.as_u16(),
                    url,
                })
            }
        }
    }

    async fn set_stock(&self, id: ProductId, stock: u32) -> Result<WriteOutcome> {
        let Some(product) = self.get_product(id).await? else {
            return Ok(WriteOutcome::Missing);
        };

        let url = self.product_url(id);
        let body = serde_json::json!({
            "name": product.name,
            "description": product.description,
            "price": product.price,
            "stock": stock,
            "category": product.category,
            "image_url": product.image_url,
        });

        let response = self
            .client
            .put(&url)
            .timeout(self.config.write_timeout)
            .json(&body)
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => Ok(WriteOutcome::Applied),
            StatusCode::NOT_FOUND => Ok(WriteOutcome::Missing),
            status => {
                tracing::warn!(%url, %status, "products service rejected stock write");
                Err(LedgerError::UnexpectedStatus {
                    status: status.as_u16(),
                    url,
                })
            }
        }
    }
}
