//! Ledger client error types.

use thiserror::Error;

/// Errors that can occur when calling an external ledger service.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The HTTP request failed outright (connection refused, timeout).
    #[error("Ledger request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The service answered with a status the contract does not define.
    #[error("Ledger returned unexpected status {status} for {url}")]
    UnexpectedStatus { status: u16, url: String },

    /// The service is unreachable. Used by test doubles to inject
    /// failures without a real transport underneath.
    #[error("Ledger unavailable: {0}")]
    Unavailable(String),
}

/// Result type for ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;
