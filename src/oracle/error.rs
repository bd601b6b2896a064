//! Error types for the accrual oracle client.

use thiserror::Error;

/// Errors produced while asking the accrual oracle for an order's status.
///
/// Everything except [`OracleError::Initialization`] is transient: the reconciliation
/// worker counts it against the order's retry budget and polls again later. A
/// non-transient error sends the order straight to the dead-letter queue.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OracleError {
    /// The HTTP client could not be built.
    #[error("Oracle client initialization failed: {0}")]
    Initialization(String),

    /// Connection, timeout or body read failure.
    #[error("Oracle transport error: {0}")]
    Transport(String),

    /// A status code other than 200 or 429.
    #[error("Oracle returned unexpected status {0}")]
    UnexpectedStatus(u16),

    /// A 200 response whose body could not be understood.
    #[error("Oracle returned malformed body: {0}")]
    MalformedBody(String),

    /// A 200 response describing a different order than the one requested.
    #[error("Oracle answered for order {returned} when asked about {requested}")]
    OrderMismatch { requested: String, returned: String },
}

impl OracleError {
    pub fn is_transient(&self) -> bool {
        !matches!(self, OracleError::Initialization(_))
    }
}
