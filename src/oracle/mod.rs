//! Access to the external accrual oracle.
//!
//! The reconciliation worker only talks to the oracle through the [`AccrualOracle`]
//! trait. Production code uses [`HttpAccrualClient`]; tests use
//! [`mock::MockAccrualOracle`].
//!
//! A single request has exactly three kinds of outcome:
//!
//! - `Ok(OracleResponse::Resolved(..))` - a 200 with a well-formed body
//! - `Ok(OracleResponse::RateLimited { .. })` - a 429, honoring `Retry-After`
//! - `Err(OracleError)` - anything else, treated as transient

pub mod client;
pub mod error;
pub mod mock;
pub mod response;

pub use client::*;
pub use error::*;
pub use response::*;

use crate::model::OrderNumber;
use async_trait::async_trait;
use std::sync::Arc;

/// Asks the accrual oracle about one order.
#[async_trait]
pub trait AccrualOracle: Send + Sync {
    /// Issues exactly one request for `order`.
    async fn fetch_status(&self, order: &OrderNumber) -> Result<OracleResponse, OracleError>;
}

#[async_trait]
impl<T: AccrualOracle + ?Sized> AccrualOracle for Arc<T> {
    async fn fetch_status(&self, order: &OrderNumber) -> Result<OracleResponse, OracleError> {
        (**self).fetch_status(order).await
    }
}
