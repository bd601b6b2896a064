//! Error types for the data model.

use thiserror::Error;

/// Reasons an order number is rejected at intake.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OrderNumberError {
    /// The number was empty after trimming.
    #[error("Order number is empty")]
    Empty,

    /// The number contained something other than ASCII digits.
    #[error("Order number must contain only digits: {0}")]
    NotNumeric(String),

    /// The number failed the Luhn checksum.
    #[error("Order number failed checksum: {0}")]
    Checksum(String),
}

/// Reasons an accrual amount is rejected.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AccrualError {
    #[error("Accrual must not be negative: {0}")]
    Negative(String),

    #[error("Accrual is not a finite number")]
    NotFinite,

    /// Finite, but beyond what a `Decimal` can hold.
    #[error("Accrual is out of range: {0}")]
    OutOfRange(String),
}
