//! Pure data structures flowing through the reconciliation pipeline.
//!
//! - [`OrderNumber`] - validated order identifier assigned by intake
//! - [`OrderStatus`] - the system's canonical status vocabulary
//! - [`Accrual`] - non-negative loyalty amount settled for an order
//! - [`OrderQueueEntry`] - the unit of work carried by the pending and resolved queues

pub mod accrual;
pub mod error;
pub mod order;
pub mod order_number;

pub use accrual::*;
pub use error::*;
pub use order::*;
pub use order_number::*;
