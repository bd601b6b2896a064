//! Maps oracle reports onto the system's order vocabulary and decides what happens
//! to the entry next.
//!
//! | Oracle status | Order status |
//! |---|---|
//! | `REGISTERED` | `NEW` |
//! | `PROCESSING` | `PROCESSING` |
//! | `INVALID` | `INVALID` |
//! | `PROCESSED` | `PROCESSED` |

use crate::model::{OrderQueueEntry, OrderStatus};
use crate::oracle::{AccrualStatus, Resolution};
use tokio::time::Instant;

impl From<AccrualStatus> for OrderStatus {
    fn from(status: AccrualStatus) -> Self {
        match status {
            AccrualStatus::Registered => OrderStatus::New,
            AccrualStatus::Processing => OrderStatus::Processing,
            AccrualStatus::Invalid => OrderStatus::Invalid,
            AccrualStatus::Processed => OrderStatus::Processed,
        }
    }
}

/// Where an entry goes after a successful poll.
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciliation {
    /// Status-update record for the resolved queue, present when the status changed.
    pub update: Option<OrderQueueEntry>,
    /// Entry to keep polling, absent once the order is terminal.
    pub requeue: Option<OrderQueueEntry>,
}

impl Reconciliation {
    pub fn is_final(&self) -> bool {
        self.requeue.is_none()
    }
}

/// Applies a well-formed oracle report to `entry`, polled at `now`.
///
/// A changed status is always published. The entry keeps being polled only while its
/// (possibly new) status is not terminal. `retry_count` is left alone: a successful
/// poll is not a failure.
pub fn reconcile(mut entry: OrderQueueEntry, resolution: Resolution, now: Instant) -> Reconciliation {
    let status = OrderStatus::from(resolution.status);
    entry.mark_checked(now);

    if status == entry.order_status {
        let requeue = (!status.is_terminal()).then_some(entry);
        return Reconciliation {
            update: None,
            requeue,
        };
    }

    entry.settle(status, resolution.accrual);
    let requeue = (!status.is_terminal()).then(|| entry.clone());
    Reconciliation {
        update: Some(entry),
        requeue,
    }
}
