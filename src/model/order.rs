//! Orders awaiting settlement by the accrual oracle.
//!
//! An [`OrderQueueEntry`] is created by intake with status [`OrderStatus::New`] and is
//! mutated only by the reconciliation worker that owns its shard. Once its status is
//! terminal ([`OrderStatus::Invalid`] or [`OrderStatus::Processed`]) it leaves the
//! working set for good and its final form is published on the resolved queue.

use crate::model::{Accrual, OrderNumber};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::time::Duration;
use tokio::time::Instant;

/// The system's canonical order status vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    New,
    Processing,
    Invalid,
    Processed,
}

impl OrderStatus {
    /// Terminal statuses are never polled again.
    pub fn is_terminal(self) -> bool {
        match self {
            OrderStatus::New | OrderStatus::Processing => false,
            OrderStatus::Invalid | OrderStatus::Processed => true,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::New => "NEW",
            OrderStatus::Processing => "PROCESSING",
            OrderStatus::Invalid => "INVALID",
            OrderStatus::Processed => "PROCESSED",
        }
    }
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The unit of work flowing through the pending and resolved queues.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderQueueEntry {
    pub order_number: OrderNumber,
    pub order_status: OrderStatus,
    /// Failed or inconclusive poll attempts. Only ever increases.
    pub retry_count: u32,
    /// Present if and only if `order_status` is `Processed`.
    pub accrual: Option<Accrual>,
    /// Time of the most recent poll attempt, or of enqueueing if never polled.
    pub last_checked: Instant,
    /// Oracle-imposed quiet period measured from `last_checked`. Zero when unset.
    pub retry_after: Duration,
}

impl OrderQueueEntry {
    /// Creates the entry intake enqueues for a freshly submitted order.
    pub fn new(order_number: OrderNumber) -> Self {
        Self::submitted_at(order_number, Instant::now())
    }

    pub fn submitted_at(order_number: OrderNumber, at: Instant) -> Self {
        Self {
            order_number,
            order_status: OrderStatus::New,
            retry_count: 0,
            accrual: None,
            last_checked: at,
            retry_after: Duration::ZERO,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.order_status.is_terminal()
    }

    /// Moves the entry to `status`, keeping the accrual invariant.
    ///
    /// The accrual is kept only for `Processed`; a processed order reported without
    /// an amount settles at zero.
    pub fn settle(&mut self, status: OrderStatus, accrual: Option<Accrual>) {
        self.order_status = status;
        self.accrual = match status {
            OrderStatus::Processed => Some(accrual.unwrap_or(Accrual::ZERO)),
            OrderStatus::New | OrderStatus::Processing | OrderStatus::Invalid => None,
        };
    }

    /// Records a completed poll at `now` and clears any rate-limit window.
    pub fn mark_checked(&mut self, now: Instant) {
        self.last_checked = now;
        self.retry_after = Duration::ZERO;
    }
}
