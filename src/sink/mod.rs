//! Persistence side of the resolved queue.
//!
//! [`ResolutionSink`] is the port a storage backend implements; [`InMemoryLedger`]
//! is the implementation used by the binary and the tests. [`spawn_sink_consumer`]
//! drains the resolved queue into a sink until every worker has let go of it.

pub mod in_memory;

pub use in_memory::InMemoryLedger;

use crate::model::{Accrual, OrderNumber, OrderQueueEntry, OrderStatus};
use crate::queue::ResolvedReceiver;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinHandle;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SinkError {
    #[error("Storage failure: {0}")]
    Storage(String),

    #[error("Order {order} is already {stored}, refusing to move it back to {incoming}")]
    TerminalDowngrade {
        order: String,
        stored: OrderStatus,
        incoming: OrderStatus,
    },
}

/// The persisted view of an order: what the rest of the system reads back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub number: OrderNumber,
    pub status: OrderStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accrual: Option<Accrual>,
}

impl From<&OrderQueueEntry> for OrderRecord {
    fn from(entry: &OrderQueueEntry) -> Self {
        Self {
            number: entry.order_number.clone(),
            status: entry.order_status,
            accrual: entry.accrual,
        }
    }
}

#[async_trait]
pub trait ResolutionSink: Send + Sync {
    /// Stores the latest known state of an order.
    async fn upsert(&self, record: OrderRecord) -> Result<(), SinkError>;
    async fn get(&self, number: &OrderNumber) -> Result<Option<OrderRecord>, SinkError>;
    async fn all(&self) -> Result<Vec<OrderRecord>, SinkError>;
}

/// Counters kept by the sink consumer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SinkReport {
    pub applied: u64,
    pub rejected: u64,
}

/// Spawns a task onto `tracker` that writes every resolved update into `sink`.
///
/// The task ends when the resolved queue closes, i.e. after the last worker has
/// dropped its sender. Rejected writes are logged and counted, never retried.
pub fn spawn_sink_consumer(
    mut resolved: ResolvedReceiver,
    sink: Arc<dyn ResolutionSink>,
    tracker: &TaskTracker,
) -> JoinHandle<SinkReport> {
    tracker.spawn(async move {
        info!("Sink consumer started");
        let mut report = SinkReport::default();

        while let Some(entry) = resolved.recv().await {
            let record = OrderRecord::from(&entry);
            debug!(order = %record.number, status = %record.status, "Persisting update");
            match sink.upsert(record).await {
                Ok(()) => report.applied += 1,
                Err(e) => {
                    report.rejected += 1;
                    warn!(order = %entry.order_number, error = %e, "Update rejected by sink");
                }
            }
        }

        info!(applied = report.applied, rejected = report.rejected, "Sink consumer stopped");
        report
    })
}
