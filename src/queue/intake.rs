use crate::model::{OrderNumber, OrderNumberError, OrderQueueEntry};
use crate::queue::PendingSender;
use thiserror::Error;
use tracing::{debug, instrument};

/// Errors returned to whoever submits orders for reconciliation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IntakeError {
    #[error("Invalid order number: {0}")]
    InvalidOrderNumber(#[from] OrderNumberError),

    /// The owning worker has shut down.
    #[error("Pending queue closed, order {0} not accepted")]
    QueueClosed(String),

    /// Terminal orders are never polled.
    #[error("Order {0} is already in a terminal status")]
    TerminalEntry(String),
}

/// Write side of the pending queues.
///
/// Orders are spread across worker shards by a stable hash of the order number, so
/// every submission of the same order lands on the same worker and at most one
/// poll of it can be in flight.
#[derive(Clone)]
pub struct OrderIntake {
    shards: Vec<PendingSender>,
}

impl OrderIntake {
    pub fn new(shards: Vec<PendingSender>) -> Self {
        Self { shards }
    }

    /// Validates `raw` and enqueues it as a new order.
    #[instrument(skip(self))]
    pub fn submit(&self, raw: &str) -> Result<OrderNumber, IntakeError> {
        let order_number = OrderNumber::parse(raw)?;
        self.enqueue(OrderQueueEntry::new(order_number.clone()))?;
        Ok(order_number)
    }

    /// Enqueues an existing entry, e.g. an unresolved order reloaded from storage.
    pub fn enqueue(&self, entry: OrderQueueEntry) -> Result<(), IntakeError> {
        if entry.is_terminal() {
            return Err(IntakeError::TerminalEntry(entry.order_number.to_string()));
        }
        let order = entry.order_number.to_string();
        let Some(sender) = self.shards.get(shard_for(&entry.order_number, self.shards.len())) else {
            return Err(IntakeError::QueueClosed(order));
        };
        sender
            .send(entry)
            .map_err(|_| IntakeError::QueueClosed(order.clone()))?;
        debug!(%order, "Order enqueued");
        Ok(())
    }
}

/// Index of the shard that owns `order` among `shards` workers (FNV-1a).
pub fn shard_for(order: &OrderNumber, shards: usize) -> usize {
    if shards <= 1 {
        return 0;
    }
    let hash = order
        .as_str()
        .bytes()
        .fold(0xcbf2_9ce4_8422_2325_u64, |hash, b| {
            (hash ^ u64::from(b)).wrapping_mul(0x0000_0100_0000_01b3)
        });
    (hash % shards as u64) as usize
}
