//! The queues connecting intake, the reconciliation workers and the persistence sink.
//!
//! - **Pending queue** - unbounded, one per worker shard. Intake writes through
//!   [`OrderIntake`]; the owning worker is the only reader.
//! - **Resolved queue** - unbounded, shared by all workers. Closes once every worker
//!   has dropped its sender.
//! - **Dead-letter queue** - unbounded, shared by all workers. Receives entries
//!   that ran out of attempts.
//! - **Delayed set** - worker-local, holds entries that are not yet eligible
//!   for polling. See [`DelayedSet`].

pub mod delayed;
pub mod intake;

pub use delayed::*;
pub use intake::*;

use crate::model::OrderQueueEntry;
use tokio::sync::mpsc;

pub type PendingSender = mpsc::UnboundedSender<OrderQueueEntry>;
pub type PendingReceiver = mpsc::UnboundedReceiver<OrderQueueEntry>;
pub type ResolvedSender = mpsc::UnboundedSender<OrderQueueEntry>;
pub type ResolvedReceiver = mpsc::UnboundedReceiver<OrderQueueEntry>;
pub type DeadLetterSender = mpsc::UnboundedSender<OrderQueueEntry>;
pub type DeadLetterReceiver = mpsc::UnboundedReceiver<OrderQueueEntry>;

pub fn pending_queue() -> (PendingSender, PendingReceiver) {
    mpsc::unbounded_channel()
}

pub fn resolved_queue() -> (ResolvedSender, ResolvedReceiver) {
    mpsc::unbounded_channel()
}

pub fn dead_letter_queue() -> (DeadLetterSender, DeadLetterReceiver) {
    mpsc::unbounded_channel()
}
