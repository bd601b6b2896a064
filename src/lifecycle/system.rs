use crate::lifecycle::LifecycleError;
use crate::model::OrderQueueEntry;
use crate::oracle::AccrualOracle;
use crate::queue::{
    dead_letter_queue, pending_queue, resolved_queue, DeadLetterReceiver, OrderIntake,
};
use crate::retry::{RetryController, RetryPolicy};
use crate::sink::{spawn_sink_consumer, ResolutionSink, SinkReport};
use crate::worker::{ReconciliationWorker, WorkerReport};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{error, info};

/// Runs the reconciliation pipeline: N workers feeding one sink consumer.
///
/// `ReconcilerSystem` is responsible for:
/// - **Wiring**: one pending queue per worker, a shared resolved queue into the
///   sink, a shared dead-letter queue.
/// - **Lifecycle**: spawning every task on the caller's [`TaskTracker`] and stopping
///   them through the caller's [`CancellationToken`].
///
/// # Example
///
/// ```ignore
/// let system = ReconcilerSystem::start(policy, 2, oracle, sink, token.clone(), &tracker);
/// system.intake.submit("12345678903")?;
/// // ...
/// let report = system.shutdown().await?;
/// ```
pub struct ReconcilerSystem {
    /// Entry point for new orders. Clone it freely.
    pub intake: OrderIntake,
    dead_letters: Option<DeadLetterReceiver>,
    token: CancellationToken,
    tracker: TaskTracker,
    workers: Vec<JoinHandle<WorkerReport>>,
    sink: JoinHandle<SinkReport>,
}

/// Everything the system reports once it has stopped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShutdownReport {
    pub workers: Vec<WorkerReport>,
    pub sink: SinkReport,
}

impl ShutdownReport {
    /// Orders that were still being reconciled when the system stopped.
    pub fn unresolved(&self) -> impl Iterator<Item = &OrderQueueEntry> {
        self.workers.iter().flat_map(|w| w.unresolved.iter())
    }

    pub fn polls(&self) -> u64 {
        self.workers.iter().map(|w| w.polls).sum()
    }

    pub fn published(&self) -> u64 {
        self.workers.iter().map(|w| w.published).sum()
    }
}

impl ReconcilerSystem {
    /// Spawns `workers` reconciliation workers and the sink consumer onto `tracker`.
    ///
    /// `workers` is clamped to at least one.
    pub fn start(
        policy: RetryPolicy,
        workers: usize,
        oracle: Arc<dyn AccrualOracle>,
        sink: Arc<dyn ResolutionSink>,
        token: CancellationToken,
        tracker: &TaskTracker,
    ) -> Self {
        let worker_count = workers.max(1);
        let retry = RetryController::new(policy);

        // 1. Shared output queues
        let (resolved_tx, resolved_rx) = resolved_queue();
        let (dead_tx, dead_rx) = dead_letter_queue();

        // 2. One pending shard per worker
        let mut shards = Vec::with_capacity(worker_count);
        let mut handles = Vec::with_capacity(worker_count);
        for id in 0..worker_count {
            let (pending_tx, pending_rx) = pending_queue();
            shards.push(pending_tx);
            let worker = ReconciliationWorker::new(
                id,
                Arc::clone(&oracle),
                retry,
                pending_rx,
                resolved_tx.clone(),
                token.child_token(),
            )
            .with_dead_letters(dead_tx.clone());
            handles.push(worker.start(tracker));
        }

        // 3. Only workers hold resolved senders from here on
        drop(resolved_tx);
        drop(dead_tx);
        let sink = spawn_sink_consumer(resolved_rx, sink, tracker);

        info!(
            workers = worker_count,
            poll_interval_secs = policy.poll_interval.as_secs(),
            max_attempts = ?policy.max_attempts,
            "Reconciler started"
        );
        Self {
            intake: OrderIntake::new(shards),
            dead_letters: Some(dead_rx),
            token,
            tracker: tracker.clone(),
            workers: handles,
            sink,
        }
    }

    /// Hands out the dead-letter queue. Returns `None` after the first call.
    pub fn take_dead_letters(&mut self) -> Option<DeadLetterReceiver> {
        self.dead_letters.take()
    }

    /// Stops every task and collects their reports.
    ///
    /// 1. Cancels the token: workers abandon in-flight requests and close their
    ///    pending queues
    /// 2. Waits for each worker; the resolved queue closes after the last one
    /// 3. Waits for the sink consumer to persist what was already published
    pub async fn shutdown(self) -> Result<ShutdownReport, LifecycleError> {
        info!("Shutting down reconciler...");
        self.token.cancel();
        self.tracker.close();

        let mut workers = Vec::with_capacity(self.workers.len());
        for (worker, handle) in self.workers.into_iter().enumerate() {
            match handle.await {
                Ok(report) => workers.push(report),
                Err(source) => {
                    error!(worker, error = %source, "Worker task failed");
                    return Err(LifecycleError::WorkerFailed { worker, source });
                }
            }
        }

        let sink = self.sink.await.map_err(|e| {
            error!(error = %e, "Sink consumer task failed");
            LifecycleError::SinkFailed(e)
        })?;
        self.tracker.wait().await;

        let report = ShutdownReport { workers, sink };
        info!(
            polls = report.polls(),
            published = report.published(),
            persisted = report.sink.applied,
            unresolved = report.unresolved().count(),
            "Reconciler shutdown complete"
        );
        Ok(report)
    }
}
