//! # Reconciliation Worker
//!
//! One worker owns one pending-queue shard. It is the only task that reads the
//! shard and the only task that mutates the entries it has taken from it.
//!
//! ## Entry lifecycle
//!
//! ```text
//! pending ──admit──► delayed ──due──► in-flight ──┬─► resolved-terminal   (published, forgotten)
//!                       ▲                        ├─► resolved-nonterminal (published if changed)
//!                       └────────────────────────┴─► delayed             (rate limit / transient error)
//! ```
//!
//! The loop waits on three things at once: cancellation, the timer of the earliest
//! delayed entry, and the pending queue. Nothing spins. At most one request is in
//! flight per worker, so an order is never polled twice concurrently.
//!
//! ## Shutdown
//!
//! On cancellation the worker abandons the in-flight request, closes its pending
//! receiver, drains what is left and drops its resolved sender. Everything still
//! unresolved is handed back in the [`WorkerReport`].

use crate::model::{OrderNumber, OrderQueueEntry};
use crate::oracle::{AccrualOracle, OracleError, OracleResponse, Resolution};
use crate::queue::{DeadLetterSender, DelayedSet, PendingReceiver, ResolvedSender};
use crate::reconciler::reconcile;
use crate::retry::{RetryController, RetryVerdict};
use std::collections::HashSet;
use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info, instrument, warn};

/// What a worker did before it stopped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkerReport {
    pub worker_id: usize,
    /// Oracle requests that completed, whatever their outcome.
    pub polls: u64,
    pub published: u64,
    pub rate_limited: u64,
    pub transient_failures: u64,
    pub dead_lettered: u64,
    pub duplicates_dropped: u64,
    /// Entries still unresolved when the worker stopped, unchanged by the
    /// interrupted poll if there was one.
    pub unresolved: Vec<OrderQueueEntry>,
}

enum PollOutcome {
    Completed(Result<OracleResponse, OracleError>),
    Cancelled,
}

pub struct ReconciliationWorker {
    id: usize,
    oracle: Arc<dyn AccrualOracle>,
    retry: RetryController,
    pending: PendingReceiver,
    resolved: ResolvedSender,
    dead_letters: Option<DeadLetterSender>,
    token: CancellationToken,
    delayed: DelayedSet,
    tracked: HashSet<OrderNumber>,
    report: WorkerReport,
}

impl ReconciliationWorker {
    pub fn new(
        id: usize,
        oracle: Arc<dyn AccrualOracle>,
        retry: RetryController,
        pending: PendingReceiver,
        resolved: ResolvedSender,
        token: CancellationToken,
    ) -> Self {
        Self {
            id,
            oracle,
            retry,
            pending,
            resolved,
            dead_letters: None,
            token,
            delayed: DelayedSet::new(),
            tracked: HashSet::new(),
            report: WorkerReport {
                worker_id: id,
                ..WorkerReport::default()
            },
        }
    }

    /// Routes entries that exhaust their attempts to `dead_letters`. Without it they
    /// are only logged.
    pub fn with_dead_letters(mut self, dead_letters: DeadLetterSender) -> Self {
        self.dead_letters = Some(dead_letters);
        self
    }

    /// Spawns the worker onto `tracker`.
    pub fn start(self, tracker: &TaskTracker) -> JoinHandle<WorkerReport> {
        tracker.spawn(self.run())
    }

    /// Runs until cancelled, or until the pending queue is closed and every tracked
    /// order has been resolved or dead-lettered.
    #[instrument(name = "worker", skip(self), fields(id = self.id))]
    pub async fn run(mut self) -> WorkerReport {
        info!("Reconciliation worker started");
        let mut intake_open = true;

        loop {
            if !intake_open && self.delayed.is_empty() {
                debug!("Pending queue closed and nothing left to poll");
                break;
            }

            let next_due = self.delayed.next_due();
            let timer = async move {
                match next_due {
                    Some(due) => sleep_until(due).await,
                    None => std::future::pending().await,
                }
            };

            tokio::select! {
                biased;
                _ = self.token.cancelled() => {
                    info!("Cancellation requested");
                    break;
                }
                _ = timer => {
                    if self.poll_next_due().await.is_break() {
                        break;
                    }
                }
                received = self.pending.recv(), if intake_open => match received {
                    Some(entry) => self.admit(entry),
                    None => intake_open = false,
                },
            }
        }

        self.shutdown()
    }

    fn admit(&mut self, entry: OrderQueueEntry) {
        let order = entry.order_number.clone();
        if entry.is_terminal() {
            warn!(%order, status = %entry.order_status, "Terminal entry on pending queue dropped");
            return;
        }
        if !self.tracked.insert(order.clone()) {
            self.report.duplicates_dropped += 1;
            debug!(%order, "Order already tracked, duplicate dropped");
            return;
        }
        let due = self.retry.admission_at(&entry);
        debug!(%order, tracked = self.tracked.len(), "Order admitted");
        self.delayed.insert(entry, due);
    }

    async fn poll_next_due(&mut self) -> ControlFlow<()> {
        let Some(entry) = self.delayed.pop_due(Instant::now()) else {
            return ControlFlow::Continue(());
        };

        let outcome = tokio::select! {
            biased;
            _ = self.token.cancelled() => PollOutcome::Cancelled,
            response = self.oracle.fetch_status(&entry.order_number) => PollOutcome::Completed(response),
        };

        let now = Instant::now();
        match outcome {
            PollOutcome::Cancelled => {
                debug!(order = %entry.order_number, "In-flight poll abandoned");
                let due = self.retry.next_eligible_at(&entry);
                self.delayed.insert(entry, due);
                return ControlFlow::Break(());
            }
            PollOutcome::Completed(response) => {
                self.report.polls += 1;
                match response {
                    Ok(OracleResponse::Resolved(resolution)) => {
                        self.on_resolved(entry, resolution, now)
                    }
                    Ok(OracleResponse::RateLimited { retry_after }) => {
                        self.on_rate_limited(entry, retry_after, now)
                    }
                    Err(e) => self.on_failure(entry, e, now),
                }
            }
        }
        ControlFlow::Continue(())
    }

    fn on_resolved(
        &mut self,
        entry: OrderQueueEntry,
        resolution: Resolution,
        now: Instant,
    ) {
        let order = entry.order_number.clone();
        debug!(%order, status = ?resolution.status, "Oracle answered");
        let outcome = reconcile(entry, resolution, now);

        if let Some(update) = outcome.update {
            info!(%order, status = %update.order_status, accrual = ?update.accrual, "Status changed");
            if self.resolved.send(update).is_err() {
                error!(%order, "Resolved queue closed, update lost");
            } else {
                self.report.published += 1;
            }
        }

        match outcome.requeue {
            Some(entry) => self.schedule(entry),
            None => {
                self.tracked.remove(&order);
                debug!(%order, "Order resolved");
            }
        }
    }

    fn on_rate_limited(
        &mut self,
        mut entry: OrderQueueEntry,
        retry_after: Duration,
        now: Instant,
    ) {
        self.report.rate_limited += 1;
        warn!(order = %entry.order_number, retry_after_secs = retry_after.as_secs(), "Rate limited by accrual system");
        self.retry.on_rate_limited(&mut entry, retry_after, now);
        self.schedule(entry);
    }

    fn on_failure(&mut self, mut entry: OrderQueueEntry, err: OracleError, now: Instant) {
        if !err.is_transient() {
            entry.mark_checked(now);
            error!(order = %entry.order_number, error = %err, "Poll failed permanently, order dead-lettered");
            self.dead_letter(entry);
            return;
        }

        self.report.transient_failures += 1;
        let verdict = self.retry.on_transient_failure(&mut entry, now);
        warn!(order = %entry.order_number, retry_count = entry.retry_count, error = %err, "Poll failed");

        match verdict {
            RetryVerdict::Retry => self.schedule(entry),
            RetryVerdict::Exhausted => {
                error!(order = %entry.order_number, retry_count = entry.retry_count, "Retry attempts exhausted, order dead-lettered");
                self.dead_letter(entry);
            }
        }
    }

    fn dead_letter(&mut self, entry: OrderQueueEntry) {
        self.tracked.remove(&entry.order_number);
        self.report.dead_lettered += 1;
        if let Some(dead_letters) = &self.dead_letters {
            if dead_letters.send(entry).is_err() {
                error!("Dead-letter queue closed");
            }
        }
    }

    fn schedule(&mut self, entry: OrderQueueEntry) {
        let due = self.retry.next_eligible_at(&entry);
        self.delayed.insert(entry, due);
    }

    fn shutdown(mut self) -> WorkerReport {
        // 1. No more intake
        self.pending.close();

        // 2. Collect everything not yet resolved
        let mut unresolved = self.delayed.drain();
        while let Ok(entry) = self.pending.try_recv() {
            if !entry.is_terminal() && self.tracked.insert(entry.order_number.clone()) {
                unresolved.push(entry);
            }
        }

        // 3. Release our half of the resolved queue
        drop(self.resolved);

        info!(
            polls = self.report.polls,
            published = self.report.published,
            unresolved = unresolved.len(),
            "Reconciliation worker stopped"
        );
        WorkerReport {
            unresolved,
            ..self.report
        }
    }
}
