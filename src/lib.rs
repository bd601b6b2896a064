//! # Accrual Reconciler
//!
//! > **Keeps loyalty orders in step with the external accrual system.**
//!
//! Orders enter as `NEW`. Background workers poll the accrual system for each one
//! until it reaches a terminal status (`INVALID` or `PROCESSED`), publish every
//! status change to a resolved queue, and a sink consumer persists those changes.
//!
//! ## 🏗️ Design
//!
//! ### Workers own their orders
//! Intake shards orders across workers by order number. A worker is the only task
//! that reads its shard and the only one that mutates the entries it holds, so there
//! are no locks on the hot path and never two concurrent polls of one order.
//!
//! ### Waiting without spinning
//! Entries that are not yet due sit in a worker-local delayed set. The worker sleeps
//! until the earliest deadline, a new arrival, or cancellation, whichever comes first.
//!
//! ### Failures stay local
//! Rate limits and transient errors only move an entry's next deadline. Nothing a
//! poll does is reported back to whoever submitted the order.
//!
//! ## 🗺️ Module Tour
//!
//! ### 1. Data ([`model`])
//! - **Key items**: [`OrderNumber`](model::OrderNumber), [`OrderStatus`](model::OrderStatus),
//!   [`OrderQueueEntry`](model::OrderQueueEntry), [`Accrual`](model::Accrual).
//!
//! ### 2. The Oracle ([`oracle`])
//! - **Role**: One request per call to the accrual system, classified into resolved,
//!   rate-limited or transient failure.
//! - **Key items**: [`AccrualOracle`](oracle::AccrualOracle),
//!   [`HttpAccrualClient`](oracle::HttpAccrualClient), [`oracle::mock`].
//!
//! ### 3. Decisions ([`retry`], [`reconciler`])
//! - **Role**: Pure functions of an entry, an outcome and the current instant.
//! - **Key items**: [`RetryController`](retry::RetryController), [`reconcile`](reconciler::reconcile).
//!
//! ### 4. Plumbing ([`queue`], [`worker`], [`sink`])
//! - **Key items**: [`OrderIntake`](queue::OrderIntake),
//!   [`ReconciliationWorker`](worker::ReconciliationWorker),
//!   [`ResolutionSink`](sink::ResolutionSink).
//!
//! ### 5. The Orchestrator ([`lifecycle`])
//! - **Role**: Settings, tracing, and [`ReconcilerSystem`](lifecycle::ReconcilerSystem),
//!   which starts everything on a shared `TaskTracker` and shuts it down cleanly.
//!
//! ## 🚀 Quick Start
//!
//! ```bash
//! RUST_LOG=info cargo run -- -r http://localhost:8081 12345678903 9278923470
//! ```

pub mod lifecycle;
pub mod model;
pub mod oracle;
pub mod queue;
pub mod reconciler;
pub mod retry;
pub mod sink;
pub mod worker;
