//! # Observability & Tracing
//!
//! [`setup_tracing`] installs the global `tracing` subscriber used by the binary.
//!
//! ## Configuration
//!
//! Compact format, no module prefix (`with_target(false)`). Verbosity comes from
//! `RUST_LOG`:
//!
//! ```bash
//! # Lifecycle, status changes, rate limits and failures
//! RUST_LOG=info accrual-reconciler -r http://localhost:8081 12345678903
//!
//! # Every admission, poll and oracle answer
//! RUST_LOG=debug accrual-reconciler -r http://localhost:8081 12345678903
//! ```
//!
//! ## What Gets Traced
//!
//! | Level | Events |
//! |---|---|
//! | `info` | worker and sink start/stop, status changes, shutdown summary |
//! | `debug` | admissions, duplicates, each oracle answer, persisted updates |
//! | `warn` | rate limits, transient poll failures, rejected sink writes |
//! | `error` | dead-lettered orders, failed tasks |
//!
//! Each worker runs inside a `worker{id=N}` span and each oracle request inside a
//! `fetch_status{order=...}` span, so lines read like:
//!
//! ```text
//! INFO worker{id=0}: Reconciliation worker started
//! DEBUG worker{id=0}:fetch_status{order=12345678903}: Rate limited by oracle retry_after_secs=60
//! WARN worker{id=0}: Rate limited by accrual system order=12345678903 retry_after_secs=60
//! INFO worker{id=0}: Status changed order=12345678903 status=PROCESSED accrual=Some(Accrual(500))
//! ```
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}
