use thiserror::Error;

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("Reconciliation worker {worker} failed: {source}")]
    WorkerFailed {
        worker: usize,
        #[source]
        source: tokio::task::JoinError,
    },

    #[error("Sink consumer failed: {0}")]
    SinkFailed(#[source] tokio::task::JoinError),
}
