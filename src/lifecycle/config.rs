use crate::retry::RetryPolicy;
use clap::Args;
use std::time::Duration;

/// Runtime settings, from flags or the environment.
#[derive(Debug, Clone, Args)]
pub struct ReconcilerSettings {
    /// Address of the accrual system, e.g. `http://localhost:8081`
    #[arg(short = 'r', long = "accrual-address", env = "ACCRUAL_SYSTEM_ADDRESS")]
    pub accrual_address: String,

    /// Minimum seconds between two polls of the same order
    #[arg(long, env = "ACCRUAL_POLL_INTERVAL", default_value_t = 10)]
    pub poll_interval: u64,

    /// Per-request timeout in seconds
    #[arg(long, env = "ACCRUAL_REQUEST_TIMEOUT", default_value_t = 5)]
    pub request_timeout: u64,

    /// Transient failures tolerated per order before it is dead-lettered (unbounded if unset)
    #[arg(long, env = "ACCRUAL_MAX_ATTEMPTS")]
    pub max_attempts: Option<u32>,

    /// Number of reconciliation workers
    #[arg(
        long,
        env = "ACCRUAL_WORKERS",
        default_value_t = 1,
        value_parser = clap::value_parser!(u16).range(1..)
    )]
    pub workers: u16,
}

impl ReconcilerSettings {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            poll_interval: Duration::from_secs(self.poll_interval),
            max_attempts: self.max_attempts,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    pub fn worker_count(&self) -> usize {
        usize::from(self.workers)
    }
}
