//! Process-level concerns: settings, tracing, and starting/stopping the pipeline.

pub mod config;
pub mod error;
pub mod system;
pub mod tracing;

pub use config::ReconcilerSettings;
pub use error::LifecycleError;
pub use system::{ReconcilerSystem, ShutdownReport};
pub use self::tracing::setup_tracing;
