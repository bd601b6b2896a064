use accrual_reconciler::lifecycle::{setup_tracing, ReconcilerSettings, ReconcilerSystem};
use accrual_reconciler::oracle::HttpAccrualClient;
use accrual_reconciler::sink::{InMemoryLedger, ResolutionSink};
use clap::Parser;
use miette::{IntoDiagnostic, Result};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    settings: ReconcilerSettings,

    /// Order numbers to reconcile
    orders: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_tracing();

    let oracle = HttpAccrualClient::new(
        &cli.settings.accrual_address,
        cli.settings.request_timeout(),
    )
    .into_diagnostic()?;
    let ledger = InMemoryLedger::new();
    let token = CancellationToken::new();
    let tracker = TaskTracker::new();

    let mut system = ReconcilerSystem::start(
        cli.settings.retry_policy(),
        cli.settings.worker_count(),
        Arc::new(oracle),
        Arc::new(ledger.clone()),
        token.clone(),
        &tracker,
    );

    // Dead letters need manual attention; surface them as they arrive
    if let Some(mut dead_letters) = system.take_dead_letters() {
        tracker.spawn(async move {
            while let Some(entry) = dead_letters.recv().await {
                error!(order = %entry.order_number, retry_count = entry.retry_count, "Order needs manual attention");
            }
        });
    }

    for raw in &cli.orders {
        match system.intake.submit(raw) {
            Ok(order) => info!(%order, "Order submitted"),
            Err(e) => warn!(order = %raw, error = %e, "Order rejected"),
        }
    }

    info!("Reconciling, press Ctrl-C to stop");
    tokio::signal::ctrl_c().await.into_diagnostic()?;

    let report = system.shutdown().await.into_diagnostic()?;
    for entry in report.unresolved() {
        info!(order = %entry.order_number, status = %entry.order_status, "Still unresolved");
    }
    for record in ledger.all().await.into_diagnostic()? {
        info!(order = %record.number, status = %record.status, accrual = ?record.accrual, "Ledger");
    }
    Ok(())
}
