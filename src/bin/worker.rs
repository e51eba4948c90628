//! Tickerscan Worker
//!
//! Runs the full scan once a day at SCAN_TIME (local time) and delivers the
//! report. Serves /health and /metrics on PORT while it waits.

use dotenvy::dotenv;
use std::sync::Arc;
use tickerscan::config::Config;
use tickerscan::core::http::{create_router, AppState};
use tickerscan::core::runtime::ScanContext;
use tickerscan::core::scheduler::ScanScheduler;
use tickerscan::logging;
use tickerscan::metrics::Metrics;
use tickerscan::report::LogReportSink;
use tokio::signal;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    logging::init_logging();

    let config = Config::from_env()?;
    info!("Starting Tickerscan Worker");
    info!(environment = %config.environment, "Environment");
    info!(
        scan_time = %config.scan_time,
        stock_top_n = config.stock_top_n,
        coin_top_n = config.coin_top_n,
        concurrency = config.scan_concurrency,
        "Daily scan at {}",
        config.scan_time
    );

    let metrics = Arc::new(Metrics::new()?);
    let context = Arc::new(ScanContext::from_config(&config, Some(metrics.clone()))?);

    let scheduler = ScanScheduler::new(context.clone(), Arc::new(LogReportSink), config.scan_time);
    scheduler
        .start()
        .await
        .map_err(|e| format!("Failed to start scheduler: {}", e))?;

    let app = create_router(AppState::new(context, metrics));
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;
    info!(port = config.port, "Worker status endpoints on port {}", config.port);
    let server = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!(error = %e, "Status server error");
        }
    });

    info!("Worker started, waiting for shutdown signal...");
    signal::ctrl_c().await?;

    info!("Shutting down worker...");
    scheduler.stop().await;
    server.abort();
    info!("Worker stopped");

    Ok(())
}
