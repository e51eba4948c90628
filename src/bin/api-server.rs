//! Tickerscan API Server
//!
//! On-demand scans and single-instrument analysis over HTTP.
//! Stateless: every request runs its own screening pass.

use dotenvy::dotenv;
use tickerscan::config::Config;
use tickerscan::core::http::start_server;
use tickerscan::logging;
use tokio::signal;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    logging::init_logging();

    let config = Config::from_env()?;
    info!("Starting Tickerscan API Server");
    info!(environment = %config.environment, "Environment");
    info!(port = config.port, "HTTP Server: http://0.0.0.0:{}", config.port);

    tokio::select! {
        _ = signal::ctrl_c() => {
            info!("Shutting down API server...");
        }
        result = start_server(&config) => {
            if let Err(e) = result {
                error!(error = %e, "HTTP server error");
                return Err(e);
            }
            error!("HTTP server stopped");
        }
    }

    info!("API server stopped");
    Ok(())
}
