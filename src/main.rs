//! One-shot scan: screens equities and crypto once and prints the report.
//!
//! `tickerscan` runs both profiles, `tickerscan equities` or
//! `tickerscan crypto` runs one of them, `tickerscan volume [crypto]` ranks
//! volume surges and `tickerscan help` lists all of this.

use dotenvy::dotenv;
use std::env;
use std::sync::Arc;
use tickerscan::config::Config;
use tickerscan::core::runtime::ScanContext;
use tickerscan::logging;
use tickerscan::report::{render_help, render_ranked_report, render_volume_report};
use tickerscan::screener::ScanProfile;
use tracing::info;

enum Command {
    Full,
    Signals(ScanProfile),
    Volume(ScanProfile),
    Help,
}

fn parse_profile(raw: Option<&str>) -> Result<ScanProfile, String> {
    match raw {
        None | Some("equities") | Some("stocks") => Ok(ScanProfile::Equity),
        Some("crypto") | Some("coins") => Ok(ScanProfile::Crypto),
        Some(other) => Err(format!("unknown market '{}', expected equities or crypto", other)),
    }
}

fn parse_command(args: &[String]) -> Result<Command, String> {
    match args.first().map(String::as_str) {
        None | Some("all") => Ok(Command::Full),
        Some("equities") | Some("stocks") => Ok(Command::Signals(ScanProfile::Equity)),
        Some("crypto") | Some("coins") => Ok(Command::Signals(ScanProfile::Crypto)),
        Some("volume") | Some("surge") => {
            parse_profile(args.get(1).map(String::as_str)).map(Command::Volume)
        }
        Some("help") | Some("--help") | Some("-h") => Ok(Command::Help),
        Some(other) => Err(format!(
            "unknown scan '{}', expected all, equities, crypto, volume or help",
            other
        )),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();

    let args: Vec<String> = env::args().skip(1).collect();
    let command = parse_command(&args)?;
    if let Command::Help = command {
        println!("{}", render_help());
        return Ok(());
    }

    logging::init_logging();
    let config = Config::from_env()?;

    info!(environment = %config.environment, "Starting one-shot scan");
    let context = Arc::new(ScanContext::from_config(&config, None)?);

    let report = match command {
        Command::Full | Command::Help => context.run_full_scan().await.render(),
        Command::Signals(profile) => {
            let result = context.run_scan(profile, None).await;
            let title = format!("{} buy-interest scan", profile.heading());
            render_ranked_report(&title, &result, result.generated_at)
        }
        Command::Volume(profile) => {
            let result = context.run_volume_scan(profile, None).await;
            let title = format!("{} volume surges", profile.heading());
            render_volume_report(&title, &result, result.generated_at)
        }
    };

    println!("{}", report);
    Ok(())
}
