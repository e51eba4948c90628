//! Runtime configuration loaded from environment variables.
//!
//! Binaries call `dotenvy::dotenv()` first so a local `.env` file can supply
//! any of these keys. Every malformed value is rejected at startup.

pub mod analysis;

pub use analysis::{AnalyzerConfig, IndicatorParams, SignalThresholds, VolumeScanConfig};

use crate::core::scheduler::ScanTime;
use std::env;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Longest history window any analysis may request (about ten years).
pub const MAX_HISTORY_DAYS: i64 = 3650;

pub const DEFAULT_CRYPTO_SYMBOLS: &[&str] = &[
    "BTC", "ETH", "BNB", "XRP", "ADA", "SOL", "DOGE", "AVAX", "LINK", "MATIC", "ATOM", "LTC",
    "DASH", "SHIB", "UNI", "ARB", "APT", "OP", "FET", "JTO",
];

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("invalid value for {key}: '{value}' ({reason})")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Deployment environment name, `sandbox` unless APP_ENV says otherwise.
pub fn get_environment() -> String {
    env::var("APP_ENV").unwrap_or_else(|_| "sandbox".to_string())
}

pub fn is_production(environment: &str) -> bool {
    matches!(environment, "production" | "prod")
}

#[derive(Debug, Clone)]
pub struct Config {
    pub environment: String,
    pub port: u16,
    pub scan_time: ScanTime,
    pub history_days: i64,
    pub scan_concurrency: usize,
    pub stock_top_n: usize,
    pub coin_top_n: usize,
    /// Largest-N by market cap kept from the equity listing; 0 keeps everything.
    pub equity_universe_size: usize,
    pub equity_listing_path: PathBuf,
    pub equity_history_dir: PathBuf,
    pub crypto_symbols: Vec<String>,
    pub crypto_quote_asset: String,
    pub binance_base_url: String,
    pub binance_timeout: Duration,
    pub analyzer: AnalyzerConfig,
    pub volume_scan: VolumeScanConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: "sandbox".to_string(),
            port: 8080,
            scan_time: ScanTime::default(),
            history_days: 60,
            scan_concurrency: 8,
            stock_top_n: 10,
            coin_top_n: 10,
            equity_universe_size: 500,
            equity_listing_path: PathBuf::from("data/listing.csv"),
            equity_history_dir: PathBuf::from("data/history"),
            crypto_symbols: DEFAULT_CRYPTO_SYMBOLS.iter().map(|s| s.to_string()).collect(),
            crypto_quote_asset: "USDT".to_string(),
            binance_base_url: "https://api.binance.com".to_string(),
            binance_timeout: Duration::from_secs(10),
            analyzer: AnalyzerConfig::default(),
            volume_scan: VolumeScanConfig::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; missing keys take their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let scan_time = match get("SCAN_TIME") {
            Some(raw) => raw.parse::<ScanTime>().map_err(|reason| ConfigError::Invalid {
                key: "SCAN_TIME",
                value: raw.clone(),
                reason,
            })?,
            None => defaults.scan_time,
        };

        let history_days: i64 = parse_or(get("HISTORY_DAYS"), "HISTORY_DAYS", defaults.history_days)?;
        if history_days <= 0 || history_days > MAX_HISTORY_DAYS {
            return Err(ConfigError::Invalid {
                key: "HISTORY_DAYS",
                value: history_days.to_string(),
                reason: format!("must be between 1 and {}", MAX_HISTORY_DAYS),
            });
        }

        let scan_concurrency: usize =
            parse_or(get("SCAN_CONCURRENCY"), "SCAN_CONCURRENCY", defaults.scan_concurrency)?;
        if scan_concurrency == 0 {
            return Err(ConfigError::Invalid {
                key: "SCAN_CONCURRENCY",
                value: "0".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        let volume_lookback: usize = parse_or(
            get("VOLUME_LOOKBACK"),
            "VOLUME_LOOKBACK",
            defaults.volume_scan.lookback,
        )?;
        if volume_lookback == 0 || volume_lookback as i64 + 10 > MAX_HISTORY_DAYS {
            return Err(ConfigError::Invalid {
                key: "VOLUME_LOOKBACK",
                value: volume_lookback.to_string(),
                reason: format!("must be between 1 and {}", MAX_HISTORY_DAYS - 10),
            });
        }
        let volume_ratio: f64 = parse_or(
            get("VOLUME_SURGE_RATIO"),
            "VOLUME_SURGE_RATIO",
            defaults.volume_scan.min_ratio,
        )?;
        if !volume_ratio.is_finite() || volume_ratio <= 0.0 {
            return Err(ConfigError::Invalid {
                key: "VOLUME_SURGE_RATIO",
                value: volume_ratio.to_string(),
                reason: "must be a positive number".to_string(),
            });
        }
        let volume_scan = VolumeScanConfig {
            min_ratio: volume_ratio,
            limit: parse_or(get("VOLUME_TOP_N"), "VOLUME_TOP_N", defaults.volume_scan.limit)?,
            ..defaults.volume_scan.clone()
        }
        .with_lookback(volume_lookback);

        let binance_timeout_secs: u64 = parse_or(
            get("BINANCE_TIMEOUT_SECS"),
            "BINANCE_TIMEOUT_SECS",
            defaults.binance_timeout.as_secs(),
        )?;
        if binance_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "BINANCE_TIMEOUT_SECS",
                value: "0".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        let crypto_symbols = get("CRYPTO_SYMBOLS")
            .map(|raw| {
                raw.split(',')
                    .map(|s| s.trim().to_uppercase())
                    .filter(|s| !s.is_empty())
                    .collect::<Vec<_>>()
            })
            .unwrap_or(defaults.crypto_symbols);

        Ok(Self {
            environment: get("APP_ENV").unwrap_or(defaults.environment),
            port: parse_or(get("PORT"), "PORT", defaults.port)?,
            scan_time,
            history_days,
            scan_concurrency,
            stock_top_n: parse_or(get("STOCK_TOP_N"), "STOCK_TOP_N", defaults.stock_top_n)?,
            coin_top_n: parse_or(get("COIN_TOP_N"), "COIN_TOP_N", defaults.coin_top_n)?,
            equity_universe_size: parse_or(
                get("EQUITY_UNIVERSE_SIZE"),
                "EQUITY_UNIVERSE_SIZE",
                defaults.equity_universe_size,
            )?,
            equity_listing_path: get("EQUITY_LISTING_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.equity_listing_path),
            equity_history_dir: get("EQUITY_HISTORY_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.equity_history_dir),
            crypto_symbols,
            crypto_quote_asset: get("CRYPTO_QUOTE_ASSET")
                .map(|q| q.to_uppercase())
                .unwrap_or(defaults.crypto_quote_asset),
            binance_base_url: get("BINANCE_BASE_URL").unwrap_or(defaults.binance_base_url),
            binance_timeout: Duration::from_secs(binance_timeout_secs),
            analyzer: defaults.analyzer,
            volume_scan,
        })
    }
}

fn parse_or<T>(raw: Option<String>, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    match raw {
        Some(value) => value.parse::<T>().map_err(|e| ConfigError::Invalid {
            key,
            reason: e.to_string(),
            value,
        }),
        None => Ok(default),
    }
}
