//! Scan runtime: the wired-up equity and crypto screeners shared by every entry point.

use crate::config::Config;
use crate::metrics::Metrics;
use crate::models::signal::{ScreeningResult, SignalRecord, VolumeSurgeResult};
use crate::report::{render_scan_report, ReportSection};
use crate::screener::{ProfileScan, ScanProfile, Screener};
use crate::services::{
    BinanceMarketDataProvider, BinanceRestClient, CsvListingUniverse, CsvMarketDataProvider,
    MarketDataProvider, ProviderError, StaticUniverse,
};
use crate::signals::{AnalysisFailure, Analyzer};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

pub const FULL_SCAN_TITLE: &str = "Daily buy-interest scan";

/// Both screening passes of one invocation.
#[derive(Debug, Clone, Serialize)]
pub struct FullScan {
    pub equities: ScreeningResult,
    pub crypto: ScreeningResult,
    pub generated_at: DateTime<Utc>,
}

impl FullScan {
    pub fn render(&self) -> String {
        render_scan_report(
            FULL_SCAN_TITLE,
            &[
                ReportSection::new(ScanProfile::Equity.heading(), &self.equities),
                ReportSection::new(ScanProfile::Crypto.heading(), &self.crypto),
            ],
            self.generated_at,
        )
    }
}

/// Owns the screeners. Every call builds its own result; nothing mutable is
/// shared between concurrent invocations.
pub struct ScanContext {
    equity: ProfileScan,
    crypto: ProfileScan,
    metrics: Option<Arc<Metrics>>,
}

impl ScanContext {
    pub fn new(equity: ProfileScan, crypto: ProfileScan) -> Self {
        Self {
            equity,
            crypto,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Wire the CSV equity sources and the Binance crypto source from `config`.
    pub fn from_config(config: &Config, metrics: Option<Arc<Metrics>>) -> Result<Self, ProviderError> {
        let equity_provider: Arc<dyn MarketDataProvider> =
            Arc::new(CsvMarketDataProvider::new(&config.equity_history_dir));
        let equity_universe = Arc::new(
            CsvListingUniverse::new(&config.equity_listing_path)
                .with_top_by_market_cap(config.equity_universe_size),
        );

        let client = Arc::new(
            BinanceRestClient::new(&config.binance_base_url)?.with_timeout(config.binance_timeout),
        );
        let crypto_provider: Arc<dyn MarketDataProvider> = Arc::new(BinanceMarketDataProvider::new(
            client,
            config.crypto_quote_asset.clone(),
        ));
        let crypto_universe = Arc::new(StaticUniverse::from_symbols(config.crypto_symbols.clone()));

        let build = |provider: Arc<dyn MarketDataProvider>| {
            let screener = Screener::new(Analyzer::new(provider, config.analyzer.clone()))
                .with_concurrency(config.scan_concurrency)
                .with_history_days(config.history_days)
                .with_volume_scan(config.volume_scan.clone());
            match &metrics {
                Some(m) => screener.with_metrics(m.clone()),
                None => screener,
            }
        };

        let equity = ProfileScan::new(ScanProfile::Equity, build(equity_provider), equity_universe)
            .with_limit(config.stock_top_n);
        let crypto = ProfileScan::new(ScanProfile::Crypto, build(crypto_provider), crypto_universe)
            .with_limit(config.coin_top_n);

        info!(
            listing = %config.equity_listing_path.display(),
            history_dir = %config.equity_history_dir.display(),
            crypto_symbols = config.crypto_symbols.len(),
            quote = %config.crypto_quote_asset,
            "ScanContext: sources configured"
        );

        let context = Self::new(equity, crypto);
        Ok(match metrics {
            Some(m) => context.with_metrics(m),
            None => context,
        })
    }

    pub fn profile(&self, profile: ScanProfile) -> &ProfileScan {
        match profile {
            ScanProfile::Equity => &self.equity,
            ScanProfile::Crypto => &self.crypto,
        }
    }

    /// Run one profile; `limit` overrides the configured top-N.
    pub async fn run_scan(&self, profile: ScanProfile, limit: Option<usize>) -> ScreeningResult {
        let scan = self.profile(profile);
        let result = scan.run_with_limit(limit.unwrap_or(scan.limit())).await;
        if let Some(metrics) = &self.metrics {
            metrics.scans_total.with_label_values(&[profile.as_str()]).inc();
        }
        result
    }

    pub async fn run_equity_scan(&self, limit: Option<usize>) -> ScreeningResult {
        self.run_scan(ScanProfile::Equity, limit).await
    }

    pub async fn run_crypto_scan(&self, limit: Option<usize>) -> ScreeningResult {
        self.run_scan(ScanProfile::Crypto, limit).await
    }

    /// Volume-surge ranking of one profile; `limit` overrides the configured top-N.
    pub async fn run_volume_scan(
        &self,
        profile: ScanProfile,
        limit: Option<usize>,
    ) -> VolumeSurgeResult {
        let scan = self.profile(profile);
        let limit = limit.unwrap_or(scan.screener().volume_scan().limit);
        let result = scan.run_volume_surges(limit).await;
        if let Some(metrics) = &self.metrics {
            metrics
                .volume_scans_total
                .with_label_values(&[profile.as_str()])
                .inc();
        }
        result
    }

    /// Both profiles, run side by side.
    pub async fn run_full_scan(&self) -> FullScan {
        let (equities, crypto) =
            tokio::join!(self.run_equity_scan(None), self.run_crypto_scan(None));
        FullScan {
            equities,
            crypto,
            generated_at: Utc::now(),
        }
    }

    /// Analyze a single instrument on demand. The display name defaults to the id.
    pub async fn analyze_one(
        &self,
        profile: ScanProfile,
        instrument_id: &str,
        display_name: Option<&str>,
        days: Option<i64>,
    ) -> Result<Option<SignalRecord>, AnalysisFailure> {
        let screener = self.profile(profile).screener();
        screener
            .analyzer()
            .analyze(
                instrument_id,
                display_name.unwrap_or(instrument_id),
                days.unwrap_or(screener.history_days()),
            )
            .await
    }
}
