//! Per-instrument analysis: history in, `SignalRecord` out.

use crate::common::math;
use crate::config::{AnalyzerConfig, VolumeScanConfig};
use crate::indicators::compute_indicator_set;
use crate::models::indicators::Candle;
use crate::models::signal::{SignalRecord, VolumeSurgeRecord};
use crate::services::market_data::MarketDataProvider;
use crate::signals::error::AnalysisFailure;
use crate::signals::rules::evaluate_rules;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tracing::{debug, warn};

/// Evaluate the rule set on an already fetched history.
///
/// Returns `Ok(None)` when the history is too short to analyze. A record with
/// `signal_count == 0` is a valid result meaning "not a candidate".
pub fn evaluate_candles(
    instrument_id: &str,
    display_name: &str,
    candles: &[Candle],
    config: &AnalyzerConfig,
) -> Result<Option<SignalRecord>, AnalysisFailure> {
    if candles.len() < config.min_bars.max(2) {
        return Ok(None);
    }

    let indicators = compute_indicator_set(candles, &config.indicators)?;

    let n = candles.len();
    let current = &candles[n - 1];
    let previous = &candles[n - 2];

    if previous.close == 0.0 {
        return Err(AnalysisFailure::InvalidData(format!(
            "previous close is zero at {}",
            previous.timestamp
        )));
    }
    let price_change_pct = (current.close - previous.close) / previous.close * 100.0;

    let ratio = volume_ratio(candles, config.volume_lookback);
    let snapshot = indicators
        .snapshot(ratio)
        .ok_or_else(|| AnalysisFailure::InvalidData("indicator series shorter than history".to_string()))?;

    let signals: Vec<String> = evaluate_rules(&snapshot, &config.thresholds)
        .iter()
        .map(ToString::to_string)
        .collect();

    Ok(Some(SignalRecord {
        instrument_id: instrument_id.to_string(),
        display_name: display_name.to_string(),
        current_price: math::round_to(current.close, 2),
        price_change_pct: math::round_to(price_change_pct, 2),
        rsi: snapshot.rsi.current.map(|v| math::round_to(v, 2)),
        volume_ratio: math::round_to(ratio, 2),
        signal_count: signals.len(),
        signals,
    }))
}

/// Latest volume divided by the mean of the `lookback` bars before it.
///
/// Zero when that mean is zero (or there is nothing to average).
pub fn volume_ratio(candles: &[Candle], lookback: usize) -> f64 {
    match (candles.last(), trailing_average_volume(candles, lookback)) {
        (Some(latest), Some(avg)) if avg > 0.0 => latest.volume / avg,
        _ => 0.0,
    }
}

/// Mean volume of the `lookback` bars before the latest one.
pub fn trailing_average_volume(candles: &[Candle], lookback: usize) -> Option<f64> {
    let (_, earlier) = candles.split_last()?;
    let start = earlier.len().saturating_sub(lookback);
    let window: Vec<f64> = earlier[start..].iter().map(|c| c.volume).collect();
    math::mean(&window)
}

/// Volume-surge check on an already fetched history.
///
/// `Ok(None)` when the history is shorter than the lookback, the average
/// volume is zero, or the ratio stays below `config.min_ratio`.
pub fn evaluate_volume_surge(
    instrument_id: &str,
    display_name: &str,
    candles: &[Candle],
    config: &VolumeScanConfig,
) -> Result<Option<VolumeSurgeRecord>, AnalysisFailure> {
    if candles.len() < config.lookback.max(2) {
        return Ok(None);
    }
    if let Some(index) = candles.iter().position(|c| !c.is_finite()) {
        return Err(AnalysisFailure::InvalidData(format!(
            "non-finite value in bar {}",
            index
        )));
    }

    let average = match trailing_average_volume(candles, config.lookback) {
        Some(avg) if avg > 0.0 => avg,
        _ => return Ok(None),
    };

    let n = candles.len();
    let current = &candles[n - 1];
    let previous = &candles[n - 2];
    let ratio = current.volume / average;
    if ratio < config.min_ratio {
        return Ok(None);
    }

    if previous.close == 0.0 {
        return Err(AnalysisFailure::InvalidData(format!(
            "previous close is zero at {}",
            previous.timestamp
        )));
    }
    let price_change_pct = (current.close - previous.close) / previous.close * 100.0;

    Ok(Some(VolumeSurgeRecord {
        instrument_id: instrument_id.to_string(),
        display_name: display_name.to_string(),
        close: math::round_to(current.close, 2),
        volume: current.volume,
        average_volume: average.trunc(),
        volume_ratio: math::round_to(ratio, 2),
        price_change_pct: math::round_to(price_change_pct, 2),
    }))
}

/// Start of a `days`-long history window ending at `now`.
pub fn history_start(now: DateTime<Utc>, days: i64) -> Result<DateTime<Utc>, AnalysisFailure> {
    if days <= 0 {
        return Err(AnalysisFailure::HistoryWindow(days));
    }
    Duration::try_days(days)
        .and_then(|span| now.checked_sub_signed(span))
        .ok_or(AnalysisFailure::HistoryWindow(days))
}

/// Fetches history through a provider and runs [`evaluate_candles`].
#[derive(Clone)]
pub struct Analyzer {
    provider: Arc<dyn MarketDataProvider>,
    config: AnalyzerConfig,
}

impl Analyzer {
    pub fn new(provider: Arc<dyn MarketDataProvider>, config: AnalyzerConfig) -> Self {
        Self { provider, config }
    }

    /// Analyze `days` of history ending now.
    pub async fn analyze(
        &self,
        instrument_id: &str,
        display_name: &str,
        days: i64,
    ) -> Result<Option<SignalRecord>, AnalysisFailure> {
        self.analyze_at(instrument_id, display_name, days, Utc::now()).await
    }

    /// Analyze `days` of history ending at `now`.
    pub async fn analyze_at(
        &self,
        instrument_id: &str,
        display_name: &str,
        days: i64,
        now: DateTime<Utc>,
    ) -> Result<Option<SignalRecord>, AnalysisFailure> {
        let result = match self.fetch_window(instrument_id, days, now).await {
            Ok(candles) if candles.len() < self.config.min_bars => {
                debug!(
                    instrument = %instrument_id,
                    bars = candles.len(),
                    min = self.config.min_bars,
                    "Analyzer: not enough history for {} ({} < {}), skipping",
                    instrument_id,
                    candles.len(),
                    self.config.min_bars
                );
                Ok(None)
            }
            Ok(candles) => evaluate_candles(instrument_id, display_name, &candles, &self.config),
            Err(e) => Err(e),
        };

        match &result {
            Ok(Some(record)) => debug!(
                instrument = %instrument_id,
                signal_count = record.signal_count,
                "Analyzer: {} produced {} signals",
                instrument_id,
                record.signal_count
            ),
            Ok(None) => {}
            Err(e) => warn!(
                instrument = %instrument_id,
                error = %e,
                "Analyzer: analysis failed for {}",
                instrument_id
            ),
        }

        result
    }

    /// Volume-surge check over `config.history_days` of history ending at `now`.
    pub async fn volume_surge_at(
        &self,
        instrument_id: &str,
        display_name: &str,
        config: &VolumeScanConfig,
        now: DateTime<Utc>,
    ) -> Result<Option<VolumeSurgeRecord>, AnalysisFailure> {
        let result = self
            .fetch_window(instrument_id, config.history_days, now)
            .await
            .and_then(|candles| evaluate_volume_surge(instrument_id, display_name, &candles, config));

        if let Err(e) = &result {
            warn!(
                instrument = %instrument_id,
                error = %e,
                "Analyzer: volume check failed for {}",
                instrument_id
            );
        }
        result
    }

    async fn fetch_window(
        &self,
        instrument_id: &str,
        days: i64,
        now: DateTime<Utc>,
    ) -> Result<Vec<Candle>, AnalysisFailure> {
        let start = history_start(now, days)?;
        Ok(self.provider.fetch_history(instrument_id, start, now).await?)
    }
}
