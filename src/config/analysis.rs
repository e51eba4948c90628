//! Indicator periods and rule thresholds.

use crate::indicators::IndicatorError;
use serde::{Deserialize, Serialize};

/// Lookback windows for the indicator library.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorParams {
    pub rsi_period: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub ema_short: usize,
    pub ema_long: usize,
    pub bollinger_period: usize,
    pub bollinger_std_dev: f64,
    pub mfi_period: usize,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self {
            rsi_period: 14,
            macd_fast: 12,
            macd_slow: 26,
            ema_short: 5,
            ema_long: 20,
            bollinger_period: 20,
            bollinger_std_dev: 2.0,
            mfi_period: 14,
        }
    }
}

impl IndicatorParams {
    pub fn validate(&self) -> Result<(), IndicatorError> {
        let periods = [
            ("rsi", self.rsi_period),
            ("macd_fast", self.macd_fast),
            ("macd_slow", self.macd_slow),
            ("ema_short", self.ema_short),
            ("ema_long", self.ema_long),
            ("bollinger", self.bollinger_period),
            ("mfi", self.mfi_period),
        ];
        if let Some((name, _)) = periods.iter().find(|(_, p)| *p == 0) {
            return Err(IndicatorError::ZeroPeriod(name));
        }
        if self.macd_fast >= self.macd_slow {
            return Err(IndicatorError::InvalidPeriods {
                fast: self.macd_fast,
                slow: self.macd_slow,
            });
        }
        Ok(())
    }
}

/// Rule thresholds. Volume surge is inclusive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalThresholds {
    pub rsi_oversold: f64,
    pub bollinger_bounce: f64,
    pub volume_surge: f64,
    pub mfi_oversold: f64,
    pub mfi_overbought: f64,
}

impl Default for SignalThresholds {
    fn default() -> Self {
        Self {
            rsi_oversold: 35.0,
            bollinger_bounce: 0.2,
            volume_surge: 1.5,
            mfi_oversold: 30.0,
            mfi_overbought: 70.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    pub indicators: IndicatorParams,
    pub thresholds: SignalThresholds,
    /// Histories shorter than this are skipped, not failed.
    pub min_bars: usize,
    /// Bars before the latest one that make up the average volume.
    pub volume_lookback: usize,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            indicators: IndicatorParams::default(),
            thresholds: SignalThresholds::default(),
            min_bars: 30,
            volume_lookback: 29,
        }
    }
}

/// Volume-surge ranking: latest volume against the average of the bars
/// before it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeScanConfig {
    /// Bars before the latest one that make up the average volume. Shorter
    /// histories are skipped.
    pub lookback: usize,
    /// Inclusive ratio a candidate has to reach.
    pub min_ratio: f64,
    /// Calendar days of history fetched per instrument.
    pub history_days: i64,
    pub limit: usize,
}

impl VolumeScanConfig {
    /// Calendar window for `lookback` trading bars, with room for weekends.
    pub fn with_lookback(mut self, lookback: usize) -> Self {
        self.lookback = lookback;
        self.history_days = lookback as i64 + 10;
        self
    }
}

impl Default for VolumeScanConfig {
    fn default() -> Self {
        Self {
            lookback: 20,
            min_ratio: 1.5,
            history_days: 30,
            limit: 20,
        }
    }
}
