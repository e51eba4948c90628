use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One OHLCV bar. A price series is a `Vec<Candle>` ordered oldest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    pub fn new(
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// (high + low + close) / 3
    pub fn typical_price(&self) -> f64 {
        (self.high + self.low + self.close) / 3.0
    }

    pub fn is_finite(&self) -> bool {
        self.open.is_finite()
            && self.high.is_finite()
            && self.low.is_finite()
            && self.close.is_finite()
            && self.volume.is_finite()
    }
}

/// Indicator series aligned bar-for-bar with the candles they were computed from.
///
/// `None` marks warm-up bars (and degenerate windows) where the indicator has
/// no value. Rules must never compare against a missing value.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IndicatorSet {
    pub rsi: Vec<Option<f64>>,
    pub macd: Vec<Option<f64>>,
    pub ema_short: Vec<Option<f64>>,
    pub ema_long: Vec<Option<f64>>,
    pub bollinger_pct_b: Vec<Option<f64>>,
    pub mfi: Vec<Option<f64>>,
}

impl IndicatorSet {
    pub fn len(&self) -> usize {
        self.rsi.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rsi.is_empty()
    }

    /// Previous/current pair of every series, or `None` with fewer than two bars.
    pub fn snapshot(&self, volume_ratio: f64) -> Option<IndicatorSnapshot> {
        Some(IndicatorSnapshot {
            rsi: Crossing::last_two(&self.rsi)?,
            macd: Crossing::last_two(&self.macd)?,
            ema_short: Crossing::last_two(&self.ema_short)?,
            ema_long: Crossing::last_two(&self.ema_long)?,
            bollinger_pct_b: Crossing::last_two(&self.bollinger_pct_b)?,
            mfi: Crossing::last_two(&self.mfi)?,
            volume_ratio,
        })
    }
}

/// Value of one indicator at the previous and the latest bar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Crossing {
    pub previous: Option<f64>,
    pub current: Option<f64>,
}

impl Crossing {
    pub fn new(previous: Option<f64>, current: Option<f64>) -> Self {
        Self { previous, current }
    }

    pub fn defined(previous: f64, current: f64) -> Self {
        Self::new(Some(previous), Some(current))
    }

    fn last_two(series: &[Option<f64>]) -> Option<Self> {
        match series {
            [.., previous, current] => Some(Self::new(*previous, *current)),
            _ => None,
        }
    }

    /// Both values, only when both are defined.
    pub fn both(&self) -> Option<(f64, f64)> {
        Some((self.previous?, self.current?))
    }
}

/// Everything the signal rules look at for one instrument.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct IndicatorSnapshot {
    pub rsi: Crossing,
    pub macd: Crossing,
    pub ema_short: Crossing,
    pub ema_long: Crossing,
    pub bollinger_pct_b: Crossing,
    pub mfi: Crossing,
    /// Latest volume over the trailing 29-bar average; 0 when that average is 0.
    pub volume_ratio: f64,
}
