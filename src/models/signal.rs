use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A buy-interest rule that fired on the latest bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SignalKind {
    RsiOversoldExit,
    RsiOversold,
    MacdGoldenCross,
    EmaGoldenCross,
    EmaUptrend,
    BollingerLowerBounce,
    VolumeSurge(f64),
    MfiOversold,
    MfiOverbought,
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalKind::RsiOversoldExit => write!(f, "RSI oversold exit"),
            SignalKind::RsiOversold => write!(f, "RSI oversold state"),
            SignalKind::MacdGoldenCross => write!(f, "MACD golden cross"),
            SignalKind::EmaGoldenCross => write!(f, "EMA golden cross"),
            SignalKind::EmaUptrend => write!(f, "EMA uptrend"),
            SignalKind::BollingerLowerBounce => write!(f, "Bollinger band lower bounce"),
            SignalKind::VolumeSurge(ratio) => write!(f, "Volume surge ({:.1}x)", ratio),
            SignalKind::MfiOversold => write!(f, "MFI oversold"),
            SignalKind::MfiOverbought => write!(f, "MFI overbought"),
        }
    }
}

/// Analysis outcome for one instrument, rebuilt from scratch on every scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalRecord {
    pub instrument_id: String,
    pub display_name: String,
    pub current_price: f64,
    pub price_change_pct: f64,
    pub rsi: Option<f64>,
    pub volume_ratio: f64,
    pub signals: Vec<String>,
    pub signal_count: usize,
}

impl SignalRecord {
    pub fn is_candidate(&self) -> bool {
        self.signal_count > 0
    }
}

/// An instrument whose analysis failed during a screening pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreeningFailure {
    pub instrument_id: String,
    pub reason: String,
}

/// Ranked candidates of one screening pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreeningResult {
    pub records: Vec<SignalRecord>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<ScreeningFailure>,
    /// Instruments visited, whether or not they produced a record.
    pub scanned: usize,
    pub generated_at: DateTime<Utc>,
}

impl ScreeningResult {
    pub fn empty() -> Self {
        Self {
            records: Vec::new(),
            failures: Vec::new(),
            scanned: 0,
            generated_at: Utc::now(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }
}

/// A volume-surge candidate: the latest bar traded well above its recent average.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeSurgeRecord {
    pub instrument_id: String,
    pub display_name: String,
    pub close: f64,
    pub volume: f64,
    /// Whole-unit average over the lookback bars.
    pub average_volume: f64,
    pub volume_ratio: f64,
    pub price_change_pct: f64,
}

/// Volume-surge candidates of one pass, highest ratio first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeSurgeResult {
    pub records: Vec<VolumeSurgeRecord>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<ScreeningFailure>,
    pub scanned: usize,
    pub generated_at: DateTime<Utc>,
}

impl VolumeSurgeResult {
    pub fn empty() -> Self {
        Self {
            records: Vec::new(),
            failures: Vec::new(),
            scanned: 0,
            generated_at: Utc::now(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }
}
