use crate::indicators::IndicatorError;
use crate::services::ProviderError;
use thiserror::Error;

/// Why a single instrument produced no record. Never aborts a screening pass.
#[derive(Debug, Error)]
pub enum AnalysisFailure {
    #[error("market data error: {0}")]
    Provider(#[from] ProviderError),

    #[error("indicator error: {0}")]
    Indicator(#[from] IndicatorError),

    #[error("invalid price data: {0}")]
    InvalidData(String),

    #[error("history window of {0} days is out of range")]
    HistoryWindow(i64),

    #[error("analysis panicked: {0}")]
    Panicked(String),
}
