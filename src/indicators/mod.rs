//! Indicator library.
//!
//! Every indicator takes the full candle slice and returns a series of the
//! same length, with `None` for bars the indicator cannot be computed on.

pub mod error;

pub mod momentum;
pub mod trend;
pub mod volatility;
pub mod volume;

pub use error::IndicatorError;

use crate::config::IndicatorParams;
use crate::models::indicators::{Candle, IndicatorSet};

/// Compute every series the signal rules read.
pub fn compute_indicator_set(
    candles: &[Candle],
    params: &IndicatorParams,
) -> Result<IndicatorSet, IndicatorError> {
    params.validate()?;

    if let Some(index) = candles.iter().position(|c| !c.is_finite()) {
        return Err(IndicatorError::NonFiniteInput { index });
    }

    let (ema_short, ema_long) =
        trend::calculate_ema_pair(candles, params.ema_short, params.ema_long);

    Ok(IndicatorSet {
        rsi: momentum::calculate_rsi(candles, params.rsi_period),
        macd: momentum::calculate_macd(candles, params.macd_fast, params.macd_slow),
        ema_short,
        ema_long,
        bollinger_pct_b: volatility::calculate_bollinger_percent_b(
            candles,
            params.bollinger_period,
            params.bollinger_std_dev,
        ),
        mfi: volume::calculate_mfi(candles, params.mfi_period),
    })
}
