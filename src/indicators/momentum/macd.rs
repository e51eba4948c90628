//! MACD (Moving Average Convergence Divergence) line

use crate::indicators::trend::calculate_ema;
use crate::models::indicators::Candle;

/// MACD line = EMA(fast) - EMA(slow), defined where both EMAs are.
///
/// Only the line is needed for the zero-line cross rule, so the signal line
/// and histogram are not computed.
pub fn calculate_macd(candles: &[Candle], fast_period: usize, slow_period: usize) -> Vec<Option<f64>> {
    let fast = calculate_ema(candles, fast_period);
    let slow = calculate_ema(candles, slow_period);

    fast.iter()
        .zip(slow.iter())
        .map(|(f, s)| Some((*f)? - (*s)?))
        .collect()
}

/// Calculate MACD with default periods (12, 26)
pub fn calculate_macd_default(candles: &[Candle]) -> Vec<Option<f64>> {
    calculate_macd(candles, 12, 26)
}
