//! EMA (Exponential Moving Average) indicator

use crate::common::math;
use crate::models::indicators::Candle;

/// Calculate the EMA of closes for a specific period.
///
/// Smoothing factor is `2 / (period + 1)`; the first `period - 1` bars are
/// warm-up and carry no value.
pub fn calculate_ema(candles: &[Candle], period: usize) -> Vec<Option<f64>> {
    if period == 0 {
        return vec![None; candles.len()];
    }
    let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
    math::ema_series(&closes, period)
}

/// Short/long EMA pair, e.g. (5, 20).
pub fn calculate_ema_pair(
    candles: &[Candle],
    short_period: usize,
    long_period: usize,
) -> (Vec<Option<f64>>, Vec<Option<f64>>) {
    (
        calculate_ema(candles, short_period),
        calculate_ema(candles, long_period),
    )
}
