//! Bollinger Bands indicator

use crate::common::math;
use crate::models::indicators::Candle;

/// Calculate Bollinger %B for every bar.
///
/// Middle Band = SMA(period)
/// Upper/Lower Band = Middle ± (std_dev * population standard deviation)
/// %B = (close - lower) / (upper - lower)
///
/// A zero-width band (flat window) has no %B.
pub fn calculate_bollinger_percent_b(candles: &[Candle], period: usize, std_dev: f64) -> Vec<Option<f64>> {
    let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
    let middle = math::rolling_mean(&closes, period);
    let std = math::rolling_std(&closes, period);

    closes
        .iter()
        .zip(middle.iter().zip(std.iter()))
        .map(|(close, (mid, sd))| {
            let (mid, sd) = ((*mid)?, (*sd)?);
            let upper = mid + std_dev * sd;
            let lower = mid - std_dev * sd;
            let width = upper - lower;
            if width <= f64::EPSILON * mid.abs().max(1.0) {
                return None;
            }
            Some((close - lower) / width)
        })
        .collect()
}

/// Calculate %B with default parameters (20 SMA, 2σ)
pub fn calculate_bollinger_percent_b_default(candles: &[Candle]) -> Vec<Option<f64>> {
    calculate_bollinger_percent_b(candles, 20, 2.0)
}
