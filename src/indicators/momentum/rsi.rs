//! RSI (Relative Strength Index) indicator

use crate::common::math;
use crate::models::indicators::Candle;

/// Calculate RSI for every bar.
///
/// Gains and losses are smoothed with Wilder's factor `1/period`.
/// RSI = 100 - (100 / (1 + avg_gain / avg_loss)), and 100 when the average
/// loss is zero. The first defined value is at index `period`.
pub fn calculate_rsi(candles: &[Candle], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; candles.len()];
    if period == 0 || candles.len() < 2 {
        return out;
    }

    let (gains, losses): (Vec<f64>, Vec<f64>) = candles
        .windows(2)
        .map(|w| {
            let change = w[1].close - w[0].close;
            (change.max(0.0), (-change).max(0.0))
        })
        .unzip();

    let alpha = 1.0 / period as f64;
    let avg_gains = math::ewm(&gains, alpha, period);
    let avg_losses = math::ewm(&losses, alpha, period);

    for (i, (gain, loss)) in avg_gains.iter().zip(avg_losses.iter()).enumerate() {
        out[i + 1] = match (gain, loss) {
            (Some(_), Some(loss)) if *loss == 0.0 => Some(100.0),
            (Some(gain), Some(loss)) => Some(100.0 - 100.0 / (1.0 + gain / loss)),
            _ => None,
        };
    }

    out
}

/// Calculate RSI with default period (14)
pub fn calculate_rsi_default(candles: &[Candle]) -> Vec<Option<f64>> {
    calculate_rsi(candles, 14)
}
