//! MFI (Money Flow Index) indicator

use crate::common::math;
use crate::models::indicators::Candle;

/// Calculate MFI for every bar.
///
/// Raw money flow = typical price * volume, signed by the direction of the
/// typical price versus the previous bar (unchanged bars contribute nothing).
/// MFI = 100 - 100 / (1 + positive_flow / negative_flow) over `period` bars.
pub fn calculate_mfi(candles: &[Candle], period: usize) -> Vec<Option<f64>> {
    let mut positive = Vec::with_capacity(candles.len());
    let mut negative = Vec::with_capacity(candles.len());

    for (i, candle) in candles.iter().enumerate() {
        let tp = candle.typical_price();
        let flow = tp * candle.volume;
        match i.checked_sub(1).map(|p| candles[p].typical_price()) {
            Some(prev) if tp > prev => {
                positive.push(flow);
                negative.push(0.0);
            }
            Some(prev) if tp < prev => {
                positive.push(0.0);
                negative.push(flow);
            }
            _ => {
                positive.push(0.0);
                negative.push(0.0);
            }
        }
    }

    let pos_sums = math::rolling_sum(&positive, period);
    let neg_sums = math::rolling_sum(&negative, period);

    pos_sums
        .iter()
        .zip(neg_sums.iter())
        .map(|(pos, neg)| match ((*pos)?, (*neg)?) {
            (p, n) if n == 0.0 && p == 0.0 => None,
            (_, n) if n == 0.0 => Some(100.0),
            (p, n) => Some(100.0 - 100.0 / (1.0 + p / n)),
        })
        .collect()
}

/// Calculate MFI with default period (14)
pub fn calculate_mfi_default(candles: &[Candle]) -> Vec<Option<f64>> {
    calculate_mfi(candles, 14)
}
