//! Series arithmetic.
//!
//! Every windowed helper returns a vector aligned with its input, with `None`
//! in the positions where the window is not yet full.

/// Recursive exponential weighting, `y[0] = x[0]`, `y[i] = a*x[i] + (1-a)*y[i-1]`.
///
/// Values before the `min_periods`-th observation are `None`.
pub fn ewm(values: &[f64], alpha: f64, min_periods: usize) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(values.len());
    let mut prev: Option<f64> = None;

    for (i, &x) in values.iter().enumerate() {
        let y = match prev {
            Some(p) => alpha * x + (1.0 - alpha) * p,
            None => x,
        };
        prev = Some(y);
        out.push(if i + 1 >= min_periods.max(1) { Some(y) } else { None });
    }

    out
}

/// Exponential moving average with span smoothing, `alpha = 2 / (period + 1)`.
pub fn ema_series(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let alpha = 2.0 / (period as f64 + 1.0);
    ewm(values, alpha, period)
}

pub fn rolling_sum(values: &[f64], window: usize) -> Vec<Option<f64>> {
    rolling(values, window, |w| w.iter().sum())
}

pub fn rolling_mean(values: &[f64], window: usize) -> Vec<Option<f64>> {
    rolling(values, window, |w| w.iter().sum::<f64>() / w.len() as f64)
}

/// Population standard deviation (ddof = 0) over a trailing window.
pub fn rolling_std(values: &[f64], window: usize) -> Vec<Option<f64>> {
    rolling(values, window, |w| {
        let m = w.iter().sum::<f64>() / w.len() as f64;
        let var = w.iter().map(|x| (x - m).powi(2)).sum::<f64>() / w.len() as f64;
        var.sqrt()
    })
}

fn rolling<F>(values: &[f64], window: usize, f: F) -> Vec<Option<f64>>
where
    F: Fn(&[f64]) -> f64,
{
    if window == 0 {
        return vec![None; values.len()];
    }

    (0..values.len())
        .map(|i| {
            if i + 1 >= window {
                Some(f(&values[i + 1 - window..=i]))
            } else {
                None
            }
        })
        .collect()
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}
