//! Buy-interest rules evaluated against the two most recent bars.

use crate::config::SignalThresholds;
use crate::models::indicators::IndicatorSnapshot;
use crate::models::signal::SignalKind;

/// Evaluate every rule in fixed order and return the ones that fired.
///
/// A rule only compares values that are defined; an undefined indicator
/// simply does not fire.
pub fn evaluate_rules(snapshot: &IndicatorSnapshot, thresholds: &SignalThresholds) -> Vec<SignalKind> {
    let mut signals = Vec::new();

    if let Some(kind) = rsi_rule(snapshot, thresholds) {
        signals.push(kind);
    }

    if let Some((prev, cur)) = snapshot.macd.both() {
        if prev < 0.0 && cur > 0.0 {
            signals.push(SignalKind::MacdGoldenCross);
        }
    }

    if let Some(kind) = ema_rule(snapshot) {
        signals.push(kind);
    }

    if let Some((prev, cur)) = snapshot.bollinger_pct_b.both() {
        if prev < thresholds.bollinger_bounce && cur >= thresholds.bollinger_bounce {
            signals.push(SignalKind::BollingerLowerBounce);
        }
    }

    if snapshot.volume_ratio >= thresholds.volume_surge {
        signals.push(SignalKind::VolumeSurge(snapshot.volume_ratio));
    }

    if let Some(mfi) = snapshot.mfi.current {
        if mfi < thresholds.mfi_oversold {
            signals.push(SignalKind::MfiOversold);
        } else if mfi > thresholds.mfi_overbought {
            signals.push(SignalKind::MfiOverbought);
        }
    }

    signals
}

fn rsi_rule(snapshot: &IndicatorSnapshot, thresholds: &SignalThresholds) -> Option<SignalKind> {
    let current = snapshot.rsi.current?;
    let oversold = thresholds.rsi_oversold;

    match snapshot.rsi.previous {
        Some(previous) if previous <= oversold && current > oversold => {
            Some(SignalKind::RsiOversoldExit)
        }
        _ if current < oversold => Some(SignalKind::RsiOversold),
        _ => None,
    }
}

fn ema_rule(snapshot: &IndicatorSnapshot) -> Option<SignalKind> {
    let short = snapshot.ema_short.current?;
    let long = snapshot.ema_long.current?;

    let was_below = matches!(
        (snapshot.ema_short.previous, snapshot.ema_long.previous),
        (Some(prev_short), Some(prev_long)) if prev_short <= prev_long
    );

    if was_below && short > long {
        Some(SignalKind::EmaGoldenCross)
    } else if short > long {
        Some(SignalKind::EmaUptrend)
    } else {
        None
    }
}
