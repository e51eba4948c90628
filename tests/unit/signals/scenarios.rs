//! Market scenarios run through the rules, the analyzer and the screener

use chrono::{DateTime, Duration, TimeZone, Utc};
use std::sync::Arc;
use tickerscan::config::{AnalyzerConfig, SignalThresholds};
use tickerscan::models::indicators::{Candle, Crossing, IndicatorSnapshot};
use tickerscan::models::universe::UniverseEntry;
use tickerscan::screener::Screener;
use tickerscan::services::InMemoryMarketDataProvider;
use tickerscan::signals::{evaluate_candles, evaluate_rules, Analyzer};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 3, 0, 0, 0).unwrap()
}

fn daily_candles(closes: &[f64], volumes: &[f64]) -> Vec<Candle> {
    let n = closes.len();
    closes
        .iter()
        .zip(volumes)
        .enumerate()
        .map(|(i, (&close, &volume))| {
            Candle::new(
                close,
                close + 0.5,
                close - 0.5,
                close,
                volume,
                now() - Duration::days((n - 1 - i) as i64),
            )
        })
        .collect()
}

/// Steady climb; `surge` triples the last bar's volume.
fn uptrend(surge: bool) -> Vec<Candle> {
    let closes: Vec<f64> = (0..40).map(|i| 100.0 + i as f64).collect();
    let mut volumes = vec![1000.0; 40];
    if surge {
        volumes[39] = 3000.0;
    }
    daily_candles(&closes, &volumes)
}

fn sideways(surge: bool) -> Vec<Candle> {
    let mut volumes = vec![1000.0; 40];
    if surge {
        volumes[39] = 3000.0;
    }
    daily_candles(&vec![100.0; 40], &volumes)
}

/// 60 bars of a choppy decline (down 1.0, up 0.6) with one more drop and a
/// closing bounce. High and low swing around the close so the typical price
/// alternates direction and MFI stays mid-range.
fn choppy_decline_then_bounce() -> Vec<Candle> {
    let mut closes = vec![100.0];
    for i in 1..58 {
        let step = if i % 2 == 1 { -1.0 } else { 0.6 };
        closes.push(closes[i - 1] + step);
    }
    closes.push(closes[57] - 1.0);
    closes.push(closes[58] + 1.0);

    let n = closes.len();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let offset = if i % 2 == 0 { 0.3 } else { -0.3 };
            Candle::new(
                close,
                close + 1.5 * offset + 1.0,
                close + 1.5 * offset - 1.0,
                close,
                1000.0,
                now() - Duration::days((n - 1 - i) as i64),
            )
        })
        .collect()
}

fn labels(snapshot: &IndicatorSnapshot) -> Vec<String> {
    evaluate_rules(snapshot, &SignalThresholds::default())
        .iter()
        .map(ToString::to_string)
        .collect()
}

#[test]
fn test_rsi_leaving_oversold() {
    let snapshot = IndicatorSnapshot {
        rsi: Crossing::defined(30.0, 40.0),
        ..Default::default()
    };
    assert_eq!(labels(&snapshot), vec!["RSI oversold exit"]);
}

#[test]
fn test_macd_cross_with_volume_surge() {
    let snapshot = IndicatorSnapshot {
        macd: Crossing::defined(-0.5, 0.3),
        volume_ratio: 3.0,
        ..Default::default()
    };
    assert_eq!(labels(&snapshot), vec!["MACD golden cross", "Volume surge (3.0x)"]);
}

#[test]
fn test_ema_golden_cross_takes_precedence_over_uptrend() {
    let snapshot = IndicatorSnapshot {
        ema_short: Crossing::defined(9.9, 10.2),
        ema_long: Crossing::defined(10.0, 10.1),
        ..Default::default()
    };
    assert_eq!(labels(&snapshot), vec!["EMA golden cross"]);
}

#[test]
fn test_bollinger_bounce_and_mfi_oversold() {
    let snapshot = IndicatorSnapshot {
        bollinger_pct_b: Crossing::defined(0.1, 0.25),
        mfi: Crossing::defined(22.0, 25.0),
        ..Default::default()
    };
    assert_eq!(labels(&snapshot), vec!["Bollinger band lower bounce", "MFI oversold"]);
}

#[test]
fn test_rule_order_is_fixed() {
    let snapshot = IndicatorSnapshot {
        rsi: Crossing::defined(20.0, 25.0),
        macd: Crossing::defined(-0.1, 0.1),
        ema_short: Crossing::defined(5.0, 6.0),
        ema_long: Crossing::defined(4.0, 5.0),
        bollinger_pct_b: Crossing::defined(0.05, 0.3),
        mfi: Crossing::defined(80.0, 85.0),
        volume_ratio: 1.5,
    };
    assert_eq!(
        labels(&snapshot),
        vec![
            "RSI oversold state",
            "MACD golden cross",
            "EMA uptrend",
            "Bollinger band lower bounce",
            "Volume surge (1.5x)",
            "MFI overbought",
        ]
    );
}

#[test]
fn test_uptrend_with_volume_surge() {
    let record = evaluate_candles("UP", "Up", &uptrend(true), &AnalyzerConfig::default())
        .unwrap()
        .unwrap();
    assert_eq!(
        record.signals,
        vec!["EMA uptrend", "Volume surge (3.0x)", "MFI overbought"]
    );
    assert_eq!(record.rsi, Some(100.0));
}

#[test]
fn test_rsi_crossing_35_on_real_history() {
    let candles = choppy_decline_then_bounce();
    assert_eq!(candles.len(), 60);

    let rsi = tickerscan::indicators::momentum::calculate_rsi(&candles, 14);
    let (previous, current) = (rsi[58].unwrap(), rsi[59].unwrap());
    assert!(previous < 35.0, "previous RSI {}", previous);
    assert!(current > 35.0, "current RSI {}", current);

    let record = evaluate_candles("CHOP", "Choppy Co", &candles, &AnalyzerConfig::default())
        .unwrap()
        .unwrap();
    assert_eq!(record.signals, vec!["RSI oversold exit"]);
    assert_eq!(record.signal_count, 1);
    assert_eq!(record.rsi, Some(37.85));
    assert_eq!(record.price_change_pct, 1.15);
    assert_eq!(record.volume_ratio, 1.0);
}

#[tokio::test]
async fn test_analyzer_reports_rsi_exit() {
    let provider = InMemoryMarketDataProvider::new().with_history("CHOP", choppy_decline_then_bounce());
    let analyzer = Analyzer::new(Arc::new(provider), AnalyzerConfig::default());

    let record = analyzer
        .analyze_at("CHOP", "Choppy Co", 90, now())
        .await
        .unwrap()
        .expect("60 bars inside a 90 day window");
    assert_eq!(record.signals, vec!["RSI oversold exit"]);
}

#[tokio::test]
async fn test_delisted_instrument_is_skipped() {
    let provider = InMemoryMarketDataProvider::new()
        .with_history("DELISTED", Vec::new())
        .with_history("LIVE", sideways(true));
    let analyzer = Analyzer::new(Arc::new(provider), AnalyzerConfig::default());

    assert!(analyzer
        .analyze_at("DELISTED", "Delisted", 60, now())
        .await
        .unwrap()
        .is_none());

    let universe = vec![
        UniverseEntry::new("DELISTED", "Delisted"),
        UniverseEntry::new("LIVE", "Live"),
    ];
    let result = Screener::new(analyzer).screen_at(&universe, 10, now()).await;
    let ids: Vec<_> = result.records.iter().map(|r| r.instrument_id.as_str()).collect();
    assert_eq!(ids, vec!["LIVE"]);
    assert!(result.failures.is_empty());
    assert_eq!(result.scanned, 2);
}

#[tokio::test]
async fn test_zero_signal_instruments_are_dropped() {
    let provider = InMemoryMarketDataProvider::new()
        .with_history("AAA", uptrend(true))
        .with_history("BBB", sideways(false))
        .with_history("CCC", sideways(true));
    let analyzer = Analyzer::new(Arc::new(provider), AnalyzerConfig::default());
    let universe = vec![
        UniverseEntry::new("AAA", "Alpha"),
        UniverseEntry::new("BBB", "Beta"),
        UniverseEntry::new("CCC", "Gamma"),
    ];

    let result = Screener::new(analyzer).screen_at(&universe, 10, now()).await;
    let counts: Vec<_> = result.records.iter().map(|r| r.signal_count).collect();
    assert_eq!(counts, vec![3, 1]);
}
