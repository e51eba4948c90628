//! Unit tests for the instrument analyzer

use chrono::{DateTime, Duration, TimeZone, Utc};
use std::sync::Arc;
use tickerscan::config::{AnalyzerConfig, VolumeScanConfig};
use tickerscan::models::indicators::Candle;
use tickerscan::services::InMemoryMarketDataProvider;
use tickerscan::signals::{
    evaluate_candles, evaluate_volume_surge, history_start, trailing_average_volume, volume_ratio,
    AnalysisFailure, Analyzer,
};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 3, 0, 0, 0).unwrap()
}

/// Daily candles ending at `now()`, one per close/volume pair.
fn daily_candles(closes: &[f64], volumes: &[f64]) -> Vec<Candle> {
    let n = closes.len();
    closes
        .iter()
        .zip(volumes)
        .enumerate()
        .map(|(i, (&close, &volume))| {
            Candle::new(
                close,
                close + 1.0,
                close - 1.0,
                close,
                volume,
                now() - Duration::days((n - 1 - i) as i64),
            )
        })
        .collect()
}

fn flat_candles(count: usize, price: f64) -> Vec<Candle> {
    daily_candles(&vec![price; count], &vec![1000.0; count])
}

#[test]
fn test_short_history_is_absent() {
    let candles = flat_candles(29, 100.0);
    let result = evaluate_candles("SHORT", "Short", &candles, &AnalyzerConfig::default()).unwrap();
    assert!(result.is_none());
}

#[test]
fn test_flat_series_has_no_signals() {
    let candles = flat_candles(40, 100.0);
    let record = evaluate_candles("FLAT", "Flat Co", &candles, &AnalyzerConfig::default())
        .unwrap()
        .expect("record for 40 bars");

    assert_eq!(record.signal_count, 0);
    assert!(record.signals.is_empty());
    assert!(!record.is_candidate());
    assert_eq!(record.price_change_pct, 0.0);
    assert_eq!(record.volume_ratio, 1.0);
}

#[test]
fn test_volume_surge_on_flat_prices() {
    let mut volumes = vec![1000.0; 35];
    volumes[34] = 3000.0;
    let candles = daily_candles(&vec![100.0; 35], &volumes);

    let record = evaluate_candles("VOL", "Volume Co", &candles, &AnalyzerConfig::default())
        .unwrap()
        .unwrap();
    assert_eq!(record.signals, vec!["Volume surge (3.0x)"]);
    assert_eq!(record.signal_count, 1);
    assert_eq!(record.volume_ratio, 3.0);
}

#[test]
fn test_record_fields_are_rounded() {
    let mut closes = vec![100.0; 34];
    closes.push(101.23456);
    let candles = daily_candles(&closes, &vec![1000.0; 35]);

    let record = evaluate_candles("RND", "Round", &candles, &AnalyzerConfig::default())
        .unwrap()
        .unwrap();
    assert_eq!(record.current_price, 101.23);
    assert_eq!(record.price_change_pct, 1.23);
    assert_eq!(record.instrument_id, "RND");
    assert_eq!(record.display_name, "Round");
}

#[test]
fn test_signal_count_matches_signals() {
    let closes: Vec<f64> = (0..45).map(|i| 50.0 + (i as f64 * 0.9).sin() * 4.0).collect();
    let volumes: Vec<f64> = (0..45).map(|i| 1000.0 + (i % 7) as f64 * 150.0).collect();
    let candles = daily_candles(&closes, &volumes);

    let record = evaluate_candles("MIX", "Mixed", &candles, &AnalyzerConfig::default())
        .unwrap()
        .unwrap();
    assert_eq!(record.signal_count, record.signals.len());
    assert!(record.signal_count <= 6);
}

#[test]
fn test_evaluation_is_idempotent() {
    let closes: Vec<f64> = (0..50).map(|i| 20.0 + (i as f64 * 0.4).cos() * 2.0).collect();
    let candles = daily_candles(&closes, &vec![500.0; 50]);
    let config = AnalyzerConfig::default();

    let first = evaluate_candles("IDEM", "Idem", &candles, &config).unwrap();
    let second = evaluate_candles("IDEM", "Idem", &candles, &config).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_zero_previous_close_is_a_failure() {
    let mut closes = vec![10.0; 35];
    closes[33] = 0.0;
    let candles = daily_candles(&closes, &vec![1000.0; 35]);

    let err = evaluate_candles("ZERO", "Zero", &candles, &AnalyzerConfig::default()).unwrap_err();
    assert!(matches!(err, AnalysisFailure::InvalidData(_)));
}

#[test]
fn test_non_finite_price_is_a_failure() {
    let mut candles = flat_candles(35, 100.0);
    candles[10].close = f64::NAN;

    let err = evaluate_candles("NAN", "NaN", &candles, &AnalyzerConfig::default()).unwrap_err();
    assert!(matches!(err, AnalysisFailure::Indicator(_)));
}

#[test]
fn test_volume_ratio_uses_trailing_window() {
    let candles = daily_candles(&[1.0, 1.0, 1.0, 1.0], &[999.0, 10.0, 30.0, 40.0]);
    assert_eq!(volume_ratio(&candles, 2), 2.0);
    assert_eq!(volume_ratio(&candles, 29), 40.0 / (1039.0 / 3.0));
}

#[test]
fn test_volume_ratio_zero_average() {
    let candles = daily_candles(&[1.0, 1.0, 1.0], &[0.0, 0.0, 500.0]);
    assert_eq!(volume_ratio(&candles, 29), 0.0);
    assert_eq!(volume_ratio(&[], 29), 0.0);
}

#[tokio::test]
async fn test_analyzer_fetches_window_ending_now() {
    let provider = InMemoryMarketDataProvider::new().with_history("FLAT", flat_candles(90, 100.0));
    let analyzer = Analyzer::new(Arc::new(provider), AnalyzerConfig::default());

    // 40 days of a 90-day history is still enough bars.
    let record = analyzer.analyze_at("FLAT", "Flat", 40, now()).await.unwrap();
    assert!(record.is_some());

    // 20 days is not.
    let record = analyzer.analyze_at("FLAT", "Flat", 20, now()).await.unwrap();
    assert!(record.is_none());
}

#[tokio::test]
async fn test_analyzer_unknown_instrument_is_absent() {
    let analyzer = Analyzer::new(
        Arc::new(InMemoryMarketDataProvider::new()),
        AnalyzerConfig::default(),
    );
    let record = analyzer.analyze_at("NOPE", "Nope", 60, now()).await.unwrap();
    assert!(record.is_none());
}

#[tokio::test]
async fn test_analyzer_provider_failure() {
    let provider = InMemoryMarketDataProvider::new().with_failure("DOWN");
    let analyzer = Analyzer::new(Arc::new(provider), AnalyzerConfig::default());

    let err = analyzer.analyze_at("DOWN", "Down", 60, now()).await.unwrap_err();
    assert!(matches!(err, AnalysisFailure::Provider(_)));
}

#[test]
fn test_volume_surge_against_twenty_bar_average() {
    let mut volumes = vec![5000.0; 10];
    volumes.extend(vec![1000.0; 20]);
    volumes.push(2500.0);
    let mut closes = vec![100.0; 30];
    closes.push(102.0);
    let candles = daily_candles(&closes, &volumes);

    let record = evaluate_volume_surge("SRG", "Surge Co", &candles, &VolumeScanConfig::default())
        .unwrap()
        .expect("2.5x is a surge");
    assert_eq!(record.volume, 2500.0);
    assert_eq!(record.average_volume, 1000.0);
    assert_eq!(record.volume_ratio, 2.5);
    assert_eq!(record.close, 102.0);
    assert_eq!(record.price_change_pct, 2.0);
}

#[test]
fn test_volume_below_ratio_is_not_a_surge() {
    let mut volumes = vec![1000.0; 25];
    volumes[24] = 1499.0;
    let candles = daily_candles(&vec![100.0; 25], &volumes);
    let result = evaluate_volume_surge("CALM", "Calm", &candles, &VolumeScanConfig::default()).unwrap();
    assert!(result.is_none());

    volumes[24] = 1500.0;
    let candles = daily_candles(&vec![100.0; 25], &volumes);
    let result = evaluate_volume_surge("EDGE", "Edge", &candles, &VolumeScanConfig::default()).unwrap();
    assert_eq!(result.unwrap().volume_ratio, 1.5);
}

#[test]
fn test_volume_surge_skips_zero_average_and_short_history() {
    let mut volumes = vec![0.0; 25];
    volumes[24] = 1000.0;
    let candles = daily_candles(&vec![100.0; 25], &volumes);
    assert!(evaluate_volume_surge("ZERO", "Zero", &candles, &VolumeScanConfig::default())
        .unwrap()
        .is_none());

    let candles = flat_candles(19, 100.0);
    assert!(evaluate_volume_surge("NEW", "New", &candles, &VolumeScanConfig::default())
        .unwrap()
        .is_none());
}

#[test]
fn test_average_volume_is_truncated() {
    let mut volumes = vec![1000.0; 19];
    volumes.push(1001.0);
    volumes.push(4000.0);
    let candles = daily_candles(&vec![100.0; 21], &volumes);

    assert_eq!(trailing_average_volume(&candles, 20), Some(1000.05));
    let record = evaluate_volume_surge("TRN", "Trunc", &candles, &VolumeScanConfig::default())
        .unwrap()
        .unwrap();
    assert_eq!(record.average_volume, 1000.0);
}

#[test]
fn test_history_window_bounds() {
    assert_eq!(history_start(now(), 60).unwrap(), now() - Duration::days(60));
    assert!(matches!(
        history_start(now(), 0),
        Err(AnalysisFailure::HistoryWindow(0))
    ));
    assert!(matches!(
        history_start(now(), 1_000_000_000),
        Err(AnalysisFailure::HistoryWindow(1_000_000_000))
    ));
    assert!(matches!(
        history_start(now(), i64::MAX),
        Err(AnalysisFailure::HistoryWindow(_))
    ));
}

#[tokio::test]
async fn test_oversized_window_fails_without_panicking() {
    let provider = InMemoryMarketDataProvider::new().with_history("AAA", flat_candles(40, 100.0));
    let analyzer = Analyzer::new(Arc::new(provider), AnalyzerConfig::default());

    let err = analyzer
        .analyze_at("AAA", "Alpha", 1_000_000_000, now())
        .await
        .unwrap_err();
    assert!(matches!(err, AnalysisFailure::HistoryWindow(_)));
}

#[tokio::test]
async fn test_analyzer_volume_surge_reads_recent_window() {
    let mut volumes = vec![1000.0; 40];
    volumes[39] = 3000.0;
    let provider = InMemoryMarketDataProvider::new()
        .with_history("VOL", daily_candles(&vec![100.0; 40], &volumes));
    let analyzer = Analyzer::new(Arc::new(provider), AnalyzerConfig::default());

    let record = analyzer
        .volume_surge_at("VOL", "Volume Co", &VolumeScanConfig::default(), now())
        .await
        .unwrap()
        .expect("30 day window holds more than 20 bars");
    assert_eq!(record.volume_ratio, 3.0);
}
