//! Unit tests for MACD line

use chrono::{Duration, TimeZone, Utc};
use tickerscan::indicators::momentum::{calculate_macd, calculate_macd_default};
use tickerscan::indicators::trend::calculate_ema;
use tickerscan::models::indicators::Candle;

fn create_test_candles(count: usize, base_price: f64, step: f64) -> Vec<Candle> {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    (0..count)
        .map(|i| {
            let price = base_price + i as f64 * step;
            Candle::new(price, price + 0.5, price - 0.5, price, 1000.0, start + Duration::days(i as i64))
        })
        .collect()
}

#[test]
fn test_macd_defined_from_slow_period() {
    let candles = create_test_candles(40, 100.0, 1.0);
    let macd = calculate_macd_default(&candles);
    assert_eq!(macd.len(), 40);
    assert!(macd[..25].iter().all(Option::is_none));
    assert!(macd[25].is_some());
}

#[test]
fn test_macd_is_fast_minus_slow() {
    let candles = create_test_candles(40, 100.0, 0.5);
    let macd = calculate_macd(&candles, 12, 26);
    let fast = calculate_ema(&candles, 12);
    let slow = calculate_ema(&candles, 26);
    let expected = fast[39].unwrap() - slow[39].unwrap();
    assert!((macd[39].unwrap() - expected).abs() < 1e-12);
}

#[test]
fn test_macd_sign_follows_trend() {
    let rising = calculate_macd_default(&create_test_candles(60, 100.0, 1.0));
    let falling = calculate_macd_default(&create_test_candles(60, 200.0, -1.0));
    assert!(rising[59].unwrap() > 0.0);
    assert!(falling[59].unwrap() < 0.0);
}

#[test]
fn test_macd_insufficient_data() {
    let macd = calculate_macd_default(&create_test_candles(20, 100.0, 1.0));
    assert!(macd.iter().all(Option::is_none));
}
