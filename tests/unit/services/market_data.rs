//! Unit tests for in-memory market data and static universes

use chrono::{Duration, TimeZone, Utc};
use tickerscan::models::indicators::Candle;
use tickerscan::services::{
    InMemoryMarketDataProvider, MarketDataProvider, ProviderError, StaticUniverse,
    UniverseProvider,
};

#[tokio::test]
async fn test_static_universe_from_symbols() {
    let universe = StaticUniverse::from_symbols(["BTC", "ETH"]);
    let entries = universe.list_universe().await.unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].instrument_id, "BTC");
    assert_eq!(entries[0].display_name, "BTC");
    assert!(entries[0].market_cap.is_none());
}

#[tokio::test]
async fn test_in_memory_history_is_filtered_by_range() {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let candles: Vec<Candle> = (0..10)
        .map(|i| Candle::new(1.0, 1.0, 1.0, 1.0, 1.0, start + Duration::days(i)))
        .collect();
    let provider = InMemoryMarketDataProvider::new().with_history("X", candles);

    let window = provider
        .fetch_history("X", start + Duration::days(2), start + Duration::days(5))
        .await
        .unwrap();
    assert_eq!(window.len(), 4);
    assert_eq!(window[0].timestamp, start + Duration::days(2));
}

#[tokio::test]
async fn test_in_memory_failure() {
    let provider = InMemoryMarketDataProvider::new().with_failure("X");
    let now = Utc::now();
    let err = provider.fetch_history("X", now, now).await.unwrap_err();
    assert!(matches!(err, ProviderError::Unavailable(_)));
    assert!(!err.is_retryable());
}

#[test]
fn test_status_errors_retry_only_when_transient() {
    let server_error = ProviderError::Status {
        status: 503,
        body: String::new(),
    };
    let rate_limited = ProviderError::Status {
        status: 429,
        body: String::new(),
    };
    let bad_request = ProviderError::Status {
        status: 400,
        body: String::new(),
    };
    assert!(server_error.is_retryable());
    assert!(rate_limited.is_retryable());
    assert!(!bad_request.is_retryable());
}
