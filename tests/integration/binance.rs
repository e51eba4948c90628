//! Integration tests for the Binance kline source

use chrono::{Duration, TimeZone, Utc};
use serde_json::json;
use std::sync::Arc;
use tickerscan::services::{
    BinanceMarketDataProvider, BinanceRestClient, MarketDataProvider, ProviderError,
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const DAY_MS: i64 = 86_400_000;

fn provider_for(server: &MockServer) -> BinanceMarketDataProvider {
    let client = BinanceRestClient::with_client(&server.uri(), reqwest::Client::new())
        .expect("valid mock url");
    BinanceMarketDataProvider::new(Arc::new(client), "USDT")
        .with_retries(2, std::time::Duration::from_millis(1))
}

fn kline(open_time: i64, close: &str) -> serde_json::Value {
    json!([
        open_time,
        "100.0",
        "110.0",
        "90.0",
        close,
        "1234.5",
        open_time + DAY_MS - 1,
        "0",
        10,
        "0",
        "0",
        "0"
    ])
}

#[tokio::test]
async fn fetches_daily_klines_for_quote_pair() {
    let server = MockServer::start().await;
    let first = 1_704_067_200_000; // 2024-01-01
    Mock::given(method("GET"))
        .and(path("/api/v3/klines"))
        .and(query_param("symbol", "BTCUSDT"))
        .and(query_param("interval", "1d"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([kline(first, "105.5"), kline(first + DAY_MS, "107.25")])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let candles = provider_for(&server)
        .fetch_history("btc", start, start + Duration::days(2))
        .await
        .unwrap();

    assert_eq!(candles.len(), 2);
    assert_eq!(candles[0].timestamp, start);
    assert_eq!(candles[0].close, 105.5);
    assert_eq!(candles[1].close, 107.25);
    assert_eq!(candles[1].volume, 1234.5);
}

#[tokio::test]
async fn invalid_symbol_is_empty_history() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/klines"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"code": -1121, "msg": "Invalid symbol."})),
        )
        .mount(&server)
        .await;

    let now = Utc::now();
    let candles = provider_for(&server)
        .fetch_history("DELISTED", now - Duration::days(60), now)
        .await
        .unwrap();
    assert!(candles.is_empty());
}

#[tokio::test]
async fn server_errors_are_retried_then_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/klines"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .expect(3)
        .mount(&server)
        .await;

    let now = Utc::now();
    let err = provider_for(&server)
        .fetch_history("ETH", now - Duration::days(60), now)
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::Status { status: 503, .. }));
}

#[tokio::test]
async fn client_errors_are_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/klines"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"code": -1100, "msg": "Illegal characters"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let now = Utc::now();
    let err = provider_for(&server)
        .fetch_history("ETH", now - Duration::days(60), now)
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::Status { status: 400, .. }));
}

#[tokio::test]
async fn transient_failure_recovers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/klines"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v3/klines"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([kline(0, "1.5")])))
        .mount(&server)
        .await;

    let now = Utc::now();
    let candles = provider_for(&server)
        .fetch_history("SOL", now - Duration::days(60), now)
        .await
        .unwrap();
    assert_eq!(candles.len(), 1);
}
