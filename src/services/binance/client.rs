//! Thin REST client for the Binance `/api/v3/klines` endpoint.

use crate::models::indicators::Candle;
use crate::services::error::ProviderError;
use chrono::DateTime;
use reqwest::StatusCode;
use serde_json::Value;
use std::time::Duration;
use url::Url;

/// Binance error code for an unknown trading pair.
const INVALID_SYMBOL_CODE: i64 = -1121;
const MAX_KLINES: u32 = 1000;

pub struct BinanceRestClient {
    base_url: Url,
    http: reqwest::Client,
    timeout: Duration,
}

impl BinanceRestClient {
    pub fn new(base_url: &str) -> Result<Self, ProviderError> {
        Self::with_client(base_url, reqwest::Client::new())
    }

    pub fn with_client(base_url: &str, http: reqwest::Client) -> Result<Self, ProviderError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ProviderError::Parse(format!("invalid base URL '{}': {}", base_url, e)))?;
        Ok(Self {
            base_url,
            http,
            timeout: Duration::from_secs(10),
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Daily klines for `symbol` (e.g. `BTCUSDT`) between two epoch-millisecond
    /// bounds. An invalid symbol yields an empty vector.
    pub async fn daily_klines(
        &self,
        symbol: &str,
        start_ms: i64,
        end_ms: i64,
    ) -> Result<Vec<Candle>, ProviderError> {
        let url = self
            .base_url
            .join("/api/v3/klines")
            .map_err(|e| ProviderError::Parse(e.to_string()))?;
        let start = start_ms.to_string();
        let end = end_ms.to_string();
        let limit = MAX_KLINES.to_string();

        let response = self
            .http
            .get(url)
            .query(&[
                ("symbol", symbol),
                ("interval", "1d"),
                ("startTime", start.as_str()),
                ("endTime", end.as_str()),
                ("limit", limit.as_str()),
            ])
            .timeout(self.timeout)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::BAD_REQUEST {
            let body = response.text().await.unwrap_or_default();
            if is_invalid_symbol(&body) {
                return Ok(Vec::new());
            }
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body,
            });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let rows: Vec<Vec<Value>> = response.json().await?;
        rows.iter().map(|row| parse_kline(row)).collect()
    }
}

fn is_invalid_symbol(body: &str) -> bool {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("code").and_then(Value::as_i64))
        == Some(INVALID_SYMBOL_CODE)
}

/// `[open_time, "open", "high", "low", "close", "volume", close_time, ...]`
fn parse_kline(row: &[Value]) -> Result<Candle, ProviderError> {
    let open_time = row
        .first()
        .and_then(Value::as_i64)
        .ok_or_else(|| ProviderError::Parse(format!("kline without open time: {:?}", row)))?;
    let timestamp = DateTime::from_timestamp(
        open_time.div_euclid(1000),
        (open_time.rem_euclid(1000) * 1_000_000) as u32,
    )
    .ok_or_else(|| ProviderError::Parse(format!("open time out of range: {}", open_time)))?;

    let field = |index: usize, name: &str| -> Result<f64, ProviderError> {
        let value = row
            .get(index)
            .ok_or_else(|| ProviderError::Parse(format!("kline missing {}", name)))?;
        match value {
            Value::String(s) => s
                .parse::<f64>()
                .map_err(|e| ProviderError::Parse(format!("invalid {} '{}': {}", name, s, e))),
            Value::Number(n) => n
                .as_f64()
                .ok_or_else(|| ProviderError::Parse(format!("invalid {}", name))),
            other => Err(ProviderError::Parse(format!("invalid {}: {}", name, other))),
        }
    };

    Ok(Candle::new(
        field(1, "open")?,
        field(2, "high")?,
        field(3, "low")?,
        field(4, "close")?,
        field(5, "volume")?,
        timestamp,
    ))
}
