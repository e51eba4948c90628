//! Binance-backed market data provider.

use crate::models::indicators::Candle;
use crate::services::binance::client::BinanceRestClient;
use crate::services::error::ProviderError;
use crate::services::market_data::MarketDataProvider;
use async_trait::async_trait;
use backon::{ExponentialBuilder, Retryable};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Resolves an asset symbol (`BTC`) to a trading pair (`BTCUSDT`) and fetches
/// its daily klines, retrying transient failures with exponential backoff.
pub struct BinanceMarketDataProvider {
    client: Arc<BinanceRestClient>,
    quote_asset: String,
    max_retries: usize,
    min_delay: Duration,
}

impl BinanceMarketDataProvider {
    pub fn new(client: Arc<BinanceRestClient>, quote_asset: impl Into<String>) -> Self {
        Self {
            client,
            quote_asset: quote_asset.into().to_uppercase(),
            max_retries: 3,
            min_delay: Duration::from_millis(200),
        }
    }

    pub fn with_retries(mut self, max_retries: usize, min_delay: Duration) -> Self {
        self.max_retries = max_retries;
        self.min_delay = min_delay;
        self
    }

    pub fn market_symbol(&self, asset: &str) -> String {
        let asset = asset.trim().to_uppercase();
        if asset.len() > self.quote_asset.len() && asset.ends_with(&self.quote_asset) {
            asset
        } else {
            format!("{}{}", asset, self.quote_asset)
        }
    }

    fn backoff(&self) -> ExponentialBuilder {
        ExponentialBuilder::default()
            .with_min_delay(self.min_delay)
            .with_max_times(self.max_retries)
    }
}

#[async_trait]
impl MarketDataProvider for BinanceMarketDataProvider {
    async fn fetch_history(
        &self,
        instrument_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Candle>, ProviderError> {
        let symbol = self.market_symbol(instrument_id);
        let client = &self.client;
        let pair = symbol.as_str();
        let (start_ms, end_ms) = (start.timestamp_millis(), end.timestamp_millis());

        let candles = (|| async move { client.daily_klines(pair, start_ms, end_ms).await })
            .retry(self.backoff())
            .when(|e: &ProviderError| e.is_retryable())
            .notify(|e: &ProviderError, delay: Duration| {
                warn!(
                    symbol = %pair,
                    error = %e,
                    delay_ms = delay.as_millis() as u64,
                    "Binance: retrying klines for {} in {:?}",
                    pair,
                    delay
                );
            })
            .await?;

        debug!(
            symbol = %symbol,
            count = candles.len(),
            "Binance: fetched {} daily klines for {}",
            candles.len(),
            symbol
        );

        Ok(candles)
    }
}
