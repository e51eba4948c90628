//! Market data and universe provider interfaces.

use crate::models::indicators::Candle;
use crate::models::universe::UniverseEntry;
use crate::services::error::ProviderError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};

#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Daily bars for `instrument_id` between `start` and `end` (inclusive),
    /// oldest first. Unknown or delisted instruments yield an empty vector.
    async fn fetch_history(
        &self,
        instrument_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Candle>, ProviderError>;
}

#[async_trait]
pub trait UniverseProvider: Send + Sync {
    /// Instruments to screen, in the order they should be visited.
    async fn list_universe(&self) -> Result<Vec<UniverseEntry>, ProviderError>;
}

/// A fixed, curated universe (the crypto watch list).
#[derive(Debug, Clone, Default)]
pub struct StaticUniverse {
    entries: Vec<UniverseEntry>,
}

impl StaticUniverse {
    pub fn new(entries: Vec<UniverseEntry>) -> Self {
        Self { entries }
    }

    /// Universe whose ids double as display names.
    pub fn from_symbols<I, S>(symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entries = symbols
            .into_iter()
            .map(|s| {
                let symbol = s.into();
                UniverseEntry::new(symbol.clone(), symbol)
            })
            .collect();
        Self { entries }
    }
}

#[async_trait]
impl UniverseProvider for StaticUniverse {
    async fn list_universe(&self) -> Result<Vec<UniverseEntry>, ProviderError> {
        Ok(self.entries.clone())
    }
}

/// Histories held in memory; used for replaying snapshots and in tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryMarketDataProvider {
    histories: HashMap<String, Vec<Candle>>,
    failing: HashSet<String>,
}

impl InMemoryMarketDataProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_history(mut self, instrument_id: impl Into<String>, candles: Vec<Candle>) -> Self {
        self.histories.insert(instrument_id.into(), candles);
        self
    }

    /// Make every fetch for `instrument_id` fail with `ProviderError::Unavailable`.
    pub fn with_failure(mut self, instrument_id: impl Into<String>) -> Self {
        self.failing.insert(instrument_id.into());
        self
    }
}

#[async_trait]
impl MarketDataProvider for InMemoryMarketDataProvider {
    async fn fetch_history(
        &self,
        instrument_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Candle>, ProviderError> {
        if self.failing.contains(instrument_id) {
            return Err(ProviderError::Unavailable(format!(
                "no route to history for {}",
                instrument_id
            )));
        }

        Ok(self
            .histories
            .get(instrument_id)
            .map(|candles| {
                candles
                    .iter()
                    .filter(|c| c.timestamp >= start && c.timestamp <= end)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}
