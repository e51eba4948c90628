//! Equity listing and daily history read from CSV exports.
//!
//! Listing: `Code,Name,Marcap` (extra columns ignored).
//! History: one `<dir>/<code>.csv` per instrument with
//! `Date,Open,High,Low,Close,Volume`.

use crate::models::indicators::Candle;
use crate::models::universe::UniverseEntry;
use crate::services::error::ProviderError;
use crate::services::market_data::{MarketDataProvider, UniverseProvider};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Deserialize)]
struct ListingRow {
    #[serde(rename = "Code")]
    code: Option<String>,
    #[serde(rename = "Name")]
    name: Option<String>,
    #[serde(rename = "Marcap", default)]
    market_cap: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct HistoryRow {
    #[serde(rename = "Date")]
    date: NaiveDate,
    #[serde(rename = "Open")]
    open: f64,
    #[serde(rename = "High")]
    high: f64,
    #[serde(rename = "Low")]
    low: f64,
    #[serde(rename = "Close")]
    close: f64,
    #[serde(rename = "Volume")]
    volume: f64,
}

/// Equity universe from a market listing, optionally cut to the largest
/// `top_n` by market capitalization.
#[derive(Debug, Clone)]
pub struct CsvListingUniverse {
    path: PathBuf,
    top_n: Option<usize>,
}

impl CsvListingUniverse {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            top_n: None,
        }
    }

    /// Keep only the `top_n` largest instruments; 0 disables the cut.
    pub fn with_top_by_market_cap(mut self, top_n: usize) -> Self {
        self.top_n = (top_n > 0).then_some(top_n);
        self
    }
}

#[async_trait]
impl UniverseProvider for CsvListingUniverse {
    async fn list_universe(&self) -> Result<Vec<UniverseEntry>, ProviderError> {
        let bytes = tokio::fs::read(&self.path).await?;
        let mut reader = csv::Reader::from_reader(bytes.as_slice());

        let mut entries = Vec::new();
        for row in reader.deserialize::<ListingRow>() {
            let row = row?;
            let Some(code) = row.code.map(|c| c.trim().to_string()).filter(|c| !c.is_empty()) else {
                continue;
            };
            let name = row
                .name
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| code.clone());
            let entry = UniverseEntry::new(code, name);
            entries.push(match row.market_cap {
                Some(cap) => entry.with_market_cap(cap),
                None => entry,
            });
        }

        let has_market_cap = entries.iter().any(|e| e.market_cap.is_some());
        if let (Some(top_n), true) = (self.top_n, has_market_cap) {
            // Stable sort keeps listing order among equal or missing caps.
            entries.sort_by(|a, b| {
                let (a, b) = (a.market_cap.unwrap_or(f64::MIN), b.market_cap.unwrap_or(f64::MIN));
                b.total_cmp(&a)
            });
            entries.truncate(top_n);
        }

        debug!(
            path = %self.path.display(),
            count = entries.len(),
            "CsvListingUniverse: loaded {} instruments",
            entries.len()
        );
        Ok(entries)
    }
}

/// Daily equity bars from per-instrument CSV files.
#[derive(Debug, Clone)]
pub struct CsvMarketDataProvider {
    dir: PathBuf,
}

impl CsvMarketDataProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn history_path(&self, instrument_id: &str) -> Option<PathBuf> {
        let file_name = format!("{}.csv", instrument_id);
        // Ids are file stems; anything that could escape the directory is unknown.
        if Path::new(&file_name).components().count() != 1 {
            return None;
        }
        Some(self.dir.join(file_name))
    }
}

#[async_trait]
impl MarketDataProvider for CsvMarketDataProvider {
    async fn fetch_history(
        &self,
        instrument_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Candle>, ProviderError> {
        let Some(path) = self.history_path(instrument_id) else {
            return Ok(Vec::new());
        };

        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let (start_day, end_day) = (start.date_naive(), end.date_naive());
        let mut reader = csv::Reader::from_reader(bytes.as_slice());
        let mut candles = Vec::new();
        for row in reader.deserialize::<HistoryRow>() {
            let row = row?;
            if row.date < start_day || row.date > end_day {
                continue;
            }
            candles.push(Candle::new(
                row.open,
                row.high,
                row.low,
                row.close,
                row.volume,
                row.date.and_time(chrono::NaiveTime::MIN).and_utc(),
            ));
        }
        candles.sort_by_key(|c| c.timestamp);

        Ok(candles)
    }
}
