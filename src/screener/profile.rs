use crate::models::signal::{ScreeningResult, VolumeSurgeResult};
use crate::screener::pipeline::Screener;
use crate::services::market_data::UniverseProvider;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Which market a screening pass covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanProfile {
    Equity,
    Crypto,
}

impl ScanProfile {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanProfile::Equity => "equity",
            ScanProfile::Crypto => "crypto",
        }
    }

    pub fn heading(&self) -> &'static str {
        match self {
            ScanProfile::Equity => "Equities",
            ScanProfile::Crypto => "Crypto",
        }
    }

    pub fn default_limit(&self) -> usize {
        10
    }
}

impl fmt::Display for ScanProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A screener bound to its universe and result limit.
#[derive(Clone)]
pub struct ProfileScan {
    pub profile: ScanProfile,
    screener: Screener,
    universe: Arc<dyn UniverseProvider>,
    limit: usize,
}

impl ProfileScan {
    pub fn new(profile: ScanProfile, screener: Screener, universe: Arc<dyn UniverseProvider>) -> Self {
        Self {
            profile,
            screener,
            universe,
            limit: profile.default_limit(),
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn screener(&self) -> &Screener {
        &self.screener
    }

    pub async fn run(&self) -> ScreeningResult {
        self.run_with_limit(self.limit).await
    }

    pub async fn run_with_limit(&self, limit: usize) -> ScreeningResult {
        self.screener.screen_source(self.universe.as_ref(), limit).await
    }

    /// Volume-surge ranking over the same universe.
    pub async fn run_volume_surges(&self, limit: usize) -> VolumeSurgeResult {
        self.screener
            .screen_volume_source(self.universe.as_ref(), limit)
            .await
    }
}
