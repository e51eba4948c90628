//! Universe screening: analyze every instrument, keep candidates, rank.

use crate::config::VolumeScanConfig;
use crate::metrics::Metrics;
use crate::models::signal::{
    ScreeningFailure, ScreeningResult, SignalRecord, VolumeSurgeRecord, VolumeSurgeResult,
};
use crate::models::universe::UniverseEntry;
use crate::services::market_data::UniverseProvider;
use crate::signals::{AnalysisFailure, Analyzer};
use chrono::{DateTime, Utc};
use futures_util::future::FutureExt;
use futures_util::stream::{self, StreamExt};
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

pub const DEFAULT_CONCURRENCY: usize = 8;
pub const DEFAULT_HISTORY_DAYS: i64 = 60;
const PROGRESS_EVERY: usize = 100;

/// Order by signal count (highest first), then instrument id, and keep `limit`.
pub fn rank_records(records: &mut Vec<SignalRecord>, limit: usize) {
    records.sort_by(|a, b| {
        b.signal_count
            .cmp(&a.signal_count)
            .then_with(|| a.instrument_id.cmp(&b.instrument_id))
    });
    records.truncate(limit);
}

/// Order by volume ratio (highest first), then instrument id, and keep `limit`.
pub fn rank_volume_surges(records: &mut Vec<VolumeSurgeRecord>, limit: usize) {
    records.sort_by(|a, b| {
        b.volume_ratio
            .total_cmp(&a.volume_ratio)
            .then_with(|| a.instrument_id.cmp(&b.instrument_id))
    });
    records.truncate(limit);
}

/// Everything one pass over a universe produced, before ranking.
struct Collected<T> {
    found: Vec<T>,
    failures: Vec<ScreeningFailure>,
    visited: usize,
    elapsed: Duration,
}

#[derive(Clone)]
pub struct Screener {
    analyzer: Analyzer,
    concurrency: usize,
    history_days: i64,
    volume_scan: VolumeScanConfig,
    metrics: Option<Arc<Metrics>>,
}

impl Screener {
    pub fn new(analyzer: Analyzer) -> Self {
        Self {
            analyzer,
            concurrency: DEFAULT_CONCURRENCY,
            history_days: DEFAULT_HISTORY_DAYS,
            volume_scan: VolumeScanConfig::default(),
            metrics: None,
        }
    }

    /// Maximum analyses in flight; clamped to at least one.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_history_days(mut self, days: i64) -> Self {
        self.history_days = days;
        self
    }

    pub fn with_volume_scan(mut self, volume_scan: VolumeScanConfig) -> Self {
        self.volume_scan = volume_scan;
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn analyzer(&self) -> &Analyzer {
        &self.analyzer
    }

    pub fn history_days(&self) -> i64 {
        self.history_days
    }

    pub fn volume_scan(&self) -> &VolumeScanConfig {
        &self.volume_scan
    }

    pub async fn screen(&self, universe: &[UniverseEntry], limit: usize) -> ScreeningResult {
        self.screen_at(universe, limit, Utc::now()).await
    }

    /// Screen `universe` with every history window ending at `now`.
    ///
    /// Execution order never leaks into the output: records are ranked after
    /// all analyses finish and failures are sorted by instrument id.
    pub async fn screen_at(
        &self,
        universe: &[UniverseEntry],
        limit: usize,
        now: DateTime<Utc>,
    ) -> ScreeningResult {
        info!(
            total = universe.len(),
            limit,
            concurrency = self.concurrency,
            "Screener: scanning {} instruments",
            universe.len()
        );

        let analyzer = &self.analyzer;
        let days = self.history_days;
        let collected = self
            .analyze_all(universe, move |entry| async move {
                analyzer
                    .analyze_at(&entry.instrument_id, &entry.display_name, days, now)
                    .await
                    .map(|record| record.filter(SignalRecord::is_candidate))
            })
            .await;

        let mut records = collected.found;
        let candidates = records.len();
        rank_records(&mut records, limit);
        info!(
            total = universe.len(),
            candidates,
            kept = records.len(),
            elapsed_ms = collected.elapsed.as_millis() as u64,
            "Screener: {} candidates out of {} instruments, keeping {}",
            candidates,
            universe.len(),
            records.len()
        );

        ScreeningResult {
            records,
            failures: collected.failures,
            scanned: collected.visited,
            generated_at: now,
        }
    }

    /// List the universe from `source` and screen it.
    ///
    /// A listing fault is logged and yields an empty result.
    pub async fn screen_source(
        &self,
        source: &dyn UniverseProvider,
        limit: usize,
    ) -> ScreeningResult {
        match source.list_universe().await {
            Ok(universe) => self.screen(&universe, limit).await,
            Err(e) => {
                error!(error = %e, "Screener: failed to list universe");
                ScreeningResult::empty()
            }
        }
    }

    pub async fn screen_volume_surges(
        &self,
        universe: &[UniverseEntry],
        limit: usize,
    ) -> VolumeSurgeResult {
        self.screen_volume_surges_at(universe, limit, Utc::now()).await
    }

    /// Rank `universe` by how far the latest volume exceeds its recent
    /// average, keeping instruments at or above the configured ratio.
    pub async fn screen_volume_surges_at(
        &self,
        universe: &[UniverseEntry],
        limit: usize,
        now: DateTime<Utc>,
    ) -> VolumeSurgeResult {
        info!(
            total = universe.len(),
            limit,
            lookback = self.volume_scan.lookback,
            min_ratio = self.volume_scan.min_ratio,
            "Screener: volume scan over {} instruments",
            universe.len()
        );

        let analyzer = &self.analyzer;
        let config = &self.volume_scan;
        let collected = self
            .analyze_all(universe, move |entry| async move {
                analyzer
                    .volume_surge_at(&entry.instrument_id, &entry.display_name, config, now)
                    .await
            })
            .await;

        let mut records = collected.found;
        let surges = records.len();
        rank_volume_surges(&mut records, limit);
        info!(
            total = universe.len(),
            surges,
            kept = records.len(),
            elapsed_ms = collected.elapsed.as_millis() as u64,
            "Screener: {} volume surges out of {} instruments, keeping {}",
            surges,
            universe.len(),
            records.len()
        );

        VolumeSurgeResult {
            records,
            failures: collected.failures,
            scanned: collected.visited,
            generated_at: now,
        }
    }

    /// List the universe from `source` and rank its volume surges.
    pub async fn screen_volume_source(
        &self,
        source: &dyn UniverseProvider,
        limit: usize,
    ) -> VolumeSurgeResult {
        match source.list_universe().await {
            Ok(universe) => self.screen_volume_surges(&universe, limit).await,
            Err(e) => {
                error!(error = %e, "Screener: failed to list universe");
                VolumeSurgeResult::empty()
            }
        }
    }

    /// Run `analyze` over every entry with bounded concurrency.
    ///
    /// Each analysis is isolated: an error or a panic becomes a
    /// `ScreeningFailure` and the pass carries on.
    async fn analyze_all<T, F, Fut>(&self, universe: &[UniverseEntry], analyze: F) -> Collected<T>
    where
        F: Fn(UniverseEntry) -> Fut,
        Fut: Future<Output = Result<Option<T>, AnalysisFailure>>,
    {
        let total = universe.len();
        let started = Instant::now();

        let mut outcomes = stream::iter(universe.iter().cloned())
            .map(|entry| {
                let analysis = AssertUnwindSafe(analyze(entry.clone())).catch_unwind();
                async move {
                    let outcome = analysis.await.unwrap_or_else(|payload| {
                        Err(AnalysisFailure::Panicked(panic_message(payload)))
                    });
                    (entry, outcome)
                }
            })
            .buffer_unordered(self.concurrency);

        let mut found = Vec::new();
        let mut failures = Vec::new();
        let mut visited = 0usize;

        while let Some((entry, outcome)) = outcomes.next().await {
            visited += 1;
            if visited % PROGRESS_EVERY == 0 {
                info!(visited, total, "Screener: progress {}/{}", visited, total);
            }

            match outcome {
                Ok(Some(item)) => found.push(item),
                Ok(None) => {}
                Err(failure) => {
                    if let AnalysisFailure::Panicked(_) = &failure {
                        warn!(
                            instrument = %entry.instrument_id,
                            error = %failure,
                            "Screener: analysis panicked for {}",
                            entry.instrument_id
                        );
                    }
                    failures.push(ScreeningFailure {
                        instrument_id: entry.instrument_id,
                        reason: failure.to_string(),
                    });
                }
            }
        }

        failures.sort_by(|a, b| a.instrument_id.cmp(&b.instrument_id));

        let elapsed = started.elapsed();
        if let Some(metrics) = &self.metrics {
            metrics.instruments_analyzed_total.inc_by(visited as u64);
            metrics.analysis_failures_total.inc_by(failures.len() as u64);
            metrics.scan_duration_seconds.observe(elapsed.as_secs_f64());
        }

        if !failures.is_empty() {
            warn!(
                failed = failures.len(),
                total,
                "Screener: {} of {} instruments failed analysis",
                failures.len(),
                total
            );
        }

        Collected {
            found,
            failures,
            visited,
            elapsed,
        }
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "analysis panicked".to_string()
    }
}
