//! Prometheus metrics for the HTTP layer and screening passes.

use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};

pub struct Metrics {
    registry: Registry,
    pub http_requests_total: IntCounter,
    pub http_request_duration_seconds: Histogram,
    pub http_requests_in_flight: IntGauge,
    /// Completed screening passes, labelled by profile.
    pub scans_total: IntCounterVec,
    /// Completed volume-surge passes, labelled by profile.
    pub volume_scans_total: IntCounterVec,
    pub scan_duration_seconds: Histogram,
    pub instruments_analyzed_total: IntCounter,
    pub analysis_failures_total: IntCounter,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let http_requests_total =
            IntCounter::with_opts(Opts::new("http_requests_total", "Total HTTP requests"))?;
        let http_request_duration_seconds = Histogram::with_opts(HistogramOpts::new(
            "http_request_duration_seconds",
            "HTTP request latency in seconds",
        ))?;
        let http_requests_in_flight = IntGauge::with_opts(Opts::new(
            "http_requests_in_flight",
            "HTTP requests currently being served",
        ))?;
        let scans_total = IntCounterVec::new(
            Opts::new("scans_total", "Completed screening passes"),
            &["profile"],
        )?;
        let volume_scans_total = IntCounterVec::new(
            Opts::new("volume_scans_total", "Completed volume-surge passes"),
            &["profile"],
        )?;
        let scan_duration_seconds = Histogram::with_opts(
            HistogramOpts::new("scan_duration_seconds", "Screening pass duration in seconds")
                .buckets(vec![1.0, 5.0, 15.0, 30.0, 60.0, 120.0, 300.0, 600.0]),
        )?;
        let instruments_analyzed_total = IntCounter::with_opts(Opts::new(
            "instruments_analyzed_total",
            "Instruments visited by screening passes",
        ))?;
        let analysis_failures_total = IntCounter::with_opts(Opts::new(
            "analysis_failures_total",
            "Instrument analyses that failed",
        ))?;

        registry.register(Box::new(http_requests_total.clone()))?;
        registry.register(Box::new(http_request_duration_seconds.clone()))?;
        registry.register(Box::new(http_requests_in_flight.clone()))?;
        registry.register(Box::new(scans_total.clone()))?;
        registry.register(Box::new(volume_scans_total.clone()))?;
        registry.register(Box::new(scan_duration_seconds.clone()))?;
        registry.register(Box::new(instruments_analyzed_total.clone()))?;
        registry.register(Box::new(analysis_failures_total.clone()))?;

        Ok(Self {
            registry,
            http_requests_total,
            http_request_duration_seconds,
            http_requests_in_flight,
            scans_total,
            volume_scans_total,
            scan_duration_seconds,
            instruments_analyzed_total,
            analysis_failures_total,
        })
    }

    /// Render every metric in the Prometheus text exposition format.
    pub fn export(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
