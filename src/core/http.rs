//! HTTP endpoint server using Axum

use axum::{
    extract::{Path, Query, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tokio::sync::RwLock;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{error, info, Level};

use crate::config::{Config, MAX_HISTORY_DAYS};
use crate::core::runtime::{FullScan, ScanContext};
use crate::metrics::Metrics;
use crate::models::signal::{ScreeningResult, SignalRecord, VolumeSurgeResult};
use crate::report::{
    render_help, render_ranked_report, render_record_detail, render_volume_report, DISCLAIMER,
};
use crate::screener::ScanProfile;
use crate::signals::AnalysisFailure;

/// Largest `limit` accepted by the scan endpoints.
pub const MAX_LIMIT: usize = 100;

/// Routes listed by the index endpoint.
const ENDPOINTS: &[(&str, &str)] = &[
    ("GET /", "this overview"),
    ("GET /health", "service health"),
    ("GET /metrics", "Prometheus metrics"),
    ("GET /api/scan", "equities and crypto with the combined report"),
    ("GET /api/scan/equities?limit=", "equities ranked by signal count"),
    ("GET /api/scan/crypto?limit=", "crypto ranked by signal count"),
    ("GET /api/scan/volume?market=&limit=", "volume surges ranked by volume ratio"),
    ("GET /api/analyze/{id}?market=&name=&days=", "one instrument in detail"),
];

#[derive(Clone)]
pub struct AppState {
    pub health: Arc<RwLock<HealthStatus>>,
    pub metrics: Arc<Metrics>,
    pub start_time: Arc<Instant>,
    pub scans: Arc<ScanContext>,
}

impl AppState {
    pub fn new(scans: Arc<ScanContext>, metrics: Arc<Metrics>) -> Self {
        Self {
            health: Arc::new(RwLock::new(HealthStatus::default())),
            metrics,
            start_time: Arc::new(Instant::now()),
            scans,
        }
    }
}

#[derive(Clone, Debug)]
pub struct HealthStatus {
    pub status: String,
}

impl Default for HealthStatus {
    fn default() -> Self {
        Self {
            status: "healthy".to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Analysis(#[from] AnalysisFailure),

    #[error("metrics export failed: {0}")]
    Metrics(#[from] prometheus::Error),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Analysis(AnalysisFailure::Provider(_)) => StatusCode::BAD_GATEWAY,
            ApiError::Analysis(AnalysisFailure::InvalidData(_))
            | ApiError::Analysis(AnalysisFailure::Indicator(_))
            | ApiError::Analysis(AnalysisFailure::HistoryWindow(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Analysis(AnalysisFailure::Panicked(_)) | ApiError::Metrics(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, status = %status, "API request failed");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// Service overview: endpoints, the signal rules and the disclaimer.
pub async fn index() -> Json<Value> {
    let endpoints: Vec<Value> = ENDPOINTS
        .iter()
        .map(|(route, description)| json!({ "route": route, "description": description }))
        .collect();
    Json(json!({
        "service": "tickerscan",
        "endpoints": endpoints,
        "help": render_help(),
        "disclaimer": DISCLAIMER,
    }))
}

pub async fn health_check(State(state): State<AppState>) -> Result<Json<Value>, StatusCode> {
    let health = state.health.read().await;
    let uptime_seconds = state.start_time.elapsed().as_secs();
    Ok(Json(json!({
        "status": health.status,
        "uptime_seconds": uptime_seconds,
        "service": "tickerscan"
    })))
}

pub async fn metrics_handler(State(state): State<AppState>) -> Result<String, ApiError> {
    Ok(state.metrics.export()?)
}

/// Middleware to track HTTP request metrics
async fn metrics_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    state.metrics.http_requests_in_flight.inc();

    let response = next.run(request).await;
    let status = response.status();
    let duration = start.elapsed();

    state.metrics.http_requests_in_flight.dec();

    state.metrics.http_requests_total.inc();
    state
        .metrics
        .http_request_duration_seconds
        .observe(duration.as_secs_f64());

    if status.is_server_error() {
        error!(
            method = %method,
            path = %path,
            status = %status,
            duration_ms = duration.as_millis(),
            "HTTP request error"
        );
    }

    response
}

#[derive(Debug, Deserialize)]
struct LimitQuery {
    limit: Option<usize>,
}

impl LimitQuery {
    fn validated(&self) -> Result<Option<usize>, ApiError> {
        match self.limit {
            Some(limit) if limit == 0 || limit > MAX_LIMIT => Err(ApiError::BadRequest(format!(
                "limit must be between 1 and {}",
                MAX_LIMIT
            ))),
            other => Ok(other),
        }
    }
}

#[derive(Debug, Deserialize)]
struct VolumeQuery {
    limit: Option<usize>,
    market: Option<ScanProfile>,
}

#[derive(Debug, Deserialize)]
struct AnalyzeQuery {
    name: Option<String>,
    days: Option<i64>,
    market: Option<ScanProfile>,
}

#[derive(Debug, Serialize)]
struct ScanResponse {
    #[serde(flatten)]
    scan: FullScan,
    report: String,
}

#[derive(Debug, Serialize)]
struct ProfileResponse {
    profile: ScanProfile,
    #[serde(flatten)]
    result: ScreeningResult,
    report: String,
}

#[derive(Debug, Serialize)]
struct VolumeResponse {
    profile: ScanProfile,
    #[serde(flatten)]
    result: VolumeSurgeResult,
    report: String,
}

#[derive(Debug, Serialize)]
struct AnalyzeResponse {
    #[serde(flatten)]
    record: SignalRecord,
    report: String,
}

/// Run both scans and return the combined report.
async fn scan_all(State(state): State<AppState>) -> Json<ScanResponse> {
    let scan = state.scans.run_full_scan().await;
    let report = scan.render();
    Json(ScanResponse { scan, report })
}

async fn scan_equities(
    State(state): State<AppState>,
    Query(params): Query<LimitQuery>,
) -> Result<Json<ProfileResponse>, ApiError> {
    scan_profile(&state, ScanProfile::Equity, params.validated()?).await
}

async fn scan_crypto(
    State(state): State<AppState>,
    Query(params): Query<LimitQuery>,
) -> Result<Json<ProfileResponse>, ApiError> {
    scan_profile(&state, ScanProfile::Crypto, params.validated()?).await
}

async fn scan_profile(
    state: &AppState,
    profile: ScanProfile,
    limit: Option<usize>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let result = state.scans.run_scan(profile, limit).await;
    let title = format!("{} buy-interest scan", profile.heading());
    let report = render_ranked_report(&title, &result, result.generated_at);
    Ok(Json(ProfileResponse {
        profile,
        result,
        report,
    }))
}

/// Volume-surge ranking; equities unless `market=crypto`.
async fn scan_volume(
    State(state): State<AppState>,
    Query(params): Query<VolumeQuery>,
) -> Result<Json<VolumeResponse>, ApiError> {
    let limit = LimitQuery {
        limit: params.limit,
    }
    .validated()?;
    let profile = params.market.unwrap_or(ScanProfile::Equity);

    let result = state.scans.run_volume_scan(profile, limit).await;
    let title = format!("{} volume surges", profile.heading());
    let report = render_volume_report(&title, &result, result.generated_at);
    Ok(Json(VolumeResponse {
        profile,
        result,
        report,
    }))
}

/// Analyze one instrument. 404 when its history is too short to analyze.
async fn analyze_instrument(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<AnalyzeQuery>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    if let Some(days) = params.days {
        if days <= 0 || days > MAX_HISTORY_DAYS {
            return Err(ApiError::BadRequest(format!(
                "days must be between 1 and {}",
                MAX_HISTORY_DAYS
            )));
        }
    }

    let profile = params.market.unwrap_or(ScanProfile::Equity);
    let record = state
        .scans
        .analyze_one(profile, &id, params.name.as_deref(), params.days)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("no analyzable history for {}", id)))?;

    let report = render_record_detail(None, &record);
    Ok(Json(AnalyzeResponse { record, report }))
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .route("/api/scan", get(scan_all))
        .route("/api/scan/equities", get(scan_equities))
        .route("/api/scan/crypto", get(scan_crypto))
        .route("/api/scan/volume", get(scan_volume))
        .route("/api/analyze/{id}", get(analyze_instrument))
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(DefaultMakeSpan::new().level(Level::DEBUG))
                        .on_request(DefaultOnRequest::new().level(Level::DEBUG))
                        .on_response(DefaultOnResponse::new().level(Level::DEBUG)),
                )
                .layer(axum::middleware::from_fn_with_state(
                    state.clone(),
                    metrics_middleware,
                ))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

pub async fn start_server(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let metrics = Arc::new(Metrics::new()?);
    let scans = Arc::new(ScanContext::from_config(config, Some(metrics.clone()))?);

    let state = AppState::new(scans, metrics);
    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;

    info!(port = config.port, "HTTP server listening on port {}", config.port);
    info!(
        "Metrics endpoint available at http://0.0.0.0:{}/metrics",
        config.port
    );
    axum::serve(listener, app).await?;

    Ok(())
}
