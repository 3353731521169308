//! API Request Handlers

use axum::{
    extract::{rejection::JsonRejection, Json, Path, State},
    http::StatusCode,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

use super::middleware::RateLimiter;
use super::types::*;
use crate::core::analyzer::AssetAnalyzer;
use crate::models::{AppError, AssetStats, IpAsset};
use crate::utils::constants::APP_VERSION;
use crate::utils::store::AssetStore;

type HandlerError = (StatusCode, Json<ApiResponse<()>>);

/// Shared application state
pub struct AppState {
    pub analyzer: AssetAnalyzer,
    pub rate_limiter: Arc<RateLimiter>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(store: Arc<dyn AssetStore>, rate_limiter: Arc<RateLimiter>) -> Self {
        Self {
            analyzer: AssetAnalyzer::new(store),
            rate_limiter,
            start_time: Instant::now(),
        }
    }

    pub fn store(&self) -> &Arc<dyn AssetStore> {
        self.analyzer.store()
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

fn error_response(err: &AppError, start: Instant) -> HandlerError {
    let status =
        StatusCode::from_u16(err.code.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        Json(ApiResponse::error(ApiError::from(err), elapsed_ms(start))),
    )
}

// ============================================
// Health Check
// ============================================

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<ApiResponse<HealthData>> {
    let start = Instant::now();

    let (status, storage) = match state.store().ping() {
        Ok(()) => ("healthy", "connected".to_string()),
        Err(e) => {
            error!("Health check storage failure: {}", e);
            ("degraded", format!("disconnected: {}", e))
        }
    };

    let data = HealthData {
        status: status.to_string(),
        storage,
        version: APP_VERSION.to_string(),
        uptime_seconds: state.uptime_seconds(),
    };

    Json(ApiResponse::success(data, elapsed_ms(start)))
}

// ============================================
// Analyze
// ============================================

pub async fn analyze_ip(
    State(state): State<Arc<AppState>>,
    body: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<AnalyzeData>>, HandlerError> {
    let start = Instant::now();

    let Json(req) = body.map_err(|rejection| {
        info!("Rejected analyze body: {}", rejection.body_text());
        error_response(&AppError::bad_request(rejection.body_text()), start)
    })?;

    // Snapshot writes touch the filesystem
    let analyzer = state.analyzer.clone();
    let cidr = req.cidr;
    let outcome = tokio::task::spawn_blocking(move || analyzer.analyze(&cidr))
        .await
        .map_err(|e| error_response(&AppError::internal(format!("Analysis task failed: {}", e)), start))?
        .map_err(|e| {
            if e.code.is_retryable() {
                error!(code = e.code_str(), "Error during IP analysis: {}", e);
            } else {
                info!(code = e.code_str(), "Rejected analyze request: {}", e);
            }
            error_response(&e, start)
        })?;

    let data = AnalyzeData {
        newly_created: outcome.is_created(),
        asset: outcome.into_asset(),
    };

    Ok(Json(ApiResponse::success(data, elapsed_ms(start))))
}

// ============================================
// Assets
// ============================================

/// Storage failures degrade to an empty list
pub async fn list_assets(State(state): State<Arc<AppState>>) -> Json<ApiResponse<Vec<IpAsset>>> {
    let start = Instant::now();

    let assets = state.store().list_by_score().unwrap_or_else(|e| {
        warn!("Error fetching assets: {}", e);
        Vec::new()
    });

    Json(ApiResponse::success(assets, elapsed_ms(start)))
}

pub async fn get_asset(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<Json<ApiResponse<IpAsset>>, HandlerError> {
    let start = Instant::now();

    match state.store().get(id) {
        Ok(Some(asset)) => Ok(Json(ApiResponse::success(asset, elapsed_ms(start)))),
        Ok(None) => Err(error_response(
            &AppError::not_found(format!("Asset {} not found", id)),
            start,
        )),
        Err(e) => {
            let err = AppError::from(e);
            error!(id, "Error fetching asset: {}", err);
            Err(error_response(&err, start))
        }
    }
}

pub async fn reenrich_asset(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<Json<ApiResponse<IpAsset>>, HandlerError> {
    let start = Instant::now();

    let analyzer = state.analyzer.clone();
    let asset = tokio::task::spawn_blocking(move || analyzer.reenrich(id))
        .await
        .map_err(|e| error_response(&AppError::internal(format!("Enrichment task failed: {}", e)), start))?
        .map_err(|e| error_response(&e, start))?;

    Ok(Json(ApiResponse::success(asset, elapsed_ms(start))))
}

// ============================================
// Stats
// ============================================

/// Storage failures degrade to zeroed stats
pub async fn get_stats(State(state): State<Arc<AppState>>) -> Json<ApiResponse<AssetStats>> {
    let start = Instant::now();

    let stats = state.store().stats().unwrap_or_else(|e| {
        warn!("Error fetching stats: {}", e);
        AssetStats::default()
    });

    info!(
        "📊 Stats: {} assets, {} high value, avg {:.2}",
        stats.total_assets, stats.high_value_deals, stats.avg_deal_score
    );

    Json(ApiResponse::success(stats, elapsed_ms(start)))
}
