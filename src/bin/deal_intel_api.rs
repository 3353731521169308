//! Deal Intel API Server
//!
//! REST API for IP block analysis and deal scoring
//!
//! Usage:
//!   cargo run --bin deal_intel_api
//!
//! Environment:
//!   PORT / DEAL_PORT  - Server port (default: 8080)
//!   DEAL_HOST         - Server host (default: 0.0.0.0)
//!   DEAL_DATA_PATH    - JSON snapshot of stored assets (default: memory only)
//!   DEAL_RATE_LIMIT   - Requests per client per minute (default: 100)
//!   RUST_LOG          - Log level (default: info)

use deal_intel::api::{create_router, handlers::AppState, start_cleanup_task, RateLimitConfig, RateLimiter};
use deal_intel::utils::constants::{APP_NAME, APP_VERSION};
use deal_intel::utils::logging::init_logging;
use deal_intel::{AssetStore, MemoryAssetStore, ServerConfig};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    init_logging();

    let config = ServerConfig::from_env()?;

    let store: Arc<dyn AssetStore> = match &config.data_path {
        Some(path) => Arc::new(MemoryAssetStore::open(path)?),
        None => {
            warn!("DEAL_DATA_PATH not set, assets are kept in memory only");
            Arc::new(MemoryAssetStore::new())
        }
    };

    let rate_limiter = Arc::new(RateLimiter::new(RateLimitConfig {
        requests_per_window: config.rate_limit_requests,
        window_duration: config.rate_limit_window,
    }));
    start_cleanup_task(rate_limiter.clone());

    let state = Arc::new(AppState::new(store.clone(), rate_limiter));
    let app = create_router(state);

    let addr = config.socket_addr()?;

    info!("🚀 {} API v{} starting on http://{}", APP_NAME, APP_VERSION, addr);
    info!("Endpoints:");
    info!("  POST /analyze-ip          - Normalize, enrich and score a CIDR");
    info!("  GET  /assets              - Stored assets, best deals first");
    info!("  GET  /assets/:id          - One stored asset");
    info!("  POST /assets/:id/enrich   - Refresh registry metadata");
    info!("  GET  /stats               - Portfolio statistics");
    info!("  GET  /health              - Health check");
    info!("  (all routes are also served under /v1)");

    let listener = TcpListener::bind(addr).await?;

    let shutdown_signal = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("🛑 Shutdown signal received");
    match store.stats() {
        Ok(stats) => info!(
            "   {} assets stored, {} high value, avg score {:.2}",
            stats.total_assets, stats.high_value_deals, stats.avg_deal_score
        ),
        Err(e) => warn!("   Could not read final stats: {}", e),
    }
    info!("👋 {} API shutdown complete", APP_NAME);

    Ok(())
}
