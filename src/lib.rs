//! Deal Intel Library
//!
//! IP block intelligence engine:
//! - CIDR normalization (non-strict, host bits masked)
//! - Simulated registry enrichment, deterministic per CIDR
//! - Additive 0-100 deal scoring with a written explanation
//! - Asset store with create-if-absent semantics and portfolio stats

pub mod api;
pub mod core;
pub mod models;
pub mod utils;

pub use crate::core::{
    analyze_block, enrich, normalize, score, AssetAnalyzer, DealScore, DealScoreBuilder,
    ScoreFactor,
};
pub use models::{
    AppError, AppResult, AssetStats, CanonicalNetwork, CidrError, EnrichmentMetadata, ErrorCode,
    IpAsset, NewAsset, Registry, ServerConfig, StoreError,
};
pub use utils::store::{AssetStore, InsertOutcome, MemoryAssetStore};
