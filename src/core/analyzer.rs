//! Asset Analyzer
//!
//! Runs the normalize -> enrich -> score pipeline and applies the
//! create-if-absent rule against the asset store. A CIDR that is already
//! stored is never scored again.

use std::sync::Arc;

use tracing::{debug, info};

use crate::core::deal_score::score;
use crate::core::enricher::enrich;
use crate::core::normalizer::normalize;
use crate::models::{AppError, AppResult, CanonicalNetwork, CidrError, IpAsset, NewAsset};
use crate::utils::store::{AssetStore, InsertOutcome};

/// Pure pipeline: everything except persistence
pub fn analyze_block(raw: &str) -> Result<NewAsset, CidrError> {
    Ok(assess(normalize(raw)?))
}

/// Enrich and score an already canonical network
fn assess(network: CanonicalNetwork) -> NewAsset {
    let metadata = enrich(&network.cidr);
    let (deal_score, scoring_explanation) = score(
        network.version,
        &network.num_addresses,
        metadata.registry.as_str(),
        &metadata.org_name,
    );

    NewAsset {
        network,
        metadata,
        deal_score,
        scoring_explanation,
    }
}

/// Analyzer bound to an asset store
#[derive(Clone)]
pub struct AssetAnalyzer {
    store: Arc<dyn AssetStore>,
}

impl AssetAnalyzer {
    pub fn new(store: Arc<dyn AssetStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn AssetStore> {
        &self.store
    }

    /// Analyze a raw CIDR. Returns the stored record, existing or new.
    pub fn analyze(&self, raw: &str) -> AppResult<InsertOutcome> {
        let network = normalize(raw)?;

        if let Some(existing) = self.store.find_by_cidr(&network.cidr)? {
            debug!(cidr = %existing.cidr, id = existing.id, "asset already analyzed");
            return Ok(InsertOutcome::Existing(existing));
        }

        let assessed = assess(network);
        info!(
            cidr = %assessed.network.cidr,
            registry = %assessed.metadata.registry,
            org = %assessed.metadata.org_name,
            score = assessed.deal_score,
            "block scored"
        );

        // A concurrent request may have stored the CIDR since the lookup;
        // the store resolves that to the existing record.
        let outcome = self.store.insert_if_absent(assessed)?;
        Ok(outcome)
    }

    /// Recompute enrichment metadata for a stored asset. The deal score and
    /// explanation are kept.
    pub fn reenrich(&self, id: u64) -> AppResult<IpAsset> {
        let asset = self
            .store
            .get(id)?
            .ok_or_else(|| AppError::not_found(format!("Asset {} not found", id)))?;

        let metadata = enrich(&asset.cidr);
        self.store
            .update_enrichment(id, metadata)?
            .ok_or_else(|| AppError::not_found(format!("Asset {} not found", id)))
    }
}
