//! Asset Store
//!
//! Thread-safe storage for scored assets keyed by canonical CIDR.
//! Reads go straight to DashMap; writes are serialized and reach the
//! snapshot before they become visible.
//!
//! Features:
//! - Atomic insert-if-absent on the CIDR key
//! - Surrogate ids, monotonic from 1
//! - Optional JSON snapshot, loaded on open and rewritten after each change
//! - Aggregate statistics for the dashboard

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use chrono::Utc;
use dashmap::DashMap;
use tracing::{debug, info, warn};

use crate::models::{AssetStats, EnrichmentMetadata, IpAsset, NewAsset, Registry, StoreError};
use crate::core::deal_score::is_high_value;
use crate::utils::constants::DEFAULT_ASSET_STATUS;

/// Result of an insert-if-absent
#[derive(Debug, Clone, PartialEq)]
pub enum InsertOutcome {
    /// No asset existed for the CIDR; this one was stored
    Created(IpAsset),
    /// An asset already existed; it is returned unchanged
    Existing(IpAsset),
}

impl InsertOutcome {
    pub fn is_created(&self) -> bool {
        matches!(self, InsertOutcome::Created(_))
    }

    pub fn asset(&self) -> &IpAsset {
        match self {
            InsertOutcome::Created(a) | InsertOutcome::Existing(a) => a,
        }
    }

    pub fn into_asset(self) -> IpAsset {
        match self {
            InsertOutcome::Created(a) | InsertOutcome::Existing(a) => a,
        }
    }
}

/// Storage seam between the API shell and whatever keeps the records
pub trait AssetStore: Send + Sync {
    /// Cheap availability probe for health checks
    fn ping(&self) -> Result<(), StoreError>;

    fn find_by_cidr(&self, cidr: &str) -> Result<Option<IpAsset>, StoreError>;

    fn get(&self, id: u64) -> Result<Option<IpAsset>, StoreError>;

    /// Store the asset unless its CIDR is already present. Must be atomic
    /// with respect to concurrent calls for the same CIDR.
    fn insert_if_absent(&self, asset: NewAsset) -> Result<InsertOutcome, StoreError>;

    /// All assets, highest deal score first, ties by id
    fn list_by_score(&self) -> Result<Vec<IpAsset>, StoreError>;

    fn stats(&self) -> Result<AssetStats, StoreError>;

    /// Replace the enrichment fields of an asset and stamp `last_enriched`.
    /// Score fields are left as they are.
    fn update_enrichment(
        &self,
        id: u64,
        metadata: EnrichmentMetadata,
    ) -> Result<Option<IpAsset>, StoreError>;
}

/// In-memory asset store with optional JSON snapshot
pub struct MemoryAssetStore {
    /// Canonical CIDR -> asset
    by_cidr: DashMap<String, IpAsset>,
    /// Surrogate id -> canonical CIDR
    cidr_by_id: DashMap<u64, String>,
    next_id: AtomicU64,
    snapshot: Option<PathBuf>,
    /// Held across check, snapshot write and publish of every mutation
    write_lock: Mutex<()>,
}

impl Default for MemoryAssetStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryAssetStore {
    /// Memory-only store
    pub fn new() -> Self {
        Self {
            by_cidr: DashMap::new(),
            cidr_by_id: DashMap::new(),
            next_id: AtomicU64::new(1),
            snapshot: None,
            write_lock: Mutex::new(()),
        }
    }

    /// Store backed by a JSON snapshot. Loads the file if it exists; ids
    /// continue after the highest loaded id.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let mut store = Self::new();

        if path.exists() {
            let bytes = fs::read(&path)?;
            let assets: Vec<IpAsset> = if bytes.is_empty() {
                Vec::new()
            } else {
                serde_json::from_slice(&bytes)?
            };
            let max_id = assets.iter().map(|a| a.id).max().unwrap_or(0);
            for asset in assets {
                store.cidr_by_id.insert(asset.id, asset.cidr.clone());
                store.by_cidr.insert(asset.cidr.clone(), asset);
            }
            store.next_id = AtomicU64::new(max_id + 1);
            info!(path = %path.display(), assets = store.by_cidr.len(), "asset snapshot loaded");
        } else if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        store.snapshot = Some(path);
        Ok(store)
    }

    pub fn len(&self) -> usize {
        self.by_cidr.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_cidr.is_empty()
    }

    /// Rewrite the snapshot as current contents with `pending` added or
    /// replaced (temp file + rename). Caller holds `write_lock`.
    fn persist_with(&self, pending: &IpAsset) -> Result<(), StoreError> {
        let Some(path) = &self.snapshot else {
            return Ok(());
        };

        let mut assets: Vec<IpAsset> = self
            .by_cidr
            .iter()
            .filter(|e| e.key() != &pending.cidr)
            .map(|e| e.value().clone())
            .collect();
        assets.push(pending.clone());
        assets.sort_by_key(|a| a.id);

        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(&assets)?)?;
        fs::rename(&tmp, path)?;

        debug!(path = %path.display(), assets = assets.len(), "asset snapshot written");
        Ok(())
    }
}

impl AssetStore for MemoryAssetStore {
    fn ping(&self) -> Result<(), StoreError> {
        if let Some(path) = &self.snapshot {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            fs::metadata(dir)?;
        }
        Ok(())
    }

    fn find_by_cidr(&self, cidr: &str) -> Result<Option<IpAsset>, StoreError> {
        Ok(self.by_cidr.get(cidr).map(|e| e.value().clone()))
    }

    fn get(&self, id: u64) -> Result<Option<IpAsset>, StoreError> {
        let cidr = match self.cidr_by_id.get(&id) {
            Some(entry) => entry.value().clone(),
            None => return Ok(None),
        };
        self.find_by_cidr(&cidr)
    }

    fn insert_if_absent(&self, asset: NewAsset) -> Result<InsertOutcome, StoreError> {
        if let Some(existing) = self.find_by_cidr(&asset.network.cidr)? {
            return Ok(InsertOutcome::Existing(existing));
        }

        let _guard = self.write_lock.lock().map_err(|_| StoreError::Poisoned)?;

        // Lost the race while waiting for the lock
        if let Some(existing) = self.find_by_cidr(&asset.network.cidr)? {
            return Ok(InsertOutcome::Existing(existing));
        }

        // Nothing is visible to readers until the snapshot holds it
        let id = self.next_id.load(Ordering::SeqCst);
        let stored = IpAsset::from_new(id, asset, DEFAULT_ASSET_STATUS);
        if let Err(e) = self.persist_with(&stored) {
            warn!(cidr = %stored.cidr, error = %e, "snapshot write failed, asset not stored");
            return Err(e);
        }

        self.next_id.store(id + 1, Ordering::SeqCst);
        self.cidr_by_id.insert(id, stored.cidr.clone());
        self.by_cidr.insert(stored.cidr.clone(), stored.clone());

        info!(id, cidr = %stored.cidr, score = stored.deal_score, "asset stored");
        Ok(InsertOutcome::Created(stored))
    }

    fn list_by_score(&self) -> Result<Vec<IpAsset>, StoreError> {
        let mut assets: Vec<IpAsset> = self.by_cidr.iter().map(|e| e.value().clone()).collect();
        assets.sort_by(|a, b| {
            b.deal_score
                .total_cmp(&a.deal_score)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(assets)
    }

    fn stats(&self) -> Result<AssetStats, StoreError> {
        let mut total = 0u64;
        let mut high_value = 0u64;
        let mut score_sum = 0.0f64;
        let mut per_registry: HashMap<Registry, u64> = HashMap::new();

        for entry in self.by_cidr.iter() {
            let asset = entry.value();
            total += 1;
            score_sum += asset.deal_score;
            if is_high_value(asset.deal_score) {
                high_value += 1;
            }
            *per_registry.entry(asset.registry).or_insert(0) += 1;
        }

        let avg_deal_score = if total > 0 {
            (score_sum / total as f64 * 100.0).round() / 100.0
        } else {
            0.0
        };

        // Most frequent; ties go to the alphabetically first name
        let top_registry = per_registry
            .into_iter()
            .max_by(|a, b| {
                a.1.cmp(&b.1)
                    .then_with(|| b.0.as_str().cmp(a.0.as_str()))
            })
            .map(|(registry, _)| registry);

        Ok(AssetStats {
            total_assets: total,
            high_value_deals: high_value,
            avg_deal_score,
            top_registry,
        })
    }

    fn update_enrichment(
        &self,
        id: u64,
        metadata: EnrichmentMetadata,
    ) -> Result<Option<IpAsset>, StoreError> {
        let _guard = self.write_lock.lock().map_err(|_| StoreError::Poisoned)?;

        let Some(mut updated) = self.get(id)? else {
            return Ok(None);
        };
        updated.registry = metadata.registry;
        updated.asn = metadata.asn;
        updated.org_name = metadata.org_name;
        updated.country = metadata.country;
        updated.last_enriched = Some(Utc::now());

        // Memory keeps the old record if the write fails
        self.persist_with(&updated)?;
        self.by_cidr.insert(updated.cidr.clone(), updated.clone());

        info!(id, cidr = %updated.cidr, "asset re-enriched");
        Ok(Some(updated))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CanonicalNetwork;
    use alloy_primitives::U256;
    use std::sync::Arc;

    fn new_asset(cidr: &str, score: f64, registry: Registry) -> NewAsset {
        NewAsset {
            network: CanonicalNetwork {
                cidr: cidr.to_string(),
                version: 4,
                num_addresses: U256::from(256u64),
            },
            metadata: EnrichmentMetadata {
                registry,
                asn: "AS13335".to_string(),
                org_name: "CloudFlare".to_string(),
                country: "US".to_string(),
            },
            deal_score: score,
            scoring_explanation: "test".to_string(),
        }
    }

    #[test]
    fn test_insert_then_existing() {
        let store = MemoryAssetStore::new();

        let first = store
            .insert_if_absent(new_asset("10.0.0.0/24", 70.0, Registry::Arin))
            .unwrap();
        assert!(first.is_created());
        assert_eq!(first.asset().id, 1);
        assert_eq!(first.asset().status, "Active");
        assert!(first.asset().last_enriched.is_none());

        // Different score on the second attempt must not overwrite
        let second = store
            .insert_if_absent(new_asset("10.0.0.0/24", 10.0, Registry::Ripe))
            .unwrap();
        assert!(!second.is_created());
        assert_eq!(second.asset(), first.asset());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_get_and_find() {
        let store = MemoryAssetStore::new();
        let created = store
            .insert_if_absent(new_asset("10.0.1.0/24", 70.0, Registry::Arin))
            .unwrap()
            .into_asset();

        assert_eq!(store.get(created.id).unwrap(), Some(created.clone()));
        assert_eq!(store.find_by_cidr("10.0.1.0/24").unwrap(), Some(created));
        assert_eq!(store.get(999).unwrap(), None);
        assert_eq!(store.find_by_cidr("10.0.2.0/24").unwrap(), None);
    }

    #[test]
    fn test_list_sorted_by_score() {
        let store = MemoryAssetStore::new();
        store.insert_if_absent(new_asset("10.0.0.0/24", 40.0, Registry::Arin)).unwrap();
        store.insert_if_absent(new_asset("10.0.1.0/24", 90.0, Registry::Arin)).unwrap();
        store.insert_if_absent(new_asset("10.0.2.0/24", 40.0, Registry::Arin)).unwrap();

        let listed: Vec<(f64, u64)> = store
            .list_by_score()
            .unwrap()
            .iter()
            .map(|a| (a.deal_score, a.id))
            .collect();
        assert_eq!(listed, vec![(90.0, 2), (40.0, 1), (40.0, 3)]);
    }

    #[test]
    fn test_stats() {
        let store = MemoryAssetStore::new();
        assert_eq!(store.stats().unwrap(), AssetStats::default());

        store.insert_if_absent(new_asset("10.0.0.0/24", 80.0, Registry::Ripe)).unwrap();
        store.insert_if_absent(new_asset("10.0.1.0/24", 99.0, Registry::Arin)).unwrap();
        store.insert_if_absent(new_asset("10.0.2.0/24", 20.0, Registry::Ripe)).unwrap();

        let stats = store.stats().unwrap();
        assert_eq!(stats.total_assets, 3);
        assert_eq!(stats.high_value_deals, 2);
        assert_eq!(stats.avg_deal_score, 66.33);
        assert_eq!(stats.top_registry, Some(Registry::Ripe));
    }

    #[test]
    fn test_stats_tie_prefers_first_name() {
        let store = MemoryAssetStore::new();
        store.insert_if_absent(new_asset("10.0.0.0/24", 50.0, Registry::Ripe)).unwrap();
        store.insert_if_absent(new_asset("10.0.1.0/24", 50.0, Registry::Apnic)).unwrap();
        assert_eq!(store.stats().unwrap().top_registry, Some(Registry::Apnic));
    }

    #[test]
    fn test_update_enrichment() {
        let store = MemoryAssetStore::new();
        let created = store
            .insert_if_absent(new_asset("10.0.0.0/24", 75.0, Registry::Arin))
            .unwrap()
            .into_asset();

        let metadata = EnrichmentMetadata {
            registry: Registry::Lacnic,
            asn: "AS4242".to_string(),
            org_name: "Digital Ocean".to_string(),
            country: "BR".to_string(),
        };
        let updated = store.update_enrichment(created.id, metadata.clone()).unwrap().unwrap();
        assert_eq!(updated.metadata(), metadata);
        assert_eq!(updated.deal_score, 75.0);
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.last_enriched.is_some());

        assert_eq!(store.update_enrichment(42, metadata).unwrap(), None);
    }

    #[test]
    fn test_concurrent_inserts_keep_one_record() {
        let store = Arc::new(MemoryAssetStore::new());
        let handles: Vec<_> = (0..16)
            .map(|i| {
                let store = store.clone();
                std::thread::spawn(move || {
                    store
                        .insert_if_absent(new_asset("192.0.2.0/24", i as f64, Registry::Arin))
                        .unwrap()
                })
            })
            .collect();

        let outcomes: Vec<InsertOutcome> =
            handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(outcomes.iter().filter(|o| o.is_created()).count(), 1);
        let winner = outcomes.iter().find(|o| o.is_created()).unwrap().asset().clone();
        assert!(outcomes.iter().all(|o| *o.asset() == winner));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_snapshot_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("assets.json");

        {
            let store = MemoryAssetStore::open(&path).unwrap();
            store.insert_if_absent(new_asset("10.0.0.0/24", 60.0, Registry::Arin)).unwrap();
            store.insert_if_absent(new_asset("10.0.1.0/24", 70.0, Registry::Ripe)).unwrap();
            store.ping().unwrap();
        }

        let reopened = MemoryAssetStore::open(&path).unwrap();
        assert_eq!(reopened.len(), 2);
        let found = reopened.find_by_cidr("10.0.1.0/24").unwrap().unwrap();
        assert_eq!(found.id, 2);
        assert_eq!(found.registry, Registry::Ripe);

        let next = reopened
            .insert_if_absent(new_asset("10.0.2.0/24", 50.0, Registry::Apnic))
            .unwrap();
        assert_eq!(next.asset().id, 3);
    }

    #[test]
    fn test_ping_fails_when_directory_missing() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().join("data");
        let store = MemoryAssetStore::open(data_dir.join("assets.json")).unwrap();
        store.ping().unwrap();

        fs::remove_dir_all(&data_dir).unwrap();
        assert!(store.ping().is_err());

        // Write fails too, and nothing reaches memory
        let err = store.insert_if_absent(new_asset("10.0.0.0/24", 60.0, Registry::Arin));
        assert!(err.is_err());
        assert!(store.is_empty());
        assert_eq!(store.find_by_cidr("10.0.0.0/24").unwrap(), None);
    }

    #[test]
    fn test_failed_insert_does_not_consume_id() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().join("data");
        let path = data_dir.join("assets.json");
        let store = MemoryAssetStore::open(&path).unwrap();

        fs::remove_dir_all(&data_dir).unwrap();
        assert!(store
            .insert_if_absent(new_asset("10.0.0.0/24", 60.0, Registry::Arin))
            .is_err());
        assert_eq!(store.get(1).unwrap(), None);

        fs::create_dir_all(&data_dir).unwrap();
        let created = store
            .insert_if_absent(new_asset("10.0.0.0/24", 60.0, Registry::Arin))
            .unwrap();
        assert!(created.is_created());
        assert_eq!(created.asset().id, 1);

        let reopened = MemoryAssetStore::open(&path).unwrap();
        assert_eq!(reopened.get(1).unwrap(), Some(created.into_asset()));
    }

    #[test]
    fn test_failed_enrichment_write_keeps_old_record() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().join("data");
        let store = MemoryAssetStore::open(data_dir.join("assets.json")).unwrap();
        let created = store
            .insert_if_absent(new_asset("10.0.0.0/8", 90.0, Registry::Arin))
            .unwrap()
            .into_asset();

        fs::remove_dir_all(&data_dir).unwrap();
        let metadata = EnrichmentMetadata {
            registry: Registry::Afrinic,
            asn: "AS100".to_string(),
            org_name: "Google LLC".to_string(),
            country: "SG".to_string(),
        };
        assert!(store.update_enrichment(created.id, metadata).is_err());

        let current = store.get(created.id).unwrap().unwrap();
        assert_eq!(current, created);
        assert!(current.last_enriched.is_none());
    }
}
