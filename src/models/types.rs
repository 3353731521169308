//! Type definitions for the deal intelligence engine
//! Value types produced by the engine and the persisted asset record

use alloy_primitives::U256;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Regional Internet Registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Registry {
    Arin,
    Ripe,
    Apnic,
    Lacnic,
    Afrinic,
}

impl Registry {
    /// Draw order used by the enricher
    pub const ALL: [Registry; 5] = [
        Registry::Arin,
        Registry::Ripe,
        Registry::Apnic,
        Registry::Lacnic,
        Registry::Afrinic,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Registry::Arin => "ARIN",
            Registry::Ripe => "RIPE",
            Registry::Apnic => "APNIC",
            Registry::Lacnic => "LACNIC",
            Registry::Afrinic => "AFRINIC",
        }
    }

    /// Geographic service region of the registry
    pub fn region(&self) -> &'static str {
        match self {
            Registry::Arin => "North America",
            Registry::Ripe => "Europe / Middle East / Central Asia",
            Registry::Apnic => "Asia Pacific",
            Registry::Lacnic => "Latin America / Caribbean",
            Registry::Afrinic => "Africa",
        }
    }

    /// Exact, case-sensitive lookup by registry name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.as_str() == name)
    }
}

impl std::fmt::Display for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized network derived from raw user input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalNetwork {
    /// Network address plus prefix length, e.g. `192.168.1.0/24`
    pub cidr: String,
    /// 4 or 6
    pub version: u8,
    /// `2^(bits - prefix)`; an IPv6 /0 does not fit in u128
    #[serde(with = "u256_decimal")]
    pub num_addresses: U256,
}

impl CanonicalNetwork {
    pub fn version_label(&self) -> String {
        format!("IPv{}", self.version)
    }
}

/// Simulated WHOIS/RIR metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichmentMetadata {
    pub registry: Registry,
    /// `AS<number>`
    pub asn: String,
    pub org_name: String,
    pub country: String,
}

/// Fully analyzed block, ready to be stored
#[derive(Debug, Clone, PartialEq)]
pub struct NewAsset {
    pub network: CanonicalNetwork,
    pub metadata: EnrichmentMetadata,
    pub deal_score: f64,
    pub scoring_explanation: String,
}

/// Persisted asset record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IpAsset {
    pub id: u64,
    pub cidr: String,
    pub ip_version: u8,
    #[serde(with = "u256_decimal")]
    pub num_addresses: U256,
    pub registry: Registry,
    pub asn: String,
    pub org_name: String,
    pub country: String,
    pub deal_score: f64,
    pub scoring_explanation: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub last_enriched: Option<DateTime<Utc>>,
}

impl IpAsset {
    /// Build the stored record for a new asset. `created_at` is set here.
    pub fn from_new(id: u64, new: NewAsset, status: &str) -> Self {
        Self {
            id,
            cidr: new.network.cidr,
            ip_version: new.network.version,
            num_addresses: new.network.num_addresses,
            registry: new.metadata.registry,
            asn: new.metadata.asn,
            org_name: new.metadata.org_name,
            country: new.metadata.country,
            deal_score: new.deal_score,
            scoring_explanation: new.scoring_explanation,
            status: status.to_string(),
            created_at: Utc::now(),
            last_enriched: None,
        }
    }

    pub fn metadata(&self) -> EnrichmentMetadata {
        EnrichmentMetadata {
            registry: self.registry,
            asn: self.asn.clone(),
            org_name: self.org_name.clone(),
            country: self.country.clone(),
        }
    }
}

/// Aggregate statistics over all stored assets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AssetStats {
    pub total_assets: u64,
    /// Assets scoring at or above the high-value threshold
    pub high_value_deals: u64,
    /// Mean score rounded to two decimals, 0.0 when empty
    pub avg_deal_score: f64,
    /// Most frequent registry, `None` when empty
    pub top_registry: Option<Registry>,
}

/// Serialize U256 as a decimal string. JSON numbers lose precision past 2^53.
pub mod u256_decimal {
    use alloy_primitives::U256;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &U256, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<U256, D::Error> {
        let raw = String::deserialize(deserializer)?;
        U256::from_str_radix(&raw, 10).map_err(de::Error::custom)
    }
}
