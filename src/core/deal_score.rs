//! Deal Scoring Module
//! Additive 0-100 desirability score for an address block
//!
//! Starts from a baseline of 50 and applies four independent factors in a
//! fixed order (protocol, block size, registry, heritage). Each factor
//! contributes a point delta and one sentence of explanation. The total is
//! clamped to [5, 99] and rounded to one decimal.

use alloy_primitives::U256;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::models::Registry;
use crate::utils::constants::{
    APNIC_BONUS, BASELINE_SCORE, EMERGING_REGISTRY_PENALTY, HIGH_VALUE_SCORE, IPV4_BONUS,
    IPV6_PENALTY, LARGE_BLOCK_ADDRESSES, LARGE_BLOCK_BONUS, LEGACY_BONUS, LEGACY_DRAW_THRESHOLD,
    LEGACY_MARKER, MATURE_REGISTRY_BONUS, MAX_DEAL_SCORE, MIN_DEAL_SCORE, SMALL_BLOCK_PENALTY,
    STANDARD_BLOCK_ADDRESSES, STANDARD_BLOCK_BONUS,
};

/// Final deal score with its breakdown
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DealScore {
    /// Clamped, rounded score in [5.0, 99.0]
    pub score: f64,
    /// Sum of baseline and deltas before clamping
    pub raw_score: f64,
    /// All factor reasons joined with single spaces
    pub explanation: String,
    pub breakdown: Vec<ScoreFactor>,
}

/// One factor's contribution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreFactor {
    pub name: String,
    pub delta: f64,
    pub reason: String,
}

impl DealScore {
    fn calculate(factors: Vec<ScoreFactor>) -> Self {
        let raw_score = BASELINE_SCORE + factors.iter().map(|f| f.delta).sum::<f64>();
        let clamped = raw_score.clamp(MIN_DEAL_SCORE, MAX_DEAL_SCORE);
        let score = (clamped * 10.0).round() / 10.0;

        let explanation = factors
            .iter()
            .map(|f| f.reason.as_str())
            .collect::<Vec<_>>()
            .join(" ");

        Self {
            score,
            raw_score,
            explanation,
            breakdown: factors,
        }
    }

    pub fn is_high_value(&self) -> bool {
        is_high_value(self.score)
    }
}

/// True when a stored score falls in the high-value band counted by stats
pub fn is_high_value(score: f64) -> bool {
    score >= HIGH_VALUE_SCORE
}

/// Builder applying the scoring factors in order
pub struct DealScoreBuilder {
    label: String,
    factors: Vec<ScoreFactor>,
}

impl DealScoreBuilder {
    /// Start a score for the given IP version; applies the protocol factor
    pub fn new(version: u8) -> Self {
        let label = format!("IPv{}", version);

        let (delta, reason) = if version == 4 {
            (
                IPV4_BONUS,
                format!(
                    "Protocol: {label} block. The IANA free pool is exhausted, so {label} space \
                     trades at a scarcity premium with deep secondary-market liquidity."
                ),
            )
        } else {
            (
                IPV6_PENALTY,
                format!(
                    "Protocol: {label} block. {label} space is effectively unlimited, so it \
                     carries no scarcity premium and resale liquidity is thin today."
                ),
            )
        };

        Self {
            factors: vec![ScoreFactor {
                name: "Protocol version".to_string(),
                delta,
                reason,
            }],
            label,
        }
    }

    /// Apply the block size factor
    pub fn with_block_size(mut self, num_addresses: &U256) -> Self {
        let label = &self.label;
        let (delta, reason) = if *num_addresses >= U256::from(LARGE_BLOCK_ADDRESSES) {
            (
                LARGE_BLOCK_BONUS,
                format!(
                    "Block size: large {label} allocation (/16 or bigger). Contiguous blocks this \
                     size are rare and attract an aggregation premium."
                ),
            )
        } else if *num_addresses >= U256::from(STANDARD_BLOCK_ADDRESSES) {
            (
                STANDARD_BLOCK_BONUS,
                format!(
                    "Block size: standard {label} unit (/24 class). Accepted by every major \
                     transit provider without route filtering."
                ),
            )
        } else {
            (
                SMALL_BLOCK_PENALTY,
                format!(
                    "Block size: small {label} block (under 256 addresses). Commonly filtered \
                     from global routing tables, which limits standalone resale value."
                ),
            )
        };

        self.factors.push(ScoreFactor {
            name: "Block size".to_string(),
            delta,
            reason,
        });
        self
    }

    /// Apply the registry factor. Unknown registries are penalized like the
    /// emerging ones and reported under their own name.
    pub fn with_registry(mut self, registry: &str) -> Self {
        let label = &self.label;
        let known = Registry::from_name(registry);
        let region = known.map(|r| r.region()).unwrap_or(registry);

        let (delta, policy) = match known {
            Some(Registry::Arin) | Some(Registry::Ripe) => (
                MATURE_REGISTRY_BONUS,
                format!("Mature, predictable {label} transfer policy keeps acquisition friction low."),
            ),
            Some(Registry::Apnic) => (
                APNIC_BONUS,
                format!(
                    "Strong regional demand keeps {label} valuations stable, though transfers \
                     carry extra local compliance steps."
                ),
            ),
            Some(Registry::Afrinic) => (
                EMERGING_REGISTRY_PENALTY,
                format!(
                    "Fast-growing {label} market, but the inter-regional transfer framework is \
                     still maturing and slows liquidity."
                ),
            ),
            Some(Registry::Lacnic) => (
                EMERGING_REGISTRY_PENALTY,
                format!(
                    "Stable {label} policy, but cross-regional transfers usually need local legal \
                     validation that stretches the deal timeline."
                ),
            ),
            None => (
                EMERGING_REGISTRY_PENALTY,
                format!(
                    "Unfamiliar registry policy may add lead time to {label} transfers compared \
                     with the North American and European corridors."
                ),
            ),
        };

        self.factors.push(ScoreFactor {
            name: "Registry".to_string(),
            delta,
            reason: format!("Registry: {} ({}). {}", registry, region, policy),
        });
        self
    }

    /// Apply the heritage factor. `draw` is a uniform sample in [0, 1); a
    /// draw above the threshold flags the block as legacy even when the
    /// organization name does not.
    pub fn with_heritage(mut self, org_name: &str, draw: f64) -> Self {
        let label = &self.label;
        let legacy = org_name.contains(LEGACY_MARKER) || draw > LEGACY_DRAW_THRESHOLD;

        let (delta, reason) = if legacy {
            (
                LEGACY_BONUS,
                format!(
                    "Heritage: this {label} block looks like a legacy allocation. Legacy space \
                     often sits outside current registry fee regimes and keeps historical \
                     transfer rights, which buyers pay extra for."
                ),
            )
        } else {
            (
                0.0,
                format!(
                    "Heritage: standard non-legacy {label} allocation under current registry \
                     membership and maintenance fees."
                ),
            )
        };

        self.factors.push(ScoreFactor {
            name: "Heritage".to_string(),
            delta,
            reason,
        });
        self
    }

    pub fn build(self) -> DealScore {
        DealScore::calculate(self.factors)
    }
}

/// Score a block. The heritage draw is taken fresh from the thread RNG on
/// every call, so two calls with identical arguments can differ by the
/// legacy bonus.
pub fn score(version: u8, num_addresses: &U256, registry: &str, org_name: &str) -> (f64, String) {
    let draw: f64 = rand::thread_rng().gen();
    let result = DealScoreBuilder::new(version)
        .with_block_size(num_addresses)
        .with_registry(registry)
        .with_heritage(org_name, draw)
        .build();
    (result.score, result.explanation)
}
