//! Metadata Enricher
//!
//! Simulated WHOIS/RIR enrichment. No lookups are made: the metadata is a
//! pure function of the canonical CIDR string. Each call builds its own
//! generator seeded from the Keccak-256 digest of the CIDR, so results are
//! stable across calls, threads and restarts.

use alloy_primitives::keccak256;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::models::{EnrichmentMetadata, Registry};
use crate::utils::constants::{ASN_MAX, ASN_MIN, COUNTRY_CATALOG, ORG_CATALOG};

/// Derive registry metadata for a canonical CIDR
pub fn enrich(canonical_cidr: &str) -> EnrichmentMetadata {
    let mut rng = seeded_rng(canonical_cidr);

    // Draw order is part of the output contract
    let registry = Registry::ALL[rng.gen_range(0..Registry::ALL.len())];
    let asn = rng.gen_range(ASN_MIN..=ASN_MAX);
    let org_name = ORG_CATALOG[rng.gen_range(0..ORG_CATALOG.len())];
    let country = COUNTRY_CATALOG[rng.gen_range(0..COUNTRY_CATALOG.len())];

    EnrichmentMetadata {
        registry,
        asn: format!("AS{}", asn),
        org_name: org_name.to_string(),
        country: country.to_string(),
    }
}

#[inline]
fn seeded_rng(key: &str) -> StdRng {
    StdRng::from_seed(keccak256(key.as_bytes()).0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_same_cidr_same_metadata() {
        let first = enrich("192.168.1.0/24");
        for _ in 0..10 {
            assert_eq!(enrich("192.168.1.0/24"), first);
        }
    }

    #[test]
    fn test_fields_come_from_catalogs() {
        for i in 0..200u32 {
            let cidr = format!("10.{}.{}.0/24", i / 256, i % 256);
            let meta = enrich(&cidr);

            assert!(ORG_CATALOG.contains(&meta.org_name.as_str()));
            assert!(COUNTRY_CATALOG.contains(&meta.country.as_str()));

            let number: u32 = meta.asn.strip_prefix("AS").unwrap().parse().unwrap();
            assert!((ASN_MIN..=ASN_MAX).contains(&number), "{} out of range", meta.asn);
        }
    }

    #[test]
    fn test_distinct_inputs_spread_across_catalogs() {
        let registries: HashSet<Registry> = (0..500u32)
            .map(|i| enrich(&format!("172.{}.{}.0/24", i / 256, i % 256)).registry)
            .collect();
        assert_eq!(registries.len(), Registry::ALL.len());
    }
}
