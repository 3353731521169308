//! Integration tests for the analysis engine

use alloy_primitives::U256;
use deal_intel::{
    analyze_block, enrich, normalize, score, AssetAnalyzer, AssetStore, CidrError,
    DealScoreBuilder, MemoryAssetStore, Registry,
};
use std::sync::Arc;

#[test]
fn test_documented_scenarios() {
    let net = normalize("192.168.1.0/24").unwrap();
    assert_eq!(net.cidr, "192.168.1.0/24");
    assert_eq!(net.version, 4);
    assert_eq!(net.num_addresses, U256::from(256u64));

    let net = normalize("10.0.0.0/8").unwrap();
    assert_eq!(net.num_addresses, U256::from(16_777_216u64));
    let large = DealScoreBuilder::new(4)
        .with_block_size(&net.num_addresses)
        .build();
    assert_eq!(large.breakdown[1].delta, 35.0);

    let net = normalize("2001:db8::/32").unwrap();
    assert_eq!(net.version, 6);
    assert_eq!(net.num_addresses, U256::from(1u8) << 96);
    assert_eq!(DealScoreBuilder::new(6).build().breakdown[0].delta, -15.0);

    assert!(matches!(
        normalize("not-an-ip"),
        Err(CidrError::InvalidFormat { .. })
    ));

    // 50 + 25 + 15 + 10 (+0 or +20) clamps to 99 either way
    for _ in 0..20 {
        let (s, _) = score(4, &U256::from(256u64), "ARIN", "CloudFlare");
        assert_eq!(s, 99.0);
    }
}

#[test]
fn test_address_count_matches_prefix_for_every_length() {
    for prefix in 0..=32u32 {
        let net = normalize(&format!("10.20.30.40/{}", prefix)).unwrap();
        assert_eq!(net.num_addresses, U256::from(1u8) << (32 - prefix) as usize);
        assert!(net.cidr.ends_with(&format!("/{}", prefix)));
    }
    for prefix in 0..=128u32 {
        let net = normalize(&format!("2001:db8::1/{}", prefix)).unwrap();
        assert_eq!(net.num_addresses, U256::from(1u8) << (128 - prefix) as usize);
    }
}

#[test]
fn test_canonical_form_feeds_enrichment() {
    // Different spellings of one network enrich identically
    let a = analyze_block("10.1.2.3/16").unwrap();
    let b = analyze_block("10.1.0.0/16").unwrap();
    assert_eq!(a.network, b.network);
    assert_eq!(a.metadata, b.metadata);
    assert_eq!(a.metadata, enrich("10.1.0.0/16"));
}

#[test]
fn test_analyzed_scores_within_bounds() {
    for i in 0..100u32 {
        let block = analyze_block(&format!("100.{}.0.0/{}", i, 8 + i % 25)).unwrap();
        assert!((5.0..=99.0).contains(&block.deal_score));
        // One decimal place
        assert_eq!((block.deal_score * 10.0).round() / 10.0, block.deal_score);
        assert!(block.scoring_explanation.contains(block.metadata.registry.as_str()));
        assert!(block
            .scoring_explanation
            .contains(Registry::from_name(block.metadata.registry.as_str()).unwrap().region()));
    }
}

#[test]
fn test_concurrent_analyze_same_cidr_creates_one_asset() {
    let store = Arc::new(MemoryAssetStore::new());
    let analyzer = AssetAnalyzer::new(store.clone());

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let analyzer = analyzer.clone();
            std::thread::spawn(move || {
                // Host bits vary; canonical CIDR does not
                analyzer.analyze(&format!("198.51.100.{}/24", i)).unwrap()
            })
        })
        .collect();

    let outcomes: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(outcomes.iter().filter(|o| o.is_created()).count(), 1);

    let assets = store.list_by_score().unwrap();
    assert_eq!(assets.len(), 1);
    assert!(outcomes.iter().all(|o| o.asset() == &assets[0]));
}
