//! Deal Intel - one-shot CIDR analysis from the command line
//!
//! Usage:
//!   deal_intel 192.168.1.0/24 2001:db8::/32 8.8.8.8
//!
//! Prints the normalized network, simulated registry metadata, the deal
//! score and its explanation for every argument. Exits non-zero if any
//! argument is not a valid address or CIDR.

use deal_intel::utils::logging::init_logging;
use deal_intel::{enrich, normalize, DealScoreBuilder};

use eyre::{bail, Result};
use rand::Rng;
use tracing::warn;

fn main() -> Result<()> {
    init_logging();

    let inputs: Vec<String> = std::env::args().skip(1).collect();
    if inputs.is_empty() {
        bail!("usage: deal_intel <cidr> [<cidr>...]");
    }

    let mut failures = 0usize;

    for input in &inputs {
        let network = match normalize(input) {
            Ok(network) => network,
            Err(e) => {
                warn!("{}", e);
                failures += 1;
                continue;
            }
        };

        let meta = enrich(&network.cidr);
        let score = DealScoreBuilder::new(network.version)
            .with_block_size(&network.num_addresses)
            .with_registry(meta.registry.as_str())
            .with_heritage(&meta.org_name, rand::thread_rng().gen())
            .build();

        println!("━━━ {} ━━━", network.cidr);
        println!("   Version:    {}", network.version_label());
        println!("   Addresses:  {}", network.num_addresses);
        println!("   Registry:   {} ({})", meta.registry, meta.registry.region());
        println!("   ASN:        {}", meta.asn);
        println!("   Org:        {}", meta.org_name);
        println!("   Country:    {}", meta.country);
        println!("   Deal score: {:.1}", score.score);
        if score.is_high_value() {
            println!("   ⭐ High-value deal");
        }
        for factor in &score.breakdown {
            println!("     {:>+6.1}  {}", factor.delta, factor.name);
        }
        println!();
        println!("{}", score.explanation);
        println!();
    }

    if failures > 0 {
        bail!("{} of {} inputs were not valid IP or CIDR strings", failures, inputs.len());
    }

    Ok(())
}
