//! CIDR Normalizer
//!
//! Turns user input (`10.1.2.3`, `10.1.2.3/8`, `2001:db8::1/32`) into the
//! canonical network key used everywhere downstream. Host bits are masked
//! to the network boundary instead of rejected. IPv4 also accepts a
//! netmask (`10.0.0.0/255.0.0.0`) or hostmask (`10.0.0.0/0.255.255.255`)
//! in place of the prefix length.

use std::net::{IpAddr, Ipv4Addr};

use alloy_primitives::U256;
use ipnet::{ipv4_mask_to_prefix, IpNet, Ipv4Net};

use crate::models::{CanonicalNetwork, CidrError};

/// Parse and canonicalize an address or address/prefix string
pub fn normalize(input: &str) -> Result<CanonicalNetwork, CidrError> {
    let raw = input.trim();
    let invalid = || CidrError::InvalidFormat {
        input: input.to_string(),
    };

    let parsed = if let Some((addr, mask)) = raw.split_once('/') {
        match mask.parse::<Ipv4Addr>() {
            Ok(mask) => IpNet::V4(ipv4_with_mask(addr, mask).ok_or_else(invalid)?),
            Err(_) => raw.parse::<IpNet>().map_err(|_| invalid())?,
        }
    } else {
        // Bare address: single-address network
        IpNet::from(raw.parse::<IpAddr>().map_err(|_| invalid())?)
    };
    let net = parsed.trunc();

    let version = match net {
        IpNet::V4(_) => 4,
        IpNet::V6(_) => 6,
    };
    let host_bits = usize::from(net.max_prefix_len() - net.prefix_len());

    Ok(CanonicalNetwork {
        cidr: net.to_string(),
        version,
        num_addresses: U256::from(1u8) << host_bits,
    })
}

/// IPv4 network from a dotted netmask, falling back to a hostmask
fn ipv4_with_mask(addr: &str, mask: Ipv4Addr) -> Option<Ipv4Net> {
    let addr = addr.parse::<Ipv4Addr>().ok()?;
    let prefix = ipv4_mask_to_prefix(mask)
        .or_else(|_| ipv4_mask_to_prefix(Ipv4Addr::from(!u32::from(mask))))
        .ok()?;
    Ipv4Net::new(addr, prefix).ok()
}
