//! Constants Module - Single Source of Truth
//!
//! Catalogs, thresholds and point values used across the engine, the
//! store and the API. Other modules import from here instead of
//! repeating literals.

// ============================================
// APPLICATION CONSTANTS
// ============================================

/// Application name
pub const APP_NAME: &str = "DealIntel";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Status given to every freshly analyzed asset
pub const DEFAULT_ASSET_STATUS: &str = "Active";

// ============================================
// ENRICHMENT CATALOGS
// ============================================

/// Organizations the simulated WHOIS lookup can return
pub const ORG_CATALOG: [&str; 6] = [
    "CloudFlare",
    "Amazon.com",
    "Google LLC",
    "T-Mobile USA",
    "Legacy Telecom Inc.",
    "Digital Ocean",
];

/// Country codes the simulated WHOIS lookup can return
pub const COUNTRY_CATALOG: [&str; 6] = ["US", "DE", "GB", "NL", "SG", "BR"];

/// Inclusive ASN range for simulated origin ASNs
pub const ASN_MIN: u32 = 100;
pub const ASN_MAX: u32 = 65_000;

// ============================================
// DEAL SCORING
// ============================================

pub const BASELINE_SCORE: f64 = 50.0;
pub const MIN_DEAL_SCORE: f64 = 5.0;
pub const MAX_DEAL_SCORE: f64 = 99.0;

pub const IPV4_BONUS: f64 = 25.0;
pub const IPV6_PENALTY: f64 = -15.0;

/// A /16 worth of IPv4 space
pub const LARGE_BLOCK_ADDRESSES: u64 = 65_536;
/// A /24 worth of IPv4 space, the smallest globally routable unit
pub const STANDARD_BLOCK_ADDRESSES: u64 = 256;

pub const LARGE_BLOCK_BONUS: f64 = 35.0;
pub const STANDARD_BLOCK_BONUS: f64 = 15.0;
pub const SMALL_BLOCK_PENALTY: f64 = -10.0;

pub const MATURE_REGISTRY_BONUS: f64 = 10.0;
pub const APNIC_BONUS: f64 = 5.0;
pub const EMERGING_REGISTRY_PENALTY: f64 = -5.0;

pub const LEGACY_BONUS: f64 = 20.0;
/// Marker searched for in the organization name
pub const LEGACY_MARKER: &str = "Legacy";
/// Heritage draws strictly above this count as a legacy block
pub const LEGACY_DRAW_THRESHOLD: f64 = 0.8;

// ============================================
// STATISTICS
// ============================================

/// Deals at or above this score are reported as high value
pub const HIGH_VALUE_SCORE: f64 = 80.0;

// ============================================
// SERVER DEFAULTS
// ============================================

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_RATE_LIMIT_PER_MINUTE: u32 = 100;
