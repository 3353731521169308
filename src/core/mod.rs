//! Core Module - Business Logic
//!
//! CIDR normalization, simulated enrichment, deal scoring and the
//! analyzer that chains them.

pub mod analyzer;
pub mod deal_score;
pub mod enricher;
pub mod normalizer;

pub use analyzer::*;
pub use deal_score::*;
pub use enricher::*;
pub use normalizer::*;
