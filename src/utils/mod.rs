//! Utils Module - Shared Infrastructure

pub mod constants;
pub mod logging;
pub mod store;

pub use constants::*;
pub use logging::*;
pub use store::*;
