//! Deal Intel API Module
//! REST API for IP block analysis and portfolio statistics

pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod types;

pub use middleware::{start_cleanup_task, RateLimitConfig, RateLimiter};
pub use routes::create_router;
pub use types::*;
