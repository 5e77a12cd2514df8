//! Observability Module
//!
//! - `health` - health checker and per-market book stats
//! - `http_server` - axum server for `/metrics` and `/health*`

pub mod health;
pub mod http_server;

pub use health::{HealthChecker, HealthDetails, HealthResponse, HealthStatus, MarketHealth};
pub use http_server::{router, AppState, ObservabilityServer};
