//! Health Check
//!
//! Process health for load balancers and monitoring.
//!
//! ## Endpoints served from this state
//! - `/health` - status, uptime, version and per-market book stats
//! - `/health/ready` - ready to take traffic
//! - `/health/live` - process is running
//!
//! ## Response format
//! ```json
//! {
//!   "status": "healthy",
//!   "uptime_seconds": 3600,
//!   "version": "0.1.0",
//!   "timestamp": 1234567890,
//!   "details": { "markets": [{ "market": "ETH", "resting_orders": 8, ... }] }
//! }
//! ```

use std::time::{SystemTime, UNIX_EPOCH};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::application::services::{Exchange, SharedOrderBook};
use crate::domain::orderbook::OrderBook;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    /// Serving, but not ready for new traffic
    Degraded,
    Unhealthy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub uptime_seconds: u64,
    pub version: String,
    /// Seconds since the Unix epoch
    pub timestamp: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HealthDetails>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HealthDetails {
    pub markets: Vec<MarketHealth>,
}

impl HealthDetails {
    pub fn from_exchange(exchange: &Exchange) -> Self {
        Self {
            markets: exchange.markets().map(|book| MarketHealth::from_book(book)).collect(),
        }
    }
}

/// Book statistics for one market
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketHealth {
    pub market: String,
    pub resting_orders: usize,
    pub bid_levels: usize,
    pub ask_levels: usize,
    pub matches: usize,
}

impl MarketHealth {
    /// Reads every figure under one read guard so they are mutually consistent
    pub fn from_book(book: &SharedOrderBook) -> Self {
        book.read(|b| Self {
            market: book.market().to_string(),
            resting_orders: b.order_count(),
            bid_levels: b.bid_levels(),
            ask_levels: b.ask_levels(),
            matches: b.trade_log().len(),
        })
    }
}

pub struct HealthChecker {
    start_time: SystemTime,
    status: RwLock<HealthStatus>,
    version: String,
}

impl HealthChecker {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            start_time: SystemTime::now(),
            status: RwLock::new(HealthStatus::Healthy),
            version: version.into(),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time
            .elapsed()
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }

    fn current_timestamp() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }

    pub fn set_status(&self, status: HealthStatus) {
        *self.status.write() = status;
    }

    pub fn get_status(&self) -> HealthStatus {
        *self.status.read()
    }

    pub fn check_health(&self) -> HealthResponse {
        HealthResponse {
            status: self.get_status(),
            uptime_seconds: self.uptime_seconds(),
            version: self.version.clone(),
            timestamp: Self::current_timestamp(),
            details: None,
        }
    }

    pub fn check_health_detailed(&self, details: HealthDetails) -> HealthResponse {
        HealthResponse {
            details: Some(details),
            ..self.check_health()
        }
    }

    /// Liveness probe: true while the process can answer at all
    pub fn check_liveness(&self) -> bool {
        true
    }

    /// Readiness probe: only a healthy process takes traffic
    pub fn check_readiness(&self) -> bool {
        matches!(self.get_status(), HealthStatus::Healthy)
    }
}

impl Default for HealthChecker {
    fn default() -> Self {
        Self::new(env!("CARGO_PKG_VERSION"))
    }
}
