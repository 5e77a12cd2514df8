//! HTTP Observability Server
//!
//! Exposes metrics and health only. No trading routes are served here.
//!
//! ## Endpoints
//! - `GET /metrics` - Prometheus text format
//! - `GET /health` - JSON health with per-market book stats
//! - `GET /health/ready` - readiness probe
//! - `GET /health/live` - liveness probe
//!
//! ## Usage
//! ```rust,ignore
//! let server = ObservabilityServer::new(addr, exchange);
//! server.health_checker().set_status(HealthStatus::Healthy);
//! server.run().await?;
//! ```

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use tracing::info;

use super::health::{HealthChecker, HealthDetails, HealthStatus};
use crate::application::services::Exchange;
use crate::shared::metrics::METRICS;

#[derive(Clone)]
pub struct AppState {
    pub exchange: Arc<Exchange>,
    pub health: Arc<HealthChecker>,
}

/// Builds the observability routes over `state`
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/metrics", get(metrics_handler))
        .route("/health", get(health_handler))
        .route("/health/ready", get(readiness_handler))
        .route("/health/live", get(liveness_handler))
        .with_state(state)
}

pub struct ObservabilityServer {
    addr: SocketAddr,
    state: AppState,
}

impl ObservabilityServer {
    pub fn new(addr: SocketAddr, exchange: Arc<Exchange>) -> Self {
        Self {
            addr,
            state: AppState {
                exchange,
                health: Arc::new(HealthChecker::default()),
            },
        }
    }

    pub fn health_checker(&self) -> Arc<HealthChecker> {
        Arc::clone(&self.state.health)
    }

    /// Serves until the listener fails
    pub async fn run(self) -> std::io::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        info!(addr = %self.addr, "observability server listening");

        axum::serve(listener, router(self.state)).await
    }
}

async fn metrics_handler() -> Response {
    (StatusCode::OK, METRICS.export()).into_response()
}

async fn health_handler(State(state): State<AppState>) -> Response {
    let details = HealthDetails::from_exchange(&state.exchange);
    let response = state.health.check_health_detailed(details);

    let status_code = match response.status {
        HealthStatus::Healthy | HealthStatus::Degraded => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status_code, Json(response)).into_response()
}

async fn readiness_handler(State(state): State<AppState>) -> StatusCode {
    if state.health.check_readiness() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

async fn liveness_handler(State(state): State<AppState>) -> StatusCode {
    if state.health.check_liveness() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}
