/// Shared utilities and types used across all layers
///
/// This module contains:
/// - Protocol definitions (sides, order kinds, requests and responses)
/// - Timestamp helpers
/// - Prometheus metrics

pub mod protocol;
pub mod timestamp;
pub mod metrics;

// Re-export commonly used types
pub use protocol::{
    AccountOrders, OrderKind, OrderView, PlaceOrderRequest, PlaceOrderResponse, PriceResponse,
    Side,
};
