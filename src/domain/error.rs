use thiserror::Error;

use crate::domain::order::OrderId;
use crate::shared::protocol::Side;

/// Errors raised by order book operations
///
/// None of these leave the book partially mutated: inputs are checked before
/// any level or index is touched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BookError {
    /// Non-positive size or price
    #[error("invalid order: {0}")]
    InvalidOrder(String),

    /// An order with this identifier is already resting
    #[error("order {0} already exists in the book")]
    DuplicateOrder(OrderId),

    /// The order is not resting (never existed, filled or cancelled)
    #[error("order {0} not found")]
    OrderNotFound(OrderId),

    /// The requested side has no resting liquidity
    #[error("no resting orders on the {0} side")]
    EmptySide(Side),
}

impl BookError {
    /// Short label for metrics
    pub fn reason(&self) -> &'static str {
        match self {
            BookError::InvalidOrder(_) => "invalid_order",
            BookError::DuplicateOrder(_) => "duplicate_order",
            BookError::OrderNotFound(_) => "order_not_found",
            BookError::EmptySide(_) => "empty_side",
        }
    }
}
