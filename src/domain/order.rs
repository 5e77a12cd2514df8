/// Order entity and identifier allocation
///
/// An `Order` never holds a reference into the book. Once resting it carries
/// a `Location` (side and price), which is the key of the level that owns it.
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::shared::protocol::{OrderView, Side};
use crate::shared::timestamp::now_nanos;

pub type OrderId = u64;
pub type AccountId = u64;

static NEXT_ORDER_ID: AtomicU64 = AtomicU64::new(1);

/// Allocates a process-unique order identifier
#[inline]
pub fn next_order_id() -> OrderId {
    NEXT_ORDER_ID.fetch_add(1, Ordering::Relaxed)
}

/// Where a resting order lives in the book
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    pub side: Side,
    pub price: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub account: AccountId,
    pub side: Side,
    /// Size at creation
    pub size: u64,
    /// Unfilled size, never increases
    pub remaining: u64,
    /// Creation time in nanoseconds
    pub timestamp: u64,
    /// Set while the order rests; market orders never get one
    pub location: Option<Location>,
}

impl Order {
    /// Creates an order with a freshly allocated identifier
    pub fn new(account: AccountId, side: Side, size: u64) -> Self {
        Self::with_id(next_order_id(), account, side, size)
    }

    /// Creates an order with a caller-chosen identifier
    pub fn with_id(id: OrderId, account: AccountId, side: Side, size: u64) -> Self {
        Self {
            id,
            account,
            side,
            size,
            remaining: size,
            timestamp: now_nanos(),
            location: None,
        }
    }

    #[inline]
    pub fn is_filled(&self) -> bool {
        self.remaining == 0
    }

    #[inline]
    pub fn filled(&self) -> u64 {
        self.size - self.remaining
    }

    /// Fills up to `quantity` and returns the amount actually filled
    #[inline]
    pub fn fill(&mut self, quantity: u64) -> u64 {
        let filled = quantity.min(self.remaining);
        self.remaining -= filled;
        filled
    }

    /// Limit price, if the order rests
    #[inline]
    pub fn price(&self) -> Option<u64> {
        self.location.map(|loc| loc.price)
    }

    /// External view of a resting order; `None` for orders without a price
    pub fn view(&self) -> Option<OrderView> {
        let price = self.price()?;
        Some(OrderView {
            id: self.id,
            account: self.account,
            side: self.side,
            price,
            size: self.size,
            remaining: self.remaining,
            timestamp: self.timestamp,
        })
    }
}
