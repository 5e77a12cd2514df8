/// Request and response shapes exchanged with the exchange core
///
/// These types are transport-neutral: the HTTP layer (or any other caller)
/// decodes into them and encodes the results back out. Prices and sizes are
/// integer units, never floats.
use serde::{Deserialize, Serialize};

use crate::domain::order::{AccountId, OrderId};
use crate::domain::trade::Match;

/// Side of the book an order belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Buy side (bids)
    Buy,
    /// Sell side (asks)
    Sell,
}

impl Side {
    /// The side an incoming order of this side consumes
    #[inline]
    pub fn opposite(self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }

    /// Lowercase label, used for logs and metric labels
    pub fn as_str(self) -> &'static str {
        match self {
            Side::Buy => "buy",
            Side::Sell => "sell",
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Order type accepted by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderKind {
    /// Rests at its price until filled or cancelled
    Limit,
    /// Executes immediately against resting liquidity, never rests
    Market,
}

impl OrderKind {
    pub fn as_str(self) -> &'static str {
        match self {
            OrderKind::Limit => "limit",
            OrderKind::Market => "market",
        }
    }
}

/// A new order submitted by a client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceOrderRequest {
    pub account: AccountId,
    pub market: String,
    pub kind: OrderKind,
    pub side: Side,
    pub size: u64,
    /// Limit price; ignored for market orders
    #[serde(default)]
    pub price: u64,
}

impl PlaceOrderRequest {
    pub fn limit(market: &str, account: AccountId, side: Side, price: u64, size: u64) -> Self {
        Self {
            account,
            market: market.to_string(),
            kind: OrderKind::Limit,
            side,
            size,
            price,
        }
    }

    pub fn market(market: &str, account: AccountId, side: Side, size: u64) -> Self {
        Self {
            account,
            market: market.to_string(),
            kind: OrderKind::Market,
            side,
            size,
            price: 0,
        }
    }
}

/// Outcome of a placed order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceOrderResponse {
    pub order_id: OrderId,
    pub kind: OrderKind,
    /// Matches produced by this order, in execution order (empty for limit orders)
    pub matches: Vec<Match>,
    /// Unfilled size. For a limit order this is the resting size; for a
    /// market order it is the part that found no liquidity and was dropped.
    pub remaining: u64,
    /// Matches whose settlement failed; the matches themselves stand
    pub settlement_failures: usize,
}

/// A resting order as seen from outside the book
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderView {
    pub id: OrderId,
    pub account: AccountId,
    pub side: Side,
    pub price: u64,
    pub size: u64,
    pub remaining: u64,
    pub timestamp: u64,
}

/// The resting orders owned by one account, split by side
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountOrders {
    pub bids: Vec<OrderView>,
    pub asks: Vec<OrderView>,
}

impl AccountOrders {
    pub fn len(&self) -> usize {
        self.bids.len() + self.asks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bids.is_empty() && self.asks.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceResponse {
    pub price: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_opposite() {
        assert_eq!(Side::Buy.opposite(), Side::Sell);
        assert_eq!(Side::Sell.opposite(), Side::Buy);
    }

    #[test]
    fn test_request_json_shape() {
        let json = r#"{"account":8,"market":"ETH","kind":"market","side":"sell","size":1000}"#;
        let request: PlaceOrderRequest = serde_json::from_str(json).unwrap();

        assert_eq!(request, PlaceOrderRequest::market("ETH", 8, Side::Sell, 1000));
        assert_eq!(request.price, 0);
    }

    #[test]
    fn test_account_orders_len() {
        let mut orders = AccountOrders::default();
        assert!(orders.is_empty());

        orders.bids.push(OrderView {
            id: 1,
            account: 7,
            side: Side::Buy,
            price: 9_100,
            size: 1_000,
            remaining: 1_000,
            timestamp: 0,
        });
        assert_eq!(orders.len(), 1);
        assert!(!orders.is_empty());
    }
}
