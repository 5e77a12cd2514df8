/// OrderBook Trait - Domain Layer Abstraction
///
/// The operation set every book implementation exposes to the application
/// layer. `SharedOrderBook` is generic over this trait, so the concurrency
/// wrapper can be tested against a mock and the matching engine can be
/// swapped without touching callers.
///
/// ## Example
/// ```rust,ignore
/// use exchange_engine::domain::orderbook::{LimitOrderBook, OrderBook};
/// use exchange_engine::domain::order::Order;
/// use exchange_engine::shared::protocol::Side;
///
/// let mut book = LimitOrderBook::new();
/// book.place_limit(Order::new(8, Side::Sell, 1_000), 10_000)?;
///
/// let execution = book.place_market(Order::new(6, Side::Buy, 400))?;
/// assert_eq!(execution.matches[0].price, 10_000);
/// ```
use serde::{Deserialize, Serialize};

use super::level::LevelSnapshot;
use crate::domain::error::BookError;
use crate::domain::order::{Order, OrderId};
use crate::domain::trade::{Match, MarketExecution};

/// Immutable copy of both sides of a book
///
/// Bids are ordered best (highest) first, asks best (lowest) first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookSnapshot {
    pub bids: Vec<LevelSnapshot>,
    pub asks: Vec<LevelSnapshot>,
    pub bid_volume: u64,
    pub ask_volume: u64,
}

pub trait OrderBook {
    /// Rests a new order at `price` without matching it
    ///
    /// Fails with `InvalidOrder` for a zero size or price and with
    /// `DuplicateOrder` if the identifier is already resting.
    fn place_limit(&mut self, order: Order, price: u64) -> Result<(), BookError>;

    /// Executes an order against the opposite side, best price first and
    /// earliest arrival first within a price
    ///
    /// Whatever size finds no liquidity is reported in the result and then
    /// dropped. An empty opposite side yields zero matches, not an error.
    fn place_market(&mut self, order: Order) -> Result<MarketExecution, BookError>;

    /// Removes a resting order and returns it
    fn cancel(&mut self, order_id: OrderId) -> Result<Order, BookError>;

    fn best_bid(&self) -> Result<u64, BookError>;

    fn best_ask(&self) -> Result<u64, BookError>;

    /// Total resting size on the bid side, zero when empty
    fn bid_volume(&self) -> u64;

    /// Total resting size on the ask side, zero when empty
    fn ask_volume(&self) -> u64;

    fn snapshot(&self) -> BookSnapshot;

    /// Every match executed so far, oldest first
    fn trade_log(&self) -> &[Match];

    /// Best ask minus best bid
    ///
    /// `None` if either side is empty or the book is locked or crossed.
    fn spread(&self) -> Option<u64> {
        match (self.best_bid(), self.best_ask()) {
            (Ok(bid), Ok(ask)) if ask > bid => Some(ask - bid),
            _ => None,
        }
    }

    /// Midpoint of best bid and best ask, rounded down
    fn mid_price(&self) -> Option<u64> {
        match (self.best_bid(), self.best_ask()) {
            (Ok(bid), Ok(ask)) if ask > bid => Some(bid + (ask - bid) / 2),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::protocol::Side;
    use smallvec::SmallVec;

    struct MockOrderBook {
        best_bid: Option<u64>,
        best_ask: Option<u64>,
    }

    impl OrderBook for MockOrderBook {
        fn place_limit(&mut self, _order: Order, _price: u64) -> Result<(), BookError> {
            Ok(())
        }

        fn place_market(&mut self, order: Order) -> Result<MarketExecution, BookError> {
            Ok(MarketExecution {
                order_id: order.id,
                side: order.side,
                requested: order.size,
                remaining: order.size,
                matches: SmallVec::new(),
            })
        }

        fn cancel(&mut self, order_id: OrderId) -> Result<Order, BookError> {
            Err(BookError::OrderNotFound(order_id))
        }

        fn best_bid(&self) -> Result<u64, BookError> {
            self.best_bid.ok_or(BookError::EmptySide(Side::Buy))
        }

        fn best_ask(&self) -> Result<u64, BookError> {
            self.best_ask.ok_or(BookError::EmptySide(Side::Sell))
        }

        fn bid_volume(&self) -> u64 {
            0
        }

        fn ask_volume(&self) -> u64 {
            0
        }

        fn snapshot(&self) -> BookSnapshot {
            BookSnapshot::default()
        }

        fn trade_log(&self) -> &[Match] {
            &[]
        }
    }

    #[test]
    fn test_trait_spread_calculation() {
        let mock = MockOrderBook {
            best_bid: Some(9_000),
            best_ask: Some(10_000),
        };

        assert_eq!(mock.spread(), Some(1_000));
        assert_eq!(mock.mid_price(), Some(9_500));
    }

    #[test]
    fn test_trait_empty_orderbook() {
        let mock = MockOrderBook {
            best_bid: None,
            best_ask: Some(10_000),
        };

        assert_eq!(mock.spread(), None);
        assert_eq!(mock.mid_price(), None);
    }

    #[test]
    fn test_trait_crossed_orderbook() {
        let mock = MockOrderBook {
            best_bid: Some(10_100),
            best_ask: Some(10_000),
        };

        assert_eq!(mock.spread(), None);
        assert_eq!(mock.mid_price(), None);
    }
}
