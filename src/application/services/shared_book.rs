/// Shared Order Book - Concurrency Wrapper
///
/// One `SharedOrderBook` guards one market's book behind a `parking_lot`
/// reader-writer lock.
///
/// ## Locking
/// - Mutations (`place_limit`, `place_market`, `cancel`) take the write
///   lock for their whole duration. A market order that walks several
///   levels is a single critical section.
/// - Queries take the read lock and run in parallel with each other.
/// - Nothing here awaits or performs I/O while a guard is held, and every
///   query returns owned values, never references into the book.
///
/// ## Metrics
/// Each mutation times the work done while holding the write guard, not the
/// wait to acquire it. The resting volumes are read under the guard and
/// published to the gauges after it is dropped.
use std::time::{Duration, Instant};

use parking_lot::RwLock;

use crate::domain::error::BookError;
use crate::domain::order::{AccountId, Order, OrderId};
use crate::domain::orderbook::{BookSnapshot, LimitOrderBook, OrderBook};
use crate::domain::trade::{MarketExecution, Match};
use crate::shared::metrics::METRICS;
use crate::shared::protocol::{AccountOrders, OrderKind, Side};

pub struct SharedOrderBook<B: OrderBook = LimitOrderBook> {
    market: String,
    book: RwLock<B>,
}

impl<B: OrderBook> SharedOrderBook<B> {
    pub fn new(market: impl Into<String>, book: B) -> Self {
        Self {
            market: market.into(),
            book: RwLock::new(book),
        }
    }

    pub fn market(&self) -> &str {
        &self.market
    }

    pub fn place_limit(&self, order: Order, price: u64) -> Result<(), BookError> {
        let side = order.side;
        let result = self.mutate(|book| book.place_limit(order, price));

        if result.is_ok() {
            self.record_order(OrderKind::Limit, side);
        }
        result
    }

    pub fn place_market(&self, order: Order) -> Result<MarketExecution, BookError> {
        let side = order.side;
        let result = self.mutate(|book| book.place_market(order));

        if let Ok(execution) = &result {
            self.record_order(OrderKind::Market, side);
            METRICS
                .matches_total
                .with_label_values(&[self.market.as_str()])
                .inc_by(execution.matches.len() as f64);
            METRICS
                .matched_size_total
                .with_label_values(&[self.market.as_str()])
                .inc_by(execution.filled() as f64);
        }
        result
    }

    pub fn cancel(&self, order_id: OrderId) -> Result<Order, BookError> {
        let result = self.mutate(|book| book.cancel(order_id));

        let status = if result.is_ok() { "ok" } else { "not_found" };
        METRICS
            .cancellations_total
            .with_label_values(&[self.market.as_str(), status])
            .inc();
        result
    }

    pub fn best_bid(&self) -> Result<u64, BookError> {
        self.book.read().best_bid()
    }

    pub fn best_ask(&self) -> Result<u64, BookError> {
        self.book.read().best_ask()
    }

    pub fn bid_volume(&self) -> u64 {
        self.book.read().bid_volume()
    }

    pub fn ask_volume(&self) -> u64 {
        self.book.read().ask_volume()
    }

    pub fn spread(&self) -> Option<u64> {
        self.book.read().spread()
    }

    pub fn mid_price(&self) -> Option<u64> {
        self.book.read().mid_price()
    }

    pub fn snapshot(&self) -> BookSnapshot {
        self.book.read().snapshot()
    }

    /// Copy of the full match history
    pub fn trade_log(&self) -> Vec<Match> {
        self.book.read().trade_log().to_vec()
    }

    pub fn trade_count(&self) -> usize {
        self.book.read().trade_log().len()
    }

    pub fn last_trade(&self) -> Option<Match> {
        self.book.read().trade_log().last().cloned()
    }

    /// Runs `f` under the read lock
    ///
    /// `f` must not block; it holds up every writer on this market.
    pub fn read<R>(&self, f: impl FnOnce(&B) -> R) -> R {
        f(&*self.book.read())
    }

    fn mutate<R>(&self, f: impl FnOnce(&mut B) -> R) -> R {
        let (result, bid_volume, ask_volume, held) = {
            let mut book = self.book.write();
            let started = Instant::now();
            let result = f(&mut *book);
            (result, book.bid_volume(), book.ask_volume(), started.elapsed())
        };

        self.record_duration(held);
        self.record_volumes(bid_volume, ask_volume);
        result
    }

    fn record_volumes(&self, bid_volume: u64, ask_volume: u64) {
        METRICS
            .book_volume
            .with_label_values(&[self.market.as_str(), Side::Buy.as_str()])
            .set(bid_volume as f64);
        METRICS
            .book_volume
            .with_label_values(&[self.market.as_str(), Side::Sell.as_str()])
            .set(ask_volume as f64);
    }

    fn record_duration(&self, held: Duration) {
        METRICS
            .matching_duration
            .with_label_values(&[self.market.as_str()])
            .observe(held.as_secs_f64() * 1_000_000.0);
    }

    fn record_order(&self, kind: OrderKind, side: Side) {
        METRICS
            .orders_total
            .with_label_values(&[self.market.as_str(), kind.as_str(), side.as_str()])
            .inc();
    }
}

impl SharedOrderBook<LimitOrderBook> {
    /// Empty `LimitOrderBook` for `market`
    pub fn with_market(market: impl Into<String>) -> Self {
        Self::new(market, LimitOrderBook::new())
    }

    pub fn get_order(&self, order_id: OrderId) -> Option<Order> {
        self.book.read().get_order(order_id)
    }

    pub fn order_count(&self) -> usize {
        self.book.read().order_count()
    }

    pub fn bid_levels(&self) -> usize {
        self.book.read().bid_levels()
    }

    pub fn ask_levels(&self) -> usize {
        self.book.read().ask_levels()
    }

    pub fn orders_for_account(&self, account: AccountId) -> AccountOrders {
        self.book.read().orders_for_account(account)
    }
}
