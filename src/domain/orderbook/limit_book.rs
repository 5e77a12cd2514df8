/// Price-time priority limit order book
///
/// ## Layout
/// - `bids` / `asks`: `BTreeMap<price, PriceLevel>`. Best bid is the last
///   bid key, best ask the first ask key.
/// - `pool`: slot storage for every resting order; levels link slots into
///   FIFO queues.
/// - `index`: order id to slot key, the single source of truth for whether
///   an order still rests.
/// - `trades`: append-only match log.
/// - `bid_total` / `ask_total`: running resting volume per side. A level's
///   volume never exceeds its side total, so checking the total on insert
///   keeps every level sum in range.
///
/// Limit orders rest at their requested price even when that crosses the
/// opposite side. Only market orders walk the book.
use std::collections::{BTreeMap, HashMap};

use smallvec::SmallVec;

use super::level::PriceLevel;
use super::pool::OrderPool;
use super::traits::{BookSnapshot, OrderBook};
use crate::domain::error::BookError;
use crate::domain::order::{AccountId, Location, Order, OrderId};
use crate::domain::trade::{Match, MarketExecution};
use crate::shared::protocol::{AccountOrders, OrderView, Side};
use crate::shared::timestamp::cached_timestamp;

const DEFAULT_CAPACITY: usize = 1024;

#[derive(Debug, Clone)]
pub struct LimitOrderBook {
    bids: BTreeMap<u64, PriceLevel>,
    asks: BTreeMap<u64, PriceLevel>,
    pool: OrderPool,
    index: HashMap<OrderId, usize>,
    trades: Vec<Match>,
    bid_total: u64,
    ask_total: u64,
}

impl LimitOrderBook {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Pre-sizes order storage for `capacity` resting orders
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bids: BTreeMap::new(),
            asks: BTreeMap::new(),
            pool: OrderPool::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
            trades: Vec::new(),
            bid_total: 0,
            ask_total: 0,
        }
    }

    /// Copy of a resting order
    pub fn get_order(&self, order_id: OrderId) -> Option<Order> {
        let key = *self.index.get(&order_id)?;
        self.pool.get(key).map(|node| node.order.clone())
    }

    /// Number of resting orders across both sides
    pub fn order_count(&self) -> usize {
        self.index.len()
    }

    pub fn bid_levels(&self) -> usize {
        self.bids.len()
    }

    pub fn ask_levels(&self) -> usize {
        self.asks.len()
    }

    /// Resting orders owned by `account`, each side in priority order
    pub fn orders_for_account(&self, account: AccountId) -> AccountOrders {
        AccountOrders {
            bids: self.account_views(self.bids.values().rev(), account),
            asks: self.account_views(self.asks.values(), account),
        }
    }

    fn account_views<'a>(
        &'a self,
        levels: impl Iterator<Item = &'a PriceLevel>,
        account: AccountId,
    ) -> Vec<OrderView> {
        levels
            .flat_map(|level| level.iter(&self.pool))
            .filter(|order| order.account == account)
            .filter_map(Order::view)
            .collect()
    }
}

fn check_fresh(order: &Order) -> Result<(), BookError> {
    if order.remaining == 0 {
        return Err(BookError::InvalidOrder("size must be positive".into()));
    }
    if order.remaining != order.size {
        return Err(BookError::InvalidOrder(format!(
            "order {} has remaining {} against size {}",
            order.id, order.remaining, order.size
        )));
    }
    Ok(())
}

impl Default for LimitOrderBook {
    fn default() -> Self {
        Self::new()
    }
}

impl OrderBook for LimitOrderBook {
    fn place_limit(&mut self, mut order: Order, price: u64) -> Result<(), BookError> {
        check_fresh(&order)?;
        if price == 0 {
            return Err(BookError::InvalidOrder("price must be positive".into()));
        }
        if self.index.contains_key(&order.id) {
            return Err(BookError::DuplicateOrder(order.id));
        }

        let id = order.id;
        let side = order.side;
        let (levels, total) = match side {
            Side::Buy => (&mut self.bids, &mut self.bid_total),
            Side::Sell => (&mut self.asks, &mut self.ask_total),
        };
        *total = total.checked_add(order.remaining).ok_or_else(|| {
            BookError::InvalidOrder(format!("resting {} volume would overflow", side))
        })?;

        order.location = Some(Location { side, price });
        let key = self.pool.insert(order);
        levels
            .entry(price)
            .or_insert_with(|| PriceLevel::new(price))
            .push_back(&mut self.pool, key);
        self.index.insert(id, key);

        Ok(())
    }

    fn place_market(&mut self, mut order: Order) -> Result<MarketExecution, BookError> {
        check_fresh(&order)?;
        order.location = None;

        let Self {
            bids,
            asks,
            pool,
            index,
            trades,
            bid_total,
            ask_total,
        } = self;
        let (opposite, opposite_total) = match order.side {
            Side::Buy => (asks, ask_total),
            Side::Sell => (bids, bid_total),
        };

        let mut matches: SmallVec<[Match; 8]> = SmallVec::new();

        while order.remaining > 0 {
            let best = match order.side {
                Side::Buy => opposite.keys().next().copied(),
                Side::Sell => opposite.keys().next_back().copied(),
            };
            let Some(price) = best else { break };
            let Some(level) = opposite.get_mut(&price) else { break };

            while order.remaining > 0 {
                let Some(key) = level.head else { break };
                let Some(node) = pool.get_mut(key) else { break };
                let maker = &mut node.order;

                let filled = order.fill(maker.remaining);
                maker.fill(filled);
                level.reduce_volume(filled);
                *opposite_total -= filled;

                let record = Match {
                    sequence: trades.len() as u64 + 1,
                    maker_order_id: maker.id,
                    maker_account: maker.account,
                    taker_order_id: order.id,
                    taker_account: order.account,
                    taker_side: order.side,
                    price,
                    size: filled,
                    timestamp: cached_timestamp(),
                };
                tracing::debug!(
                    maker = record.maker_order_id,
                    taker = record.taker_order_id,
                    price,
                    size = filled,
                    "match"
                );
                trades.push(record.clone());
                matches.push(record);

                if maker.is_filled() {
                    let maker_id = maker.id;
                    level.unlink(pool, key);
                    pool.remove(key);
                    index.remove(&maker_id);
                }
            }

            // A level survives only when the taker ran out first
            if !level.is_empty() {
                break;
            }
            opposite.remove(&price);
        }

        Ok(MarketExecution {
            order_id: order.id,
            side: order.side,
            requested: order.size,
            remaining: order.remaining,
            matches,
        })
    }

    fn cancel(&mut self, order_id: OrderId) -> Result<Order, BookError> {
        let key = *self
            .index
            .get(&order_id)
            .ok_or(BookError::OrderNotFound(order_id))?;
        let (location, remaining) = self
            .pool
            .get(key)
            .and_then(|node| Some((node.order.location?, node.order.remaining)))
            .ok_or(BookError::OrderNotFound(order_id))?;

        let (levels, total) = match location.side {
            Side::Buy => (&mut self.bids, &mut self.bid_total),
            Side::Sell => (&mut self.asks, &mut self.ask_total),
        };
        *total -= remaining;
        if let Some(level) = levels.get_mut(&location.price) {
            level.unlink(&mut self.pool, key);
            if level.is_empty() {
                levels.remove(&location.price);
            }
        }

        self.index.remove(&order_id);
        self.pool
            .remove(key)
            .map(|node| node.order)
            .ok_or(BookError::OrderNotFound(order_id))
    }

    fn best_bid(&self) -> Result<u64, BookError> {
        self.bids
            .keys()
            .next_back()
            .copied()
            .ok_or(BookError::EmptySide(Side::Buy))
    }

    fn best_ask(&self) -> Result<u64, BookError> {
        self.asks
            .keys()
            .next()
            .copied()
            .ok_or(BookError::EmptySide(Side::Sell))
    }

    fn bid_volume(&self) -> u64 {
        self.bid_total
    }

    fn ask_volume(&self) -> u64 {
        self.ask_total
    }

    fn snapshot(&self) -> BookSnapshot {
        BookSnapshot {
            bids: self
                .bids
                .values()
                .rev()
                .map(|level| level.snapshot(&self.pool))
                .collect(),
            asks: self
                .asks
                .values()
                .map(|level| level.snapshot(&self.pool))
                .collect(),
            bid_volume: self.bid_volume(),
            ask_volume: self.ask_volume(),
        }
    }

    fn trade_log(&self) -> &[Match] {
        &self.trades
    }
}
