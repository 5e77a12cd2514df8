/// A single price level: FIFO queue of resting orders at one price
///
/// The queue is a doubly linked list threaded through the `OrderPool` slots,
/// so unlinking an arbitrary order (cancellation) is O(1). `volume` caches
/// the sum of the linked orders' remaining sizes.
use serde::{Deserialize, Serialize};

use super::pool::OrderPool;
use crate::domain::order::Order;
use crate::shared::protocol::OrderView;

#[derive(Debug, Clone)]
pub struct PriceLevel {
    pub price: u64,
    pub volume: u64,
    pub order_count: usize,
    pub head: Option<usize>,
    pub tail: Option<usize>,
}

impl PriceLevel {
    pub fn new(price: u64) -> Self {
        Self {
            price,
            volume: 0,
            order_count: 0,
            head: None,
            tail: None,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Appends the order stored at `key` to the back of the queue
    pub fn push_back(&mut self, pool: &mut OrderPool, key: usize) {
        let remaining = match pool.get_mut(key) {
            Some(node) => {
                node.prev = self.tail;
                node.next = None;
                node.order.remaining
            }
            None => return,
        };

        match self.tail {
            Some(tail) => {
                if let Some(node) = pool.get_mut(tail) {
                    node.next = Some(key);
                }
            }
            None => self.head = Some(key),
        }

        self.tail = Some(key);
        self.volume += remaining;
        self.order_count += 1;
    }

    /// Detaches the order at `key` and subtracts its remaining size
    pub fn unlink(&mut self, pool: &mut OrderPool, key: usize) {
        let (prev, next, remaining) = match pool.get_mut(key) {
            Some(node) => {
                let links = (node.prev, node.next, node.order.remaining);
                node.prev = None;
                node.next = None;
                links
            }
            None => return,
        };

        match prev {
            Some(p) => {
                if let Some(node) = pool.get_mut(p) {
                    node.next = next;
                }
            }
            None => self.head = next,
        }
        match next {
            Some(n) => {
                if let Some(node) = pool.get_mut(n) {
                    node.prev = prev;
                }
            }
            None => self.tail = prev,
        }

        self.volume -= remaining;
        self.order_count -= 1;
    }

    /// Accounts for a partial or full fill of an order in this level
    #[inline]
    pub fn reduce_volume(&mut self, filled: u64) {
        self.volume -= filled;
    }

    /// Orders in arrival order
    pub fn iter<'a>(&self, pool: &'a OrderPool) -> LevelIter<'a> {
        LevelIter {
            pool,
            cursor: self.head,
        }
    }

    pub fn snapshot(&self, pool: &OrderPool) -> LevelSnapshot {
        LevelSnapshot {
            price: self.price,
            volume: self.volume,
            orders: self.iter(pool).filter_map(Order::view).collect(),
        }
    }
}

pub struct LevelIter<'a> {
    pool: &'a OrderPool,
    cursor: Option<usize>,
}

impl<'a> Iterator for LevelIter<'a> {
    type Item = &'a Order;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.pool.get(self.cursor?)?;
        self.cursor = node.next;
        Some(&node.order)
    }
}

/// Copy of one level, detached from the book
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelSnapshot {
    pub price: u64,
    pub volume: u64,
    pub orders: Vec<OrderView>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::Location;
    use crate::shared::protocol::Side;

    fn resting(pool: &mut OrderPool, id: u64, size: u64) -> usize {
        let mut order = Order::with_id(id, 1, Side::Sell, size);
        order.location = Some(Location { side: Side::Sell, price: 100 });
        pool.insert(order)
    }

    fn ids(level: &PriceLevel, pool: &OrderPool) -> Vec<u64> {
        level.iter(pool).map(|o| o.id).collect()
    }

    #[test]
    fn test_push_back_keeps_arrival_order() {
        let mut pool = OrderPool::default();
        let mut level = PriceLevel::new(100);

        for id in 1..=3 {
            let key = resting(&mut pool, id, 10 * id);
            level.push_back(&mut pool, key);
        }

        assert_eq!(ids(&level, &pool), vec![1, 2, 3]);
        assert_eq!(level.volume, 60);
        assert_eq!(level.order_count, 3);
    }

    #[test]
    fn test_unlink_middle_head_and_tail() {
        let mut pool = OrderPool::default();
        let mut level = PriceLevel::new(100);
        let keys: Vec<usize> = (1..=3)
            .map(|id| {
                let key = resting(&mut pool, id, 10);
                level.push_back(&mut pool, key);
                key
            })
            .collect();

        level.unlink(&mut pool, keys[1]);
        assert_eq!(ids(&level, &pool), vec![1, 3]);

        level.unlink(&mut pool, keys[0]);
        assert_eq!(ids(&level, &pool), vec![3]);

        level.unlink(&mut pool, keys[2]);
        assert!(level.is_empty());
        assert_eq!(level.tail, None);
        assert_eq!(level.volume, 0);
        assert_eq!(level.order_count, 0);
    }

    #[test]
    fn test_snapshot_copies_orders() {
        let mut pool = OrderPool::default();
        let mut level = PriceLevel::new(100);
        let key = resting(&mut pool, 5, 40);
        level.push_back(&mut pool, key);

        let snapshot = level.snapshot(&pool);
        assert_eq!(snapshot.price, 100);
        assert_eq!(snapshot.volume, 40);
        assert_eq!(snapshot.orders.len(), 1);
        assert_eq!(snapshot.orders[0].id, 5);
    }
}
