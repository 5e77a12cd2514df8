/// Slot pool owning every resting order
///
/// Orders live in a `Vec` of slots addressed by index. Freed slots are
/// chained into a free list and reused before the vector grows, so steady
/// state placement and cancellation do not allocate.
use crate::domain::order::Order;

/// A resting order plus its links inside its price level
#[derive(Debug, Clone)]
pub struct OrderNode {
    pub order: Order,
    pub prev: Option<usize>,
    pub next: Option<usize>,
}

#[derive(Debug, Clone)]
enum Slot {
    Occupied(OrderNode),
    Free { next_free: Option<usize> },
}

#[derive(Debug, Clone, Default)]
pub struct OrderPool {
    slots: Vec<Slot>,
    free_head: Option<usize>,
    len: usize,
}

impl OrderPool {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free_head: None,
            len: 0,
        }
    }

    /// Stores an unlinked order and returns its slot key
    pub fn insert(&mut self, order: Order) -> usize {
        let node = Slot::Occupied(OrderNode {
            order,
            prev: None,
            next: None,
        });
        self.len += 1;

        match self.free_head {
            Some(key) => {
                if let Slot::Free { next_free } = self.slots[key] {
                    self.free_head = next_free;
                }
                self.slots[key] = node;
                key
            }
            None => {
                self.slots.push(node);
                self.slots.len() - 1
            }
        }
    }

    /// Releases a slot, returning the node it held
    pub fn remove(&mut self, key: usize) -> Option<OrderNode> {
        let slot = self.slots.get_mut(key)?;
        if matches!(slot, Slot::Free { .. }) {
            return None;
        }

        let freed = std::mem::replace(
            slot,
            Slot::Free {
                next_free: self.free_head,
            },
        );
        self.free_head = Some(key);
        self.len -= 1;

        match freed {
            Slot::Occupied(node) => Some(node),
            Slot::Free { .. } => None,
        }
    }

    #[inline]
    pub fn get(&self, key: usize) -> Option<&OrderNode> {
        match self.slots.get(key)? {
            Slot::Occupied(node) => Some(node),
            Slot::Free { .. } => None,
        }
    }

    #[inline]
    pub fn get_mut(&mut self, key: usize) -> Option<&mut OrderNode> {
        match self.slots.get_mut(key)? {
            Slot::Occupied(node) => Some(node),
            Slot::Free { .. } => None,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}
