/// Match records and market execution results
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::domain::order::{AccountId, OrderId};
use crate::shared::protocol::Side;

/// One fill between a resting (maker) order and an incoming (taker) order
///
/// Executes at the maker's price. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    /// Position in the book's trade log, starting at 1
    pub sequence: u64,
    pub maker_order_id: OrderId,
    pub maker_account: AccountId,
    pub taker_order_id: OrderId,
    pub taker_account: AccountId,
    /// Side of the incoming order
    pub taker_side: Side,
    pub price: u64,
    pub size: u64,
    pub timestamp: u64,
}

impl Match {
    pub fn buyer_account(&self) -> AccountId {
        match self.taker_side {
            Side::Buy => self.taker_account,
            Side::Sell => self.maker_account,
        }
    }

    pub fn seller_account(&self) -> AccountId {
        match self.taker_side {
            Side::Buy => self.maker_account,
            Side::Sell => self.taker_account,
        }
    }

    /// Price times size, widened so it cannot overflow
    pub fn notional(&self) -> u128 {
        self.price as u128 * self.size as u128
    }
}

/// Result of executing a market order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketExecution {
    pub order_id: OrderId,
    pub side: Side,
    pub requested: u64,
    /// Size that found no liquidity; dropped, not an error
    pub remaining: u64,
    /// Matches in execution order
    pub matches: SmallVec<[Match; 8]>,
}

impl MarketExecution {
    pub fn filled(&self) -> u64 {
        self.requested - self.remaining
    }

    pub fn is_complete(&self) -> bool {
        self.remaining == 0
    }

    /// Size-weighted average execution price, rounded down
    pub fn average_price(&self) -> Option<u64> {
        let filled = self.filled();
        if filled == 0 {
            return None;
        }
        let notional: u128 = self.matches.iter().map(Match::notional).sum();
        Some((notional / filled as u128) as u64)
    }
}
