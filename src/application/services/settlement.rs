/// Settlement Collaborators
///
/// The book only knows integer account ids. After a market order's matches
/// are final, the exchange resolves both counterparties through an
/// `AccountDirectory` and hands one `SettlementInstruction` per match to a
/// `SettlementService`.
///
/// For every match the seller pays the buyer `size` base units. A failed
/// settlement never reverts the match.
use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::order::AccountId;
use crate::domain::trade::Match;
use crate::shared::timestamp::now_nanos;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettlementError {
    #[error("account {0} has no settlement credentials")]
    UnknownAccount(AccountId),

    #[error("insufficient balance at {address}: need {required}, have {available}")]
    InsufficientBalance {
        address: String,
        required: u64,
        available: u64,
    },

    #[error("settlement rejected: {0}")]
    Rejected(String),
}

/// What the settlement layer needs to move value for one account
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SettlementCredentials {
    pub address: String,
}

impl SettlementCredentials {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
        }
    }
}

pub trait AccountDirectory: Send + Sync {
    fn credentials(&self, account: AccountId) -> Option<SettlementCredentials>;
}

/// Directory backed by a map, populated at startup
#[derive(Debug, Default)]
pub struct InMemoryAccountDirectory {
    accounts: RwLock<HashMap<AccountId, SettlementCredentials>>,
}

impl InMemoryAccountDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, account: AccountId, credentials: SettlementCredentials) {
        self.accounts.write().insert(account, credentials);
    }

    pub fn len(&self) -> usize {
        self.accounts.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.read().is_empty()
    }
}

impl AccountDirectory for InMemoryAccountDirectory {
    fn credentials(&self, account: AccountId) -> Option<SettlementCredentials> {
        self.accounts.read().get(&account).cloned()
    }
}

/// One value transfer derived from one match
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementInstruction {
    pub market: String,
    /// Trade log sequence of the originating match
    pub sequence: u64,
    /// Seller
    pub payer: SettlementCredentials,
    /// Buyer
    pub payee: SettlementCredentials,
    pub amount: u64,
    pub price: u64,
}

impl SettlementInstruction {
    /// Resolves both sides of `m` through `directory`
    pub fn for_match(
        market: &str,
        m: &Match,
        directory: &dyn AccountDirectory,
    ) -> Result<Self, SettlementError> {
        let seller = m.seller_account();
        let buyer = m.buyer_account();

        let payer = directory
            .credentials(seller)
            .ok_or(SettlementError::UnknownAccount(seller))?;
        let payee = directory
            .credentials(buyer)
            .ok_or(SettlementError::UnknownAccount(buyer))?;

        Ok(Self {
            market: market.to_string(),
            sequence: m.sequence,
            payer,
            payee,
            amount: m.size,
            price: m.price,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementReceipt {
    pub sequence: u64,
    pub payer: String,
    pub payee: String,
    pub amount: u64,
    pub settled_at: u64,
}

#[async_trait]
pub trait SettlementService: Send + Sync {
    async fn settle(
        &self,
        instruction: &SettlementInstruction,
    ) -> Result<SettlementReceipt, SettlementError>;
}

/// In-memory ledger keyed by address
///
/// Rejects a transfer that exceeds the payer's balance and otherwise moves
/// `amount` from payer to payee atomically.
#[derive(Debug, Default)]
pub struct LedgerSettlement {
    balances: Mutex<HashMap<String, u64>>,
}

impl LedgerSettlement {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credits `amount` to `address`
    pub fn fund(&self, address: &str, amount: u64) {
        let mut balances = self.balances.lock();
        let balance = balances.entry(address.to_string()).or_insert(0);
        *balance = balance.saturating_add(amount);
    }

    pub fn balance(&self, address: &str) -> u64 {
        self.balances.lock().get(address).copied().unwrap_or(0)
    }

    fn transfer(&self, payer: &str, payee: &str, amount: u64) -> Result<(), SettlementError> {
        if payer == payee {
            return Ok(());
        }

        let mut balances = self.balances.lock();
        let available = balances.get(payer).copied().unwrap_or(0);
        if available < amount {
            return Err(SettlementError::InsufficientBalance {
                address: payer.to_string(),
                required: amount,
                available,
            });
        }

        balances.insert(payer.to_string(), available - amount);
        let credited = balances.entry(payee.to_string()).or_insert(0);
        *credited = credited.saturating_add(amount);
        Ok(())
    }
}

#[async_trait]
impl SettlementService for LedgerSettlement {
    async fn settle(
        &self,
        instruction: &SettlementInstruction,
    ) -> Result<SettlementReceipt, SettlementError> {
        if instruction.amount == 0 {
            return Err(SettlementError::Rejected("zero amount".to_string()));
        }

        self.transfer(
            &instruction.payer.address,
            &instruction.payee.address,
            instruction.amount,
        )?;

        Ok(SettlementReceipt {
            sequence: instruction.sequence,
            payer: instruction.payer.address.clone(),
            payee: instruction.payee.address.clone(),
            amount: instruction.amount,
            settled_at: now_nanos(),
        })
    }
}
