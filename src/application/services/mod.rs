/// Application Services
///
/// - `shared_book`: per-market reader-writer lock around an `OrderBook`
/// - `settlement`: account directory and settlement service seams
/// - `exchange`: application context tying markets and settlement together

pub mod shared_book;
pub mod settlement;
pub mod exchange;

pub use exchange::{Exchange, ExchangeError};
pub use settlement::{
    AccountDirectory, InMemoryAccountDirectory, LedgerSettlement, SettlementCredentials,
    SettlementError, SettlementInstruction, SettlementReceipt, SettlementService,
};
pub use shared_book::SharedOrderBook;
