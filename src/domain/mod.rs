/// Domain Layer - Core Business Logic
///
/// Pure matching logic with no I/O. Everything here can be exercised
/// without a runtime, a lock or the settlement layer.
///
/// ## Modules
/// - `order`: order entity and id allocation
/// - `trade`: match records and market execution results
/// - `orderbook`: the book and its matching algorithm
/// - `validation`: pre-trade request checks
/// - `error`: book error taxonomy

pub mod error;
pub mod order;
pub mod trade;
pub mod orderbook;
pub mod validation;

// Re-export key types
pub use error::BookError;
pub use order::{AccountId, Order, OrderId};
pub use orderbook::{BookSnapshot, LimitOrderBook, OrderBook};
pub use trade::{MarketExecution, Match};
