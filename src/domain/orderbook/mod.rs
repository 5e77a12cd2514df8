/// Domain Layer - OrderBook Module
///
/// The matching engine proper: resting order storage, price levels and the
/// price-time priority book built from them.
///
/// ## Layout
/// - `traits`: `OrderBook` operation set and `BookSnapshot`
/// - `pool`: slot storage owning resting orders
/// - `level`: FIFO queue of orders at one price
/// - `limit_book`: `LimitOrderBook`, the production implementation

pub mod traits;
pub mod pool;
pub mod level;
pub mod limit_book;

pub use level::{LevelSnapshot, PriceLevel};
pub use limit_book::LimitOrderBook;
pub use traits::{BookSnapshot, OrderBook};
