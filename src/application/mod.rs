/// Application Layer - Services
///
/// Orchestrates the domain: wraps each book in its lock, routes requests to
/// the right market and settles matches once the lock is released. Depends
/// on the domain layer only; collaborators are injected as trait objects.
///
/// ## Modules
/// - `services`: SharedOrderBook, Exchange, settlement collaborators

pub mod services;

// Re-export key services
pub use services::{Exchange, ExchangeError, SharedOrderBook};
