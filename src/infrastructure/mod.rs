/// Infrastructure Layer - Technical Implementations
///
/// Everything that talks to the outside world on behalf of the exchange.
/// Depends on the application layer; nothing below depends on it.
///
/// ## Modules
/// - `observability`: metrics and health over HTTP

pub mod observability;

pub use observability::{HealthChecker, ObservabilityServer};
