/// Order Validator - Pre-trade Request Checks
///
/// Rejects malformed or out-of-policy requests before they reach a book, so
/// a rejected request never takes the book lock.
///
/// ## Validation Rules
/// - Size must be positive and inside `[min_size, max_size]`
/// - Limit price must be positive and inside `[min_price, max_price]`
/// - Market orders carry no price; their `price` field is ignored
/// - Market name must not be empty, and must be listed when
///   `allowed_markets` is configured
///
/// ## Usage
/// ```rust,ignore
/// use exchange_engine::domain::validation::OrderValidator;
/// use exchange_engine::shared::protocol::{PlaceOrderRequest, Side};
///
/// let validator = OrderValidator::new();
/// let request = PlaceOrderRequest::limit("ETH", 7, Side::Buy, 9_100, 1_000);
/// assert!(validator.validate(&request).is_ok());
/// ```
use thiserror::Error;

use crate::shared::protocol::{OrderKind, PlaceOrderRequest};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Limit price is zero
    #[error("invalid price: {0}")]
    InvalidPrice(String),

    /// Size is zero
    #[error("invalid size: {0}")]
    InvalidSize(String),

    #[error("price out of range: {0}")]
    PriceOutOfRange(String),

    #[error("size out of range: {0}")]
    SizeOutOfRange(String),

    /// Market name empty or not allowed
    #[error("invalid market: {0}")]
    InvalidMarket(String),
}

impl ValidationError {
    /// Short label for metrics
    pub fn reason(&self) -> &'static str {
        match self {
            ValidationError::InvalidPrice(_) => "invalid_price",
            ValidationError::InvalidSize(_) => "invalid_size",
            ValidationError::PriceOutOfRange(_) => "price_out_of_range",
            ValidationError::SizeOutOfRange(_) => "size_out_of_range",
            ValidationError::InvalidMarket(_) => "invalid_market",
        }
    }
}

/// Default size ceiling. Bounded so a handful of accepted orders cannot
/// push a side's resting volume past `u64::MAX`.
pub const DEFAULT_MAX_SIZE: u64 = 1_000_000_000_000;

#[derive(Debug, Clone)]
pub struct ValidationConfig {
    /// Minimum limit price (inclusive)
    pub min_price: u64,

    /// Maximum limit price (inclusive)
    pub max_price: u64,

    /// Minimum size (inclusive)
    pub min_size: u64,

    /// Maximum size (inclusive)
    pub max_size: u64,

    /// Allowed markets (empty means all markets allowed)
    pub allowed_markets: Vec<String>,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            min_price: 1,
            max_price: u64::MAX,
            min_size: 1,
            max_size: DEFAULT_MAX_SIZE,
            allowed_markets: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct OrderValidator {
    config: ValidationConfig,
}

impl OrderValidator {
    /// Creates a validator with the default (permissive) limits
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ValidationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    pub fn validate(&self, request: &PlaceOrderRequest) -> Result<(), ValidationError> {
        self.validate_market(&request.market)?;
        self.validate_size(request.size)?;

        if request.kind == OrderKind::Limit {
            self.validate_price(request.price)?;
        }

        Ok(())
    }

    fn validate_price(&self, price: u64) -> Result<(), ValidationError> {
        if price == 0 {
            return Err(ValidationError::InvalidPrice(
                "price must be greater than zero".to_string(),
            ));
        }

        if price < self.config.min_price {
            return Err(ValidationError::PriceOutOfRange(format!(
                "price {} is below minimum {}",
                price, self.config.min_price
            )));
        }

        if price > self.config.max_price {
            return Err(ValidationError::PriceOutOfRange(format!(
                "price {} exceeds maximum {}",
                price, self.config.max_price
            )));
        }

        Ok(())
    }

    fn validate_size(&self, size: u64) -> Result<(), ValidationError> {
        if size == 0 {
            return Err(ValidationError::InvalidSize(
                "size must be greater than zero".to_string(),
            ));
        }

        if size < self.config.min_size {
            return Err(ValidationError::SizeOutOfRange(format!(
                "size {} is below minimum {}",
                size, self.config.min_size
            )));
        }

        if size > self.config.max_size {
            return Err(ValidationError::SizeOutOfRange(format!(
                "size {} exceeds maximum {}",
                size, self.config.max_size
            )));
        }

        Ok(())
    }

    fn validate_market(&self, market: &str) -> Result<(), ValidationError> {
        if market.is_empty() {
            return Err(ValidationError::InvalidMarket(
                "market cannot be empty".to_string(),
            ));
        }

        if !self.config.allowed_markets.is_empty()
            && !self.config.allowed_markets.iter().any(|m| m == market)
        {
            return Err(ValidationError::InvalidMarket(format!(
                "market '{}' is not in allowed list",
                market
            )));
        }

        Ok(())
    }
}
