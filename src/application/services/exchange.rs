/// Exchange - Application Context
///
/// Owns one `SharedOrderBook` per market plus the collaborators needed to
/// turn a client request into book operations and settlements. Built once at
/// startup and shared behind an `Arc`; there is no ambient global state.
///
/// ## Order flow
/// 1. Validate the request (no lock taken on rejection)
/// 2. Run the book operation under that market's write lock
/// 3. Release the lock, then settle each match in execution order
use std::collections::BTreeMap;
use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use super::settlement::{AccountDirectory, SettlementInstruction, SettlementService};
use super::shared_book::SharedOrderBook;
use crate::domain::error::BookError;
use crate::domain::order::{AccountId, Order, OrderId};
use crate::domain::orderbook::BookSnapshot;
use crate::domain::trade::Match;
use crate::domain::validation::{OrderValidator, ValidationError};
use crate::shared::metrics::METRICS;
use crate::shared::protocol::{
    AccountOrders, OrderKind, PlaceOrderRequest, PlaceOrderResponse, PriceResponse,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExchangeError {
    #[error("unknown market: {0}")]
    UnknownMarket(String),

    #[error(transparent)]
    Rejected(#[from] ValidationError),

    #[error(transparent)]
    Book(#[from] BookError),
}

pub struct Exchange {
    markets: BTreeMap<String, Arc<SharedOrderBook>>,
    directory: Arc<dyn AccountDirectory>,
    settlement: Arc<dyn SettlementService>,
    validator: OrderValidator,
}

impl Exchange {
    /// Creates an exchange with an empty book for each market name
    pub fn new<I, S>(
        markets: I,
        directory: Arc<dyn AccountDirectory>,
        settlement: Arc<dyn SettlementService>,
        validator: OrderValidator,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let markets = markets
            .into_iter()
            .map(|name| {
                let name = name.into();
                let book = Arc::new(SharedOrderBook::with_market(name.clone()));
                (name, book)
            })
            .collect();

        Self {
            markets,
            directory,
            settlement,
            validator,
        }
    }

    pub fn market(&self, name: &str) -> Result<&Arc<SharedOrderBook>, ExchangeError> {
        self.markets
            .get(name)
            .ok_or_else(|| ExchangeError::UnknownMarket(name.to_string()))
    }

    /// Every market, ordered by name
    pub fn markets(&self) -> impl Iterator<Item = &Arc<SharedOrderBook>> {
        self.markets.values()
    }

    pub async fn place_order(
        &self,
        request: PlaceOrderRequest,
    ) -> Result<PlaceOrderResponse, ExchangeError> {
        if let Err(e) = self.validator.validate(&request) {
            METRICS.rejections_total.with_label_values(&[e.reason()]).inc();
            return Err(e.into());
        }
        let book = match self.market(&request.market) {
            Ok(book) => book,
            Err(e) => {
                METRICS
                    .rejections_total
                    .with_label_values(&["unknown_market"])
                    .inc();
                return Err(e);
            }
        };

        let order = Order::new(request.account, request.side, request.size);
        let order_id = order.id;

        match request.kind {
            OrderKind::Limit => {
                book.place_limit(order, request.price)?;
                info!(
                    market = %request.market,
                    order_id,
                    account = request.account,
                    side = %request.side,
                    price = request.price,
                    size = request.size,
                    "limit order placed"
                );

                Ok(PlaceOrderResponse {
                    order_id,
                    kind: OrderKind::Limit,
                    matches: Vec::new(),
                    remaining: request.size,
                    settlement_failures: 0,
                })
            }
            OrderKind::Market => {
                let execution = book.place_market(order)?;
                info!(
                    market = %request.market,
                    order_id,
                    account = request.account,
                    side = %request.side,
                    matches = execution.matches.len(),
                    filled = execution.filled(),
                    remaining = execution.remaining,
                    average_price = execution.average_price().unwrap_or(0),
                    "market order filled"
                );

                let settlement_failures = self.settle(&request.market, &execution.matches).await;

                Ok(PlaceOrderResponse {
                    order_id,
                    kind: OrderKind::Market,
                    matches: execution.matches.into_vec(),
                    remaining: execution.remaining,
                    settlement_failures,
                })
            }
        }
    }

    pub fn cancel_order(&self, market: &str, order_id: OrderId) -> Result<Order, ExchangeError> {
        let cancelled = self.market(market)?.cancel(order_id)?;
        info!(
            market,
            order_id,
            account = cancelled.account,
            remaining = cancelled.remaining,
            "order cancelled"
        );
        Ok(cancelled)
    }

    pub fn account_orders(
        &self,
        market: &str,
        account: AccountId,
    ) -> Result<AccountOrders, ExchangeError> {
        Ok(self.market(market)?.orders_for_account(account))
    }

    pub fn book(&self, market: &str) -> Result<BookSnapshot, ExchangeError> {
        Ok(self.market(market)?.snapshot())
    }

    pub fn trades(&self, market: &str) -> Result<Vec<Match>, ExchangeError> {
        Ok(self.market(market)?.trade_log())
    }

    pub fn best_bid(&self, market: &str) -> Result<PriceResponse, ExchangeError> {
        let price = self.market(market)?.best_bid()?;
        Ok(PriceResponse { price })
    }

    pub fn best_ask(&self, market: &str) -> Result<PriceResponse, ExchangeError> {
        let price = self.market(market)?.best_ask()?;
        Ok(PriceResponse { price })
    }

    /// Settles each match in order and returns how many failed
    async fn settle(&self, market: &str, matches: &[Match]) -> usize {
        let mut failures = 0;

        for m in matches {
            let result = match SettlementInstruction::for_match(market, m, self.directory.as_ref()) {
                Ok(instruction) => self.settlement.settle(&instruction).await,
                Err(e) => Err(e),
            };

            let status = match result {
                Ok(_) => "ok",
                Err(e) => {
                    failures += 1;
                    warn!(
                        market,
                        sequence = m.sequence,
                        seller = m.seller_account(),
                        buyer = m.buyer_account(),
                        size = m.size,
                        error = %e,
                        "settlement failed"
                    );
                    "failed"
                }
            };
            METRICS
                .settlements_total
                .with_label_values(&[market, status])
                .inc();
        }

        failures
    }
}
