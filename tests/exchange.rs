use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use exchange_engine::application::services::{
    Exchange, ExchangeError, InMemoryAccountDirectory, LedgerSettlement, SettlementCredentials,
    SettlementError, SettlementInstruction, SettlementReceipt, SettlementService,
};
use exchange_engine::domain::validation::{OrderValidator, ValidationConfig, ValidationError};
use exchange_engine::shared::protocol::{OrderKind, PlaceOrderRequest, Side};

const MARKET: &str = "ETH";

fn directory() -> Arc<InMemoryAccountDirectory> {
    let directory = InMemoryAccountDirectory::new();
    for account in [6, 7, 8] {
        directory.register(account, SettlementCredentials::new(format!("addr-{}", account)));
    }
    Arc::new(directory)
}

/// Records every instruction and fails the ones listed in `fail_sequences`
#[derive(Default)]
struct RecordingSettlement {
    seen: Mutex<Vec<SettlementInstruction>>,
    fail_sequences: Vec<u64>,
}

#[async_trait]
impl SettlementService for RecordingSettlement {
    async fn settle(
        &self,
        instruction: &SettlementInstruction,
    ) -> Result<SettlementReceipt, SettlementError> {
        self.seen.lock().push(instruction.clone());
        if self.fail_sequences.contains(&instruction.sequence) {
            return Err(SettlementError::Rejected("node unavailable".to_string()));
        }
        Ok(SettlementReceipt {
            sequence: instruction.sequence,
            payer: instruction.payer.address.clone(),
            payee: instruction.payee.address.clone(),
            amount: instruction.amount,
            settled_at: 0,
        })
    }
}

async fn seed(exchange: &Exchange) {
    exchange
        .place_order(PlaceOrderRequest::limit(MARKET, 8, Side::Sell, 10_000, 1_000_000))
        .await
        .unwrap();
    exchange
        .place_order(PlaceOrderRequest::limit(MARKET, 8, Side::Buy, 9_000, 1_000_000))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_market_buy_settles_seller_to_buyer() {
    let ledger = Arc::new(LedgerSettlement::new());
    ledger.fund("addr-8", 5_000);

    let exchange = Exchange::new([MARKET], directory(), ledger.clone(), OrderValidator::new());
    seed(&exchange).await;

    let response = exchange
        .place_order(PlaceOrderRequest::market(MARKET, 6, Side::Buy, 1_000))
        .await
        .unwrap();

    assert_eq!(response.kind, OrderKind::Market);
    assert_eq!(response.matches.len(), 1);
    assert_eq!(response.remaining, 0);
    assert_eq!(response.settlement_failures, 0);
    assert_eq!(ledger.balance("addr-8"), 4_000);
    assert_eq!(ledger.balance("addr-6"), 1_000);
}

#[tokio::test]
async fn test_settlement_runs_once_per_match_in_order() {
    let settlement = Arc::new(RecordingSettlement::default());
    let exchange = Exchange::new([MARKET], directory(), settlement.clone(), OrderValidator::new());

    for price in [9_100, 9_200] {
        exchange
            .place_order(PlaceOrderRequest::limit(MARKET, 7, Side::Buy, price, 100))
            .await
            .unwrap();
    }

    let response = exchange
        .place_order(PlaceOrderRequest::market(MARKET, 6, Side::Sell, 150))
        .await
        .unwrap();
    assert_eq!(response.matches.len(), 2);

    let seen = settlement.seen.lock();
    let prices: Vec<u64> = seen.iter().map(|i| i.price).collect();
    assert_eq!(prices, vec![9_200, 9_100]);
    assert!(seen.iter().all(|i| i.payer.address == "addr-6"));
    assert!(seen.iter().all(|i| i.payee.address == "addr-7"));
}

#[tokio::test]
async fn test_settlement_failure_keeps_match() {
    let settlement = Arc::new(RecordingSettlement {
        fail_sequences: vec![1],
        ..Default::default()
    });
    let exchange = Exchange::new([MARKET], directory(), settlement, OrderValidator::new());
    seed(&exchange).await;

    let response = exchange
        .place_order(PlaceOrderRequest::market(MARKET, 6, Side::Buy, 1_000))
        .await
        .unwrap();

    assert_eq!(response.settlement_failures, 1);
    assert_eq!(exchange.trades(MARKET).unwrap().len(), 1);
    assert_eq!(exchange.book(MARKET).unwrap().ask_volume, 999_000);
}

#[tokio::test]
async fn test_unregistered_account_is_settlement_failure() {
    let exchange = Exchange::new(
        [MARKET],
        directory(),
        Arc::new(RecordingSettlement::default()),
        OrderValidator::new(),
    );
    seed(&exchange).await;

    let response = exchange
        .place_order(PlaceOrderRequest::market(MARKET, 42, Side::Sell, 10))
        .await
        .unwrap();

    assert_eq!(response.matches.len(), 1);
    assert_eq!(response.settlement_failures, 1);
}

#[tokio::test]
async fn test_account_orders_and_cancel() {
    let exchange = Exchange::new(
        [MARKET],
        directory(),
        Arc::new(RecordingSettlement::default()),
        OrderValidator::new(),
    );
    seed(&exchange).await;

    let bid = exchange
        .place_order(PlaceOrderRequest::limit(MARKET, 7, Side::Buy, 9_100, 1_000))
        .await
        .unwrap();
    exchange
        .place_order(PlaceOrderRequest::limit(MARKET, 7, Side::Sell, 9_900, 1_000))
        .await
        .unwrap();

    let orders = exchange.account_orders(MARKET, 7).unwrap();
    assert_eq!(orders.bids.len(), 1);
    assert_eq!(orders.asks.len(), 1);
    assert_eq!(orders.bids[0].price, 9_100);

    let cancelled = exchange.cancel_order(MARKET, bid.order_id).unwrap();
    assert_eq!(cancelled.remaining, 1_000);
    assert_eq!(exchange.account_orders(MARKET, 7).unwrap().bids.len(), 0);
    assert!(matches!(
        exchange.cancel_order(MARKET, bid.order_id),
        Err(ExchangeError::Book(_))
    ));

    assert_eq!(exchange.best_bid(MARKET).unwrap().price, 9_000);
    assert_eq!(exchange.best_ask(MARKET).unwrap().price, 9_900);
}

#[tokio::test]
async fn test_validation_limits() {
    let validator = OrderValidator::with_config(ValidationConfig {
        max_size: 1_000,
        allowed_markets: vec![MARKET.to_string()],
        ..Default::default()
    });
    let exchange = Exchange::new(
        [MARKET, "BTC"],
        directory(),
        Arc::new(RecordingSettlement::default()),
        validator,
    );

    let too_big = exchange
        .place_order(PlaceOrderRequest::market(MARKET, 6, Side::Buy, 1_001))
        .await;
    assert!(matches!(
        too_big,
        Err(ExchangeError::Rejected(ValidationError::SizeOutOfRange(_)))
    ));

    let not_allowed = exchange
        .place_order(PlaceOrderRequest::limit("BTC", 6, Side::Buy, 100, 10))
        .await;
    assert!(matches!(
        not_allowed,
        Err(ExchangeError::Rejected(ValidationError::InvalidMarket(_)))
    ));
}
