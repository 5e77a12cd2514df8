/// Market Simulation Driver
///
/// Drives a single market in-process so the binary has something to match:
/// seeds two deep resting orders, then runs a market maker and a market
/// order taker side by side for a fixed number of ticks.
///
/// - The maker keeps up to `max_maker_orders` resting orders per side,
///   quoting one `price_step` inside the current best bid and best ask.
/// - The taker sends a market sell for every taker account, then a market
///   buy for every taker account, and logs the last trade price.
///
/// Every order goes through `Exchange::place_order`, so validation, locking
/// and settlement are exercised exactly as for any other caller.
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::application::services::{Exchange, ExchangeError};
use crate::domain::order::AccountId;
use crate::shared::protocol::{PlaceOrderRequest, Side};

#[derive(Debug, Clone)]
pub struct SimulationConfig {
    pub market: String,
    pub ticks: u64,
    pub tick: Duration,

    pub maker_account: AccountId,
    pub max_maker_orders: usize,
    pub price_step: u64,
    pub maker_size: u64,

    pub taker_accounts: Vec<AccountId>,
    pub taker_size: u64,

    pub seed_account: AccountId,
    /// (price, size)
    pub seed_ask: (u64, u64),
    /// (price, size)
    pub seed_bid: (u64, u64),
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            market: "ETH".to_string(),
            ticks: 30,
            tick: Duration::from_secs(1),
            maker_account: 7,
            max_maker_orders: 3,
            price_step: 100,
            maker_size: 1_000,
            taker_accounts: vec![8, 6],
            taker_size: 1_000,
            seed_account: 8,
            seed_ask: (10_000, 1_000_000),
            seed_bid: (9_000, 1_000_000),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimulationReport {
    pub ticks: u64,
    pub maker_orders: u64,
    pub maker_skips: u64,
    pub market_orders: u64,
    pub matches: u64,
    pub filled: u64,
    pub settlement_failures: u64,
    pub last_price: Option<u64>,
}

#[derive(Default)]
struct MakerStats {
    placed: u64,
    skipped: u64,
}

#[derive(Default)]
struct TakerStats {
    orders: u64,
    matches: u64,
    filled: u64,
    settlement_failures: u64,
}

/// Rests the seed ask and bid
pub async fn seed_market(exchange: &Exchange, config: &SimulationConfig) -> Result<(), ExchangeError> {
    let (ask_price, ask_size) = config.seed_ask;
    let (bid_price, bid_size) = config.seed_bid;

    exchange
        .place_order(PlaceOrderRequest::limit(
            &config.market,
            config.seed_account,
            Side::Sell,
            ask_price,
            ask_size,
        ))
        .await?;
    exchange
        .place_order(PlaceOrderRequest::limit(
            &config.market,
            config.seed_account,
            Side::Buy,
            bid_price,
            bid_size,
        ))
        .await?;

    info!(market = %config.market, ask_price, bid_price, "market seeded");
    Ok(())
}

/// Seeds the market, then runs maker and taker for `config.ticks` ticks
pub async fn run(exchange: Arc<Exchange>, config: SimulationConfig) -> Result<SimulationReport, ExchangeError> {
    // Fail fast on a misconfigured market before any task starts
    exchange.market(&config.market)?;
    seed_market(&exchange, &config).await?;

    let (maker, taker) = futures::join!(
        run_maker(&exchange, &config),
        run_taker(&exchange, &config)
    );

    let last_price = exchange.market(&config.market)?.last_trade().map(|m| m.price);

    Ok(SimulationReport {
        ticks: config.ticks,
        maker_orders: maker.placed,
        maker_skips: maker.skipped,
        market_orders: taker.orders,
        matches: taker.matches,
        filled: taker.filled,
        settlement_failures: taker.settlement_failures,
        last_price,
    })
}

async fn run_maker(exchange: &Exchange, config: &SimulationConfig) -> MakerStats {
    let mut stats = MakerStats::default();
    let mut interval = tokio::time::interval(config.tick);

    for _ in 0..config.ticks {
        interval.tick().await;
        maker_tick(exchange, config, &mut stats).await;
    }

    stats
}

async fn maker_tick(exchange: &Exchange, config: &SimulationConfig, stats: &mut MakerStats) {
    let market = config.market.as_str();
    let (book, resting) = match exchange
        .market(market)
        .and_then(|book| Ok((book, exchange.account_orders(market, config.maker_account)?)))
    {
        Ok(found) => found,
        Err(e) => {
            warn!(market, error = %e, "maker tick skipped");
            stats.skipped += 1;
            return;
        }
    };

    if let Some(spread) = book.spread() {
        debug!(market, spread, "exchange spread");
    }

    let quotes = [
        (Side::Buy, resting.bids.len(), book.best_bid().map(|p| p.checked_add(config.price_step))),
        (Side::Sell, resting.asks.len(), book.best_ask().map(|p| p.checked_sub(config.price_step))),
    ];

    for (side, count, quote) in quotes {
        if count >= config.max_maker_orders {
            continue;
        }

        let price = match quote {
            Ok(Some(price)) if price > 0 => price,
            Ok(_) => {
                warn!(market, %side, "maker quote out of range");
                stats.skipped += 1;
                continue;
            }
            Err(e) => {
                warn!(market, %side, error = %e, "no reference price for maker quote");
                stats.skipped += 1;
                continue;
            }
        };

        let request = PlaceOrderRequest::limit(market, config.maker_account, side, price, config.maker_size);
        match exchange.place_order(request).await {
            Ok(_) => stats.placed += 1,
            Err(e) => {
                warn!(market, %side, price, error = %e, "maker order rejected");
                stats.skipped += 1;
            }
        }
    }
}

async fn run_taker(exchange: &Exchange, config: &SimulationConfig) -> TakerStats {
    let mut stats = TakerStats::default();
    let mut interval = tokio::time::interval(config.tick);

    for _ in 0..config.ticks {
        interval.tick().await;

        if let Ok(Some(last)) = exchange.market(&config.market).map(|book| book.last_trade()) {
            info!(market = %config.market, price = last.price, "exchange price");
        }

        for side in [Side::Sell, Side::Buy] {
            for &account in &config.taker_accounts {
                let request = PlaceOrderRequest::market(&config.market, account, side, config.taker_size);
                match exchange.place_order(request).await {
                    Ok(response) => {
                        stats.orders += 1;
                        stats.matches += response.matches.len() as u64;
                        stats.filled += config.taker_size - response.remaining;
                        stats.settlement_failures += response.settlement_failures as u64;
                    }
                    Err(e) => warn!(market = %config.market, account, %side, error = %e, "market order rejected"),
                }
            }
        }
    }

    stats
}
