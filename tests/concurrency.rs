use std::collections::HashMap;
use std::sync::Arc;
use std::thread;

use exchange_engine::application::services::SharedOrderBook;
use exchange_engine::domain::order::Order;
use exchange_engine::shared::protocol::Side;

const MAKERS: u64 = 4;
const ORDERS_PER_MAKER: u64 = 250;
const ORDER_SIZE: u64 = 10;

#[test]
fn test_concurrent_makers_and_takers_conserve_size() {
    let book = Arc::new(SharedOrderBook::with_market("CONCURRENT"));

    let makers: Vec<_> = (0..MAKERS)
        .map(|account| {
            let book = Arc::clone(&book);
            thread::spawn(move || {
                for i in 0..ORDERS_PER_MAKER {
                    let order = Order::new(account, Side::Sell, ORDER_SIZE);
                    book.place_limit(order, 10_000 + i % 10).unwrap();
                }
            })
        })
        .collect();

    let takers: Vec<_> = (0..2u64)
        .map(|t| {
            let book = Arc::clone(&book);
            thread::spawn(move || {
                let mut filled = 0;
                for _ in 0..200 {
                    let execution = book.place_market(Order::new(100 + t, Side::Buy, 7)).unwrap();
                    filled += execution.filled();
                }
                filled
            })
        })
        .collect();

    for maker in makers {
        maker.join().unwrap();
    }
    let taken: u64 = takers.into_iter().map(|t| t.join().unwrap()).sum();

    let placed = MAKERS * ORDERS_PER_MAKER * ORDER_SIZE;
    assert_eq!(book.ask_volume() + taken, placed);

    let trades = book.trade_log();
    assert_eq!(trades.iter().map(|m| m.size).sum::<u64>(), taken);

    let snapshot = book.snapshot();
    let resting: u64 = snapshot
        .asks
        .iter()
        .flat_map(|level| level.orders.iter())
        .map(|order| order.remaining)
        .sum();
    assert_eq!(resting, snapshot.ask_volume);
}

#[test]
fn test_no_maker_overfilled_under_contention() {
    let book = Arc::new(SharedOrderBook::with_market("CONTENTION"));

    let mut sizes = HashMap::new();
    for i in 0..100u64 {
        let order = Order::new(1, Side::Buy, 5 + i % 7);
        sizes.insert(order.id, order.size);
        book.place_limit(order, 9_000 + i % 4).unwrap();
    }

    let handles: Vec<_> = (0..4u64)
        .map(|t| {
            let book = Arc::clone(&book);
            thread::spawn(move || {
                for _ in 0..50 {
                    book.place_market(Order::new(10 + t, Side::Sell, 3)).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let mut filled_per_maker: HashMap<u64, u64> = HashMap::new();
    for m in book.trade_log() {
        *filled_per_maker.entry(m.maker_order_id).or_default() += m.size;
    }
    for (id, filled) in filled_per_maker {
        assert!(filled <= sizes[&id], "order {} overfilled", id);
    }

    let sequences: Vec<u64> = book.trade_log().iter().map(|m| m.sequence).collect();
    let expected: Vec<u64> = (1..=sequences.len() as u64).collect();
    assert_eq!(sequences, expected);
}

#[test]
fn test_readers_run_alongside_writer() {
    let book = Arc::new(SharedOrderBook::with_market("READERS"));
    book.place_limit(Order::new(8, Side::Sell, 1_000_000), 10_000).unwrap();
    book.place_limit(Order::new(8, Side::Buy, 1_000_000), 9_000).unwrap();

    let writer = {
        let book = Arc::clone(&book);
        thread::spawn(move || {
            for _ in 0..500 {
                book.place_market(Order::new(6, Side::Buy, 10)).unwrap();
            }
        })
    };

    let readers: Vec<_> = (0..3)
        .map(|_| {
            let book = Arc::clone(&book);
            thread::spawn(move || {
                for _ in 0..500 {
                    let snapshot = book.snapshot();
                    let level_sum: u64 = snapshot.asks.iter().map(|l| l.volume).sum();
                    assert_eq!(level_sum, snapshot.ask_volume);
                    assert_eq!(book.best_bid(), Ok(9_000));
                }
            })
        })
        .collect();

    writer.join().unwrap();
    for reader in readers {
        reader.join().unwrap();
    }

    assert_eq!(book.ask_volume(), 1_000_000 - 500 * 10);
}
