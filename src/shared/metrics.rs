//! Prometheus metrics for the exchange core
//!
//! ## Metric families
//! - **Counter**: orders received, matches, matched size, cancellations,
//!   settlements, rejections
//! - **Histogram**: time spent inside the book lock per mutation
//! - **Gauge**: resting volume per market and side
//!
//! ## Usage
//! ```rust,ignore
//! use exchange_engine::shared::metrics::METRICS;
//!
//! METRICS.orders_total.with_label_values(&["ETH", "limit", "buy"]).inc();
//!
//! let timer = METRICS.matching_duration.with_label_values(&["ETH"]).start_timer();
//! // ... match ...
//! timer.observe_duration();
//! ```

use lazy_static::lazy_static;
use prometheus::{
    register_counter_vec, register_gauge_vec, register_histogram_vec, CounterVec, Encoder,
    GaugeVec, HistogramVec, TextEncoder,
};

lazy_static! {
    /// Process-wide metrics instance
    pub static ref METRICS: Metrics = Metrics::new();
}

pub struct Metrics {
    /// Orders accepted by a book (market, kind, side)
    pub orders_total: CounterVec,

    /// Match records emitted (market)
    pub matches_total: CounterVec,

    /// Sum of matched size (market)
    pub matched_size_total: CounterVec,

    /// Cancellation attempts (market, status)
    pub cancellations_total: CounterVec,

    /// Duration of a book mutation in microseconds (market)
    pub matching_duration: HistogramVec,

    /// Resting volume (market, side)
    pub book_volume: GaugeVec,

    /// Settlement outcomes (market, status)
    pub settlements_total: CounterVec,

    /// Requests rejected before reaching a book (reason)
    pub rejections_total: CounterVec,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            orders_total: register_counter_vec!(
                "exchange_orders_total",
                "Total number of orders accepted by a book",
                &["market", "kind", "side"]
            )
            .expect("register exchange_orders_total"),

            matches_total: register_counter_vec!(
                "exchange_matches_total",
                "Total number of matches executed",
                &["market"]
            )
            .expect("register exchange_matches_total"),

            matched_size_total: register_counter_vec!(
                "exchange_matched_size_total",
                "Total size filled across all matches",
                &["market"]
            )
            .expect("register exchange_matched_size_total"),

            cancellations_total: register_counter_vec!(
                "exchange_cancellations_total",
                "Total number of cancellation attempts",
                &["market", "status"]
            )
            .expect("register exchange_cancellations_total"),

            matching_duration: register_histogram_vec!(
                "exchange_matching_duration_microseconds",
                "Time spent holding the book lock per mutation, in microseconds",
                &["market"],
                vec![1.0, 5.0, 10.0, 50.0, 100.0, 500.0, 1000.0, 5000.0]
            )
            .expect("register exchange_matching_duration_microseconds"),

            book_volume: register_gauge_vec!(
                "exchange_book_volume",
                "Resting volume per side",
                &["market", "side"]
            )
            .expect("register exchange_book_volume"),

            settlements_total: register_counter_vec!(
                "exchange_settlements_total",
                "Settlement attempts by outcome",
                &["market", "status"]
            )
            .expect("register exchange_settlements_total"),

            rejections_total: register_counter_vec!(
                "exchange_rejections_total",
                "Requests rejected before reaching a book",
                &["reason"]
            )
            .expect("register exchange_rejections_total"),
        }
    }

    /// Renders every registered family in the Prometheus text format
    pub fn export(&self) -> String {
        let encoder = TextEncoder::new();
        let families = prometheus::gather();
        let mut buffer = Vec::new();
        if let Err(e) = encoder.encode(&families, &mut buffer) {
            tracing::error!(error = %e, "failed to encode metrics");
            return String::new();
        }
        String::from_utf8(buffer).unwrap_or_default()
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
