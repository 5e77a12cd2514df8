/// CLI Interface Module
///
/// Process bootstrap for the exchange binary.
///
/// ## Responsibilities
/// - Parse command-line arguments
/// - Initialise logging
/// - Build the exchange context (market, accounts, ledger, validator)
/// - Start the observability server and the market simulation
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::{error, info};

use crate::application::services::{
    Exchange, InMemoryAccountDirectory, LedgerSettlement, SettlementCredentials,
};
use crate::domain::order::AccountId;
use crate::domain::validation::{OrderValidator, ValidationConfig};
use crate::infrastructure::observability::ObservabilityServer;
use crate::interfaces::simulation::{self, SimulationConfig};

/// Balance credited to every simulated account at startup
const INITIAL_BALANCE: u64 = 1_000_000_000_000;

#[derive(Parser, Debug, Clone)]
#[command(name = "exchange-engine")]
#[command(version)]
#[command(about = "Limit order book exchange with price-time priority matching", long_about = None)]
pub struct CliConfig {
    /// Observability server address
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    pub host: IpAddr,

    /// Observability server port
    #[arg(short, long, default_value_t = 9090)]
    pub port: u16,

    /// Market to open
    #[arg(short, long, default_value = "ETH")]
    pub market: String,

    #[arg(short = 'l', long, default_value = "info", value_parser = ["trace", "debug", "info", "warn", "error"])]
    pub log_level: String,

    /// Simulation ticks to run
    #[arg(short, long, default_value_t = 30)]
    pub ticks: u64,

    /// Simulation tick length in milliseconds
    #[arg(long, default_value_t = 1000)]
    pub tick_ms: u64,

    /// Resting orders the market maker keeps per side
    #[arg(long, default_value_t = 3)]
    pub max_maker_orders: usize,

    /// Largest accepted order size
    #[arg(long, default_value_t = 10_000_000)]
    pub max_order_size: u64,

    /// Largest accepted limit price
    #[arg(long, default_value_t = 1_000_000)]
    pub max_price: u64,

    /// Skip the observability server
    #[arg(long, default_value_t = false)]
    pub no_server: bool,

    /// Print the configuration and exit
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,
}

impl CliConfig {
    pub fn validation_config(&self) -> ValidationConfig {
        ValidationConfig {
            max_price: self.max_price,
            max_size: self.max_order_size,
            allowed_markets: vec![self.market.clone()],
            ..Default::default()
        }
    }

    pub fn simulation_config(&self) -> SimulationConfig {
        SimulationConfig {
            market: self.market.clone(),
            ticks: self.ticks,
            tick: Duration::from_millis(self.tick_ms.max(1)),
            max_maker_orders: self.max_maker_orders,
            ..Default::default()
        }
    }

    pub fn server_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

/// Runs the CLI application
pub async fn run() {
    let config = CliConfig::parse();
    init_logging(&config.log_level);

    info!(?config, "exchange starting");

    if config.dry_run {
        info!("dry run, exiting");
        return;
    }

    let simulation_config = config.simulation_config();
    let exchange = Arc::new(build_exchange(&config, &simulation_config));

    if !config.no_server {
        let server = ObservabilityServer::new(config.server_addr(), Arc::clone(&exchange));
        tokio::spawn(async move {
            if let Err(e) = server.run().await {
                error!(error = %e, "observability server failed");
            }
        });
    }

    match simulation::run(exchange, simulation_config).await {
        Ok(report) => info!(?report, "simulation finished"),
        Err(e) => error!(error = %e, "simulation aborted"),
    }
}

/// Builds the exchange with every simulated account registered and funded
pub fn build_exchange(config: &CliConfig, simulation: &SimulationConfig) -> Exchange {
    let directory = InMemoryAccountDirectory::new();
    let ledger = LedgerSettlement::new();

    let mut accounts: Vec<AccountId> = simulation.taker_accounts.clone();
    accounts.push(simulation.maker_account);
    accounts.push(simulation.seed_account);
    accounts.sort_unstable();
    accounts.dedup();

    for account in accounts {
        let address = account_address(account);
        ledger.fund(&address, INITIAL_BALANCE);
        directory.register(account, SettlementCredentials::new(address));
    }

    Exchange::new(
        [config.market.clone()],
        Arc::new(directory),
        Arc::new(ledger),
        OrderValidator::with_config(config.validation_config()),
    )
}

fn account_address(account: AccountId) -> String {
    format!("0x{:040x}", account)
}

fn init_logging(level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_config_default() {
        let config = CliConfig::parse_from(["exchange-engine"]);
        assert_eq!(config.port, 9090);
        assert_eq!(config.market, "ETH");
        assert_eq!(config.ticks, 30);
        assert_eq!(config.tick_ms, 1000);
        assert_eq!(config.max_maker_orders, 3);
        assert_eq!(config.log_level, "info");
        assert!(!config.no_server);
        assert!(!config.dry_run);
    }

    #[test]
    fn test_cli_config_custom() {
        let config = CliConfig::parse_from([
            "exchange-engine",
            "--host", "0.0.0.0",
            "--port", "9100",
            "--market", "BTC",
            "--ticks", "5",
            "--tick-ms", "10",
            "--max-maker-orders", "5",
            "--max-order-size", "500",
            "--max-price", "20000",
            "--log-level", "debug",
            "--no-server",
            "--dry-run",
        ]);

        assert_eq!(config.server_addr().to_string(), "0.0.0.0:9100");
        assert_eq!(config.market, "BTC");
        assert_eq!(config.max_maker_orders, 5);
        assert!(config.no_server);
        assert!(config.dry_run);

        let validation = config.validation_config();
        assert_eq!(validation.max_size, 500);
        assert_eq!(validation.max_price, 20_000);
        assert_eq!(validation.allowed_markets, vec!["BTC".to_string()]);

        let simulation = config.simulation_config();
        assert_eq!(simulation.market, "BTC");
        assert_eq!(simulation.ticks, 5);
        assert_eq!(simulation.tick, Duration::from_millis(10));
        assert_eq!(simulation.max_maker_orders, 5);
    }

    #[test]
    fn test_cli_config_short_flags() {
        let config = CliConfig::parse_from([
            "exchange-engine",
            "-H", "192.168.1.1",
            "-p", "7000",
            "-m", "SOL",
            "-t", "2",
            "-l", "warn",
        ]);

        assert_eq!(config.host.to_string(), "192.168.1.1");
        assert_eq!(config.port, 7000);
        assert_eq!(config.market, "SOL");
        assert_eq!(config.ticks, 2);
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn test_build_exchange_registers_accounts() {
        let config = CliConfig::parse_from(["exchange-engine", "--market", "CLI_TEST"]);
        let exchange = build_exchange(&config, &config.simulation_config());

        assert!(exchange.market("CLI_TEST").is_ok());
        assert!(exchange.market("ETH").is_err());
        assert_eq!(account_address(7), format!("0x{}7", "0".repeat(39)));
    }
}
