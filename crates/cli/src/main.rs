use anyhow::Context;
use clap::{Parser, Subcommand};
use futures_bot_core::{Credentials, ExchangeClient, Side};
use futures_bot_exchange::PaperExchange;
use rust_decimal::Decimal;
use std::sync::Arc;

mod commands;

#[derive(Parser)]
#[command(name = "futures-bot")]
#[command(about = "Order placement and supervision strategies for a USD-M futures exchange", long_about = None)]
struct Cli {
    /// Starting mark price for the paper venue (the only shipped connector;
    /// a live connector plugs in behind the same client interface).
    #[arg(long, global = true, default_value = "100")]
    paper_price: Decimal,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Place a one-shot market order
    Market {
        symbol: String,
        side: Side,
        quantity: Decimal,
    },
    /// Place a one-shot good-till-cancel limit order
    Limit {
        symbol: String,
        side: Side,
        quantity: Decimal,
        price: Decimal,
    },
    /// Place a one-shot stop-limit order
    StopLimit {
        symbol: String,
        side: Side,
        quantity: Decimal,
        stop_price: Decimal,
        limit_price: Decimal,
    },
    /// Slice a quantity into timed market orders (TWAP)
    Twap {
        symbol: String,
        side: Side,
        total_quantity: Decimal,
        duration_minutes: f64,
    },
    /// Run the grid strategy: a replenishing ladder of limit orders
    Grid {
        symbol: String,
        lower_price: Decimal,
        upper_price: Decimal,
        num_grids: u32,
        quantity_per_grid: Decimal,
    },
    /// Run a synthetic OCO pair: take-profit limit plus stop-loss trigger
    Oco {
        symbol: String,
        side: Side,
        quantity: Decimal,
        take_profit_price: Decimal,
        stop_loss_price: Decimal,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // Credentials are required before any exchange interaction; a missing
    // variable is a fatal startup error.
    let _credentials = Credentials::from_env().context("loading exchange credentials")?;

    let client: Arc<dyn ExchangeClient> = Arc::new(PaperExchange::new(cli.paper_price));

    match cli.command {
        Commands::Market {
            symbol,
            side,
            quantity,
        } => commands::market::run(client, &symbol, side, quantity).await,
        Commands::Limit {
            symbol,
            side,
            quantity,
            price,
        } => commands::limit::run(client, &symbol, side, quantity, price).await,
        Commands::StopLimit {
            symbol,
            side,
            quantity,
            stop_price,
            limit_price,
        } => {
            commands::stop_limit::run(client, &symbol, side, quantity, stop_price, limit_price)
                .await
        }
        Commands::Twap {
            symbol,
            side,
            total_quantity,
            duration_minutes,
        } => commands::twap::run(client, &symbol, side, total_quantity, duration_minutes).await,
        Commands::Grid {
            symbol,
            lower_price,
            upper_price,
            num_grids,
            quantity_per_grid,
        } => {
            commands::grid::run(
                client,
                &symbol,
                lower_price,
                upper_price,
                num_grids,
                quantity_per_grid,
            )
            .await
        }
        Commands::Oco {
            symbol,
            side,
            quantity,
            take_profit_price,
            stop_loss_price,
        } => {
            commands::oco::run(
                client,
                &symbol,
                side,
                quantity,
                take_profit_price,
                stop_loss_price,
            )
            .await
        }
    }
}
