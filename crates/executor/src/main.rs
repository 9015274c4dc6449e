use std::sync::Arc;

use anyhow::Context;
use dotenvy::dotenv;
use tokio::{signal, sync::broadcast};
use tracing::{error, info};

use common::config::BotConfig;
use common::events::{EventSink, TracingSink};
use common::logger;
use market_data::ExchangeGateway;
use market_data::remote::BinanceClient;

use crate::services::trading_loop::TradingLoop;

mod services;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    logger::setup_logger();

    let config = BotConfig::from_env()
        .context("Please set BINANCE_API_KEY and BINANCE_API_SECRET environment variables")?;
    info!(
        "Loaded config for {} (qty={}, leverage={}x) against {}",
        config.symbol, config.quantity, config.leverage, config.base_url
    );

    let gateway: Arc<dyn ExchangeGateway> = Arc::new(
        BinanceClient::new(&config.base_url, &config.credentials)
            .context("Failed to build Binance client")?,
    );
    let sink: Arc<dyn EventSink> = Arc::new(TracingSink);

    let trading_loop = TradingLoop::new(config, gateway, sink)?;

    let (shutdown_tx, shutdown_rx) = broadcast::channel::<()>(1);
    tokio::spawn(async move {
        match signal::ctrl_c().await {
            Ok(()) => {
                info!("Shutdown requested, finishing current cycle...");
                let _ = shutdown_tx.send(());
            }
            Err(e) => {
                // keep the sender alive so the loop is not stopped by a closed channel
                error!("Unable to listen for shutdown signal: {}", e);
                std::future::pending::<()>().await;
            }
        }
    });

    trading_loop.run(shutdown_rx).await;
    Ok(())
}
