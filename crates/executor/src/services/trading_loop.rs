use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast::{self, error::TryRecvError};
use tokio::time;
use tracing::{debug, info};

use common::config::BotConfig;
use common::events::{BotEvent, EventSink};
use common::models::{OrderResult, OrderSide};
use market_data::ExchangeGateway;
use market_data::services::KlineFetcher;
use strategy::{SignalEngine, SignalError};

use crate::services::execution_service::OrderDispatcher;

/// What a single fetch → decide → dispatch pass ended with.
#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    Hold,
    Dispatched {
        side: OrderSide,
        order: Option<OrderResult>,
    },
}

/// Runs one strictly sequential cycle per poll interval until told to stop.
pub struct TradingLoop {
    symbol: String,
    quantity: f64,
    leverage: u32,
    kline_interval: String,
    kline_limit: u16,
    poll_interval: Duration,
    gateway: Arc<dyn ExchangeGateway>,
    fetcher: KlineFetcher,
    engine: SignalEngine,
    dispatcher: OrderDispatcher,
    sink: Arc<dyn EventSink>,
}

impl TradingLoop {
    pub fn new(
        config: BotConfig,
        gateway: Arc<dyn ExchangeGateway>,
        sink: Arc<dyn EventSink>,
    ) -> Result<Self, SignalError> {
        let engine = SignalEngine::new(config.short_window, config.long_window)?;

        Ok(Self {
            symbol: config.symbol,
            quantity: config.quantity,
            leverage: config.leverage,
            kline_interval: config.kline_interval,
            kline_limit: config.kline_limit,
            poll_interval: config.poll_interval,
            fetcher: KlineFetcher::new(gateway.clone(), sink.clone()),
            dispatcher: OrderDispatcher::new(gateway.clone(), sink.clone()),
            gateway,
            engine,
            sink,
        })
    }

    /// Sets leverage once, then cycles until `shutdown` fires or closes.
    /// A cycle in flight always finishes; the stop request is honoured
    /// before the next fetch or while sleeping.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        self.apply_leverage().await;
        self.sink.record(BotEvent::Started {
            symbol: self.symbol.clone(),
        });
        info!(
            "SMA({}) / SMA({}) on {} {} candles, polling every {:?}",
            self.engine.short_window(),
            self.engine.long_window(),
            self.symbol,
            self.kline_interval,
            self.poll_interval
        );

        loop {
            if stop_requested(&mut shutdown) {
                break;
            }

            if let CycleOutcome::Dispatched { side, order: None } = self.run_cycle().await {
                debug!("{} {} skipped this cycle", side, self.symbol);
            }

            tokio::select! {
                _ = time::sleep(self.poll_interval) => {}
                _ = shutdown.recv() => break,
            }
        }

        self.sink.record(BotEvent::Stopped {
            symbol: self.symbol.clone(),
        });
    }

    pub async fn run_cycle(&self) -> CycleOutcome {
        let closes = self
            .fetcher
            .fetch_recent_closes(&self.symbol, &self.kline_interval, self.kline_limit)
            .await;

        let signal = self.engine.compute(&closes);
        self.sink.record(BotEvent::SignalComputed {
            symbol: self.symbol.clone(),
            signal,
            closes: closes.len(),
        });

        match signal.side() {
            Some(side) => {
                let order = self
                    .dispatcher
                    .place_order(&self.symbol, side, self.quantity)
                    .await;
                CycleOutcome::Dispatched { side, order }
            }
            None => CycleOutcome::Hold,
        }
    }

    async fn apply_leverage(&self) {
        match self
            .gateway
            .change_leverage(&self.symbol, self.leverage)
            .await
        {
            Ok(ack) => self.sink.record(BotEvent::LeverageSet {
                symbol: ack.symbol,
                leverage: ack.leverage,
            }),
            Err(e) => self.sink.record(BotEvent::LeverageFailed {
                symbol: self.symbol.clone(),
                error: e.to_string(),
            }),
        }
    }
}

fn stop_requested(shutdown: &mut broadcast::Receiver<()>) -> bool {
    !matches!(shutdown.try_recv(), Err(TryRecvError::Empty))
}

impl std::fmt::Debug for TradingLoop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TradingLoop")
            .field("symbol", &self.symbol)
            .field("engine", &self.engine)
            .field("poll_interval", &self.poll_interval)
            .finish()
    }
}
