use tracing::{debug, error, info, warn};

use crate::models::{OrderResult, OrderSide, Signal};

/// Everything the bot reports while running.
#[derive(Debug, Clone, PartialEq)]
pub enum BotEvent {
    Started {
        symbol: String,
    },
    LeverageSet {
        symbol: String,
        leverage: u32,
    },
    LeverageFailed {
        symbol: String,
        error: String,
    },
    FetchFailed {
        symbol: String,
        error: String,
    },
    SignalComputed {
        symbol: String,
        signal: Signal,
        closes: usize,
    },
    OrderPlaced(OrderResult),
    OrderFailed {
        symbol: String,
        side: OrderSide,
        error: String,
    },
    Stopped {
        symbol: String,
    },
}

/// Observability sink handed to each component at construction.
pub trait EventSink: Send + Sync {
    fn record(&self, event: BotEvent);
}

/// Forwards events to the `tracing` subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn record(&self, event: BotEvent) {
        match event {
            BotEvent::Started { symbol } => info!("Starting bot for {}", symbol),
            BotEvent::LeverageSet { symbol, leverage } => {
                info!("Leverage for {} set to {}x", symbol, leverage)
            }
            BotEvent::LeverageFailed { symbol, error } => {
                warn!("Failed to set leverage for {}: {}", symbol, error)
            }
            BotEvent::FetchFailed { symbol, error } => {
                error!("Error fetching klines for {}: {}", symbol, error)
            }
            BotEvent::SignalComputed {
                symbol,
                signal,
                closes,
            } => debug!("{} signal: {} ({} closes)", symbol, signal, closes),
            BotEvent::OrderPlaced(order) => info!("Order placed: {}", order),
            BotEvent::OrderFailed {
                symbol,
                side,
                error,
            } => error!("Order failed: {} {}: {}", side, symbol, error),
            BotEvent::Stopped { symbol } => info!("Bot for {} stopped", symbol),
        }
    }
}
