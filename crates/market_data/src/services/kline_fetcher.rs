use std::sync::Arc;

use common::events::{BotEvent, EventSink};
use common::models::kline::closes;

use crate::traits::ExchangeGateway;

/// Pulls recent candles and hands back their closes.
///
/// Gateway failures are reported to the sink and degrade to an empty
/// result; the next scheduled cycle acts as the retry.
pub struct KlineFetcher {
    gateway: Arc<dyn ExchangeGateway>,
    sink: Arc<dyn EventSink>,
}

impl KlineFetcher {
    pub fn new(gateway: Arc<dyn ExchangeGateway>, sink: Arc<dyn EventSink>) -> Self {
        Self { gateway, sink }
    }

    /// Closing prices, oldest first. Empty on any gateway error.
    pub async fn fetch_recent_closes(&self, symbol: &str, interval: &str, limit: u16) -> Vec<f64> {
        match self.gateway.fetch_klines(symbol, interval, limit).await {
            Ok(bars) => closes(&bars),
            Err(e) => {
                self.sink.record(BotEvent::FetchFailed {
                    symbol: symbol.to_string(),
                    error: e.to_string(),
                });
                Vec::new()
            }
        }
    }
}
