use std::sync::Arc;

use common::events::{BotEvent, EventSink};
use common::models::{OrderRequest, OrderResult, OrderSide};
use market_data::ExchangeGateway;

/// Submits market orders; a rejected order is reported, never retried.
pub struct OrderDispatcher {
    gateway: Arc<dyn ExchangeGateway>,
    sink: Arc<dyn EventSink>,
}

impl OrderDispatcher {
    pub fn new(gateway: Arc<dyn ExchangeGateway>, sink: Arc<dyn EventSink>) -> Self {
        Self { gateway, sink }
    }

    pub async fn place_order(
        &self,
        symbol: &str,
        side: OrderSide,
        quantity: f64,
    ) -> Option<OrderResult> {
        let request = OrderRequest::market(symbol, side, quantity);

        match self.gateway.place_order(&request).await {
            Ok(order) => {
                self.sink.record(BotEvent::OrderPlaced(order.clone()));
                Some(order)
            }
            Err(e) => {
                self.sink.record(BotEvent::OrderFailed {
                    symbol: request.symbol,
                    side,
                    error: e.to_string(),
                });
                None
            }
        }
    }
}
