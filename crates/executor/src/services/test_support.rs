use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::broadcast;

use common::events::{BotEvent, EventSink};
use common::models::{LeverageAck, OrderRequest, OrderResult, PriceBar};
use market_data::{ExchangeGateway, GatewayError};

#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<BotEvent>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<BotEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl EventSink for RecordingSink {
    fn record(&self, event: BotEvent) {
        self.events.lock().unwrap().push(event);
    }
}

pub type FetchScript = Result<Vec<f64>, GatewayError>;

/// Scripted exchange. Each fetch pops the next scripted response; once the
/// script runs dry it fires `shutdown` (if set) and returns no candles.
pub struct FakeGateway {
    script: Mutex<VecDeque<FetchScript>>,
    fetch_calls: AtomicUsize,
    leverage_calls: AtomicUsize,
    orders: Mutex<Vec<OrderRequest>>,
    reject_orders: bool,
    reject_leverage: bool,
    shutdown: Option<broadcast::Sender<()>>,
}

impl FakeGateway {
    pub fn new(script: Vec<FetchScript>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            fetch_calls: AtomicUsize::new(0),
            leverage_calls: AtomicUsize::new(0),
            orders: Mutex::new(Vec::new()),
            reject_orders: false,
            reject_leverage: false,
            shutdown: None,
        }
    }

    pub fn rejecting_orders(mut self) -> Self {
        self.reject_orders = true;
        self
    }

    pub fn rejecting_leverage(mut self) -> Self {
        self.reject_leverage = true;
        self
    }

    pub fn stopping_with(mut self, shutdown: broadcast::Sender<()>) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    pub fn leverage_calls(&self) -> usize {
        self.leverage_calls.load(Ordering::SeqCst)
    }

    pub fn orders(&self) -> Vec<OrderRequest> {
        self.orders.lock().unwrap().clone()
    }
}

fn bars(closes: &[f64]) -> Vec<PriceBar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open_time = DateTime::<Utc>::from_timestamp(i as i64 * 60, 0).unwrap();
            PriceBar {
                open_time,
                open: close,
                high: close,
                low: close,
                close,
                volume: 1.0,
                close_time: open_time,
            }
        })
        .collect()
}

#[async_trait]
impl ExchangeGateway for FakeGateway {
    async fn change_leverage(
        &self,
        symbol: &str,
        leverage: u32,
    ) -> Result<LeverageAck, GatewayError> {
        self.leverage_calls.fetch_add(1, Ordering::SeqCst);
        if self.reject_leverage {
            return Err(GatewayError::Api {
                status: 400,
                code: -4028,
                msg: "Leverage is not valid".to_string(),
            });
        }
        Ok(LeverageAck {
            symbol: symbol.to_string(),
            leverage,
            max_notional_value: "1000000".to_string(),
        })
    }

    async fn fetch_klines(
        &self,
        _symbol: &str,
        _interval: &str,
        _limit: u16,
    ) -> Result<Vec<PriceBar>, GatewayError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(result) => result.map(|closes| bars(&closes)),
            None => {
                if let Some(tx) = &self.shutdown {
                    let _ = tx.send(());
                }
                Ok(Vec::new())
            }
        }
    }

    async fn place_order(&self, order: &OrderRequest) -> Result<OrderResult, GatewayError> {
        let mut orders = self.orders.lock().unwrap();
        orders.push(order.clone());

        if self.reject_orders {
            return Err(GatewayError::Api {
                status: 400,
                code: -2019,
                msg: "Margin is insufficient.".to_string(),
            });
        }

        Ok(OrderResult {
            order_id: orders.len() as u64,
            client_order_id: order.client_order_id.clone(),
            symbol: order.symbol.clone(),
            side: order.side,
            status: "FILLED".to_string(),
            orig_qty: order.quantity,
            executed_qty: order.quantity,
            avg_price: 100.0,
        })
    }
}
