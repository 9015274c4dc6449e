use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderSide::Buy => "BUY",
            OrderSide::Sell => "SELL",
        }
    }
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderType {
    Market,
}

impl OrderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderType::Market => "MARKET",
        }
    }
}

/// A single order built for one cycle and dropped once submitted.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRequest {
    pub symbol: String,
    pub side: OrderSide,
    pub order_type: OrderType,
    pub quantity: f64,
    pub client_order_id: String,
}

impl OrderRequest {
    pub fn market(symbol: &str, side: OrderSide, quantity: f64) -> Self {
        Self {
            symbol: symbol.to_uppercase(),
            side,
            order_type: OrderType::Market,
            quantity,
            client_order_id: format!("ma-{}", Uuid::new_v4().simple()),
        }
    }
}

/// Exchange acknowledgement of a submitted order.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderResult {
    pub order_id: u64,
    pub client_order_id: String,
    pub symbol: String,
    pub side: OrderSide,
    pub status: String,
    pub orig_qty: f64,
    pub executed_qty: f64,
    pub avg_price: f64,
}

impl fmt::Display for OrderResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "id={} client_id={} {} {} qty={} executed={} avg_price={} status={}",
            self.order_id,
            self.client_order_id,
            self.side,
            self.symbol,
            self.orig_qty,
            self.executed_qty,
            self.avg_price,
            self.status
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LeverageAck {
    pub symbol: String,
    pub leverage: u32,
    pub max_notional_value: String,
}
