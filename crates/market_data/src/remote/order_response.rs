use serde::Deserialize;

use common::models::{LeverageAck, OrderResult, OrderSide};

use crate::{error::GatewayError, traits::RemoteResponse};

#[derive(Debug, Deserialize)]
pub struct OrderResponse {
    #[serde(rename = "orderId")]
    pub order_id: u64,
    #[serde(rename = "clientOrderId")]
    pub client_order_id: String,
    pub symbol: String,
    pub side: OrderSide,
    pub status: String,
    #[serde(rename = "origQty")]
    pub orig_qty: String,
    #[serde(rename = "executedQty")]
    pub executed_qty: String,
    #[serde(rename = "avgPrice", default)]
    pub avg_price: Option<String>,
}

impl RemoteResponse<OrderResult> for OrderResponse {
    fn to_model(&self) -> Result<OrderResult, GatewayError> {
        Ok(OrderResult {
            order_id: self.order_id,
            client_order_id: self.client_order_id.clone(),
            symbol: self.symbol.clone(),
            side: self.side,
            status: self.status.clone(),
            orig_qty: parse_decimal("origQty", &self.orig_qty)?,
            executed_qty: parse_decimal("executedQty", &self.executed_qty)?,
            avg_price: match self.avg_price.as_deref() {
                Some(raw) => parse_decimal("avgPrice", raw)?,
                None => 0.0,
            },
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct LeverageResponse {
    pub leverage: u32,
    #[serde(rename = "maxNotionalValue")]
    pub max_notional_value: String,
    pub symbol: String,
}

impl RemoteResponse<LeverageAck> for LeverageResponse {
    fn to_model(&self) -> Result<LeverageAck, GatewayError> {
        Ok(LeverageAck {
            symbol: self.symbol.clone(),
            leverage: self.leverage,
            max_notional_value: self.max_notional_value.clone(),
        })
    }
}

/// Error body returned by Binance on rejected requests.
#[derive(Debug, Deserialize)]
pub struct BinanceErrorResponse {
    pub code: i64,
    pub msg: String,
}

fn parse_decimal(field: &str, raw: &str) -> Result<f64, GatewayError> {
    raw.parse::<f64>()
        .map_err(|_| GatewayError::Decode(format!("{} is not a decimal: {:?}", field, raw)))
}
