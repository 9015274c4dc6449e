use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use common::models::PriceBar;

use crate::{error::GatewayError, traits::RemoteResponse};

/// One row of `GET /fapi/v1/klines`:
/// `[openTime, open, high, low, close, volume, closeTime, quoteVolume, trades, ...]`.
/// Prices arrive as strings, times as epoch millis.
#[derive(Deserialize, Debug)]
#[serde(transparent)]
pub struct KlineRow(pub Vec<Value>);

impl KlineRow {
    fn price(&self, idx: usize, field: &str) -> Result<f64, GatewayError> {
        let raw = self
            .0
            .get(idx)
            .ok_or_else(|| GatewayError::Decode(format!("kline row missing {}", field)))?;

        let parsed = match raw {
            Value::String(s) => s.parse::<f64>().ok(),
            Value::Number(n) => n.as_f64(),
            _ => None,
        };

        match parsed {
            Some(v) if v.is_finite() => Ok(v),
            _ => Err(GatewayError::Decode(format!(
                "kline {} is not a price: {}",
                field, raw
            ))),
        }
    }

    fn time(&self, idx: usize, field: &str) -> Result<DateTime<Utc>, GatewayError> {
        self.0
            .get(idx)
            .and_then(Value::as_i64)
            .and_then(DateTime::from_timestamp_millis)
            .ok_or_else(|| GatewayError::Decode(format!("kline {} is not a timestamp", field)))
    }
}

impl RemoteResponse<PriceBar> for KlineRow {
    fn to_model(&self) -> Result<PriceBar, GatewayError> {
        Ok(PriceBar {
            open_time: self.time(0, "open time")?,
            open: self.price(1, "open")?,
            high: self.price(2, "high")?,
            low: self.price(3, "low")?,
            close: self.price(4, "close")?,
            volume: self.price(5, "volume")?,
            close_time: self.time(6, "close time")?,
        })
    }
}
