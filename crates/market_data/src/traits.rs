use async_trait::async_trait;

use common::models::{LeverageAck, OrderRequest, OrderResult, PriceBar};

use crate::error::GatewayError;

/// Exchange capabilities the bot depends on.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ExchangeGateway: Send + Sync {
    async fn change_leverage(&self, symbol: &str, leverage: u32)
    -> Result<LeverageAck, GatewayError>;

    /// Most recent `limit` candles, oldest first.
    async fn fetch_klines(
        &self,
        symbol: &str,
        interval: &str,
        limit: u16,
    ) -> Result<Vec<PriceBar>, GatewayError>;

    async fn place_order(&self, order: &OrderRequest) -> Result<OrderResult, GatewayError>;
}

/// Conversion from a raw REST payload into a domain model.
pub trait RemoteResponse<T> {
    fn to_model(&self) -> Result<T, GatewayError>;
}
