use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use hmac::{Hmac, Mac};
use reqwest::{Client, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use sha2::Sha256;
use tracing::{debug, info, warn};

use common::config::Credentials;
use common::models::{LeverageAck, OrderRequest, OrderResult, PriceBar};

use crate::error::GatewayError;
use crate::remote::{BinanceErrorResponse, KlineRow, LeverageResponse, OrderResponse};
use crate::traits::{ExchangeGateway, RemoteResponse};

type HmacSha256 = Hmac<Sha256>;

const RECV_WINDOW_MS: u64 = 5_000;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const WEIGHT_WARN_THRESHOLD: u32 = 1_000;

/// REST adapter for Binance USDⓈ-M Futures.
#[derive(Clone)]
pub struct BinanceClient {
    client: Client,
    base_url: String,
    api_key: String,
    secret_key: String,
}

impl BinanceClient {
    pub fn new(base_url: &str, credentials: &Credentials) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .user_agent("ma_crossover_bot/0.1.0")
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: credentials.api_key.clone(),
            secret_key: credentials.api_secret.clone(),
        })
    }

    fn sign(&self, query: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(self.secret_key.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(query.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    fn signed_query(&self, params: &str) -> String {
        let params = format!(
            "{}&recvWindow={}&timestamp={}",
            params,
            RECV_WINDOW_MS,
            Utc::now().timestamp_millis()
        );
        let signature = self.sign(&params);
        format!("{}&signature={}", params, signature)
    }

    async fn send_signed(
        &self,
        method: Method,
        path: &str,
        params: &str,
    ) -> Result<Response, GatewayError> {
        let url = format!("{}{}?{}", self.base_url, path, self.signed_query(params));

        let resp = self
            .client
            .request(method, &url)
            .header("X-MBX-APIKEY", &self.api_key)
            .send()
            .await?;

        Ok(resp)
    }

    async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, GatewayError> {
        Self::log_used_weight(&resp);

        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            return Err(error_from_body(status, body));
        }

        Ok(serde_json::from_str::<T>(&body)?)
    }

    fn log_used_weight(resp: &Response) {
        let Some(header) = resp.headers().get("x-mbx-used-weight-1m") else {
            return;
        };

        match header.to_str().ok().and_then(|v| v.parse::<u32>().ok()) {
            Some(used) if used > WEIGHT_WARN_THRESHOLD => warn!("High API weight usage: {}", used),
            Some(used) => debug!("Used weights: {}/2400", used),
            None => debug!("Unreadable weight header: {:?}", header),
        }
    }
}

fn error_from_body(status: StatusCode, body: String) -> GatewayError {
    match serde_json::from_str::<BinanceErrorResponse>(&body) {
        Ok(err) => GatewayError::Api {
            status: status.as_u16(),
            code: err.code,
            msg: err.msg,
        },
        Err(_) => GatewayError::Status {
            status: status.as_u16(),
            body,
        },
    }
}

#[async_trait]
impl ExchangeGateway for BinanceClient {
    async fn change_leverage(
        &self,
        symbol: &str,
        leverage: u32,
    ) -> Result<LeverageAck, GatewayError> {
        let params = format!("symbol={}&leverage={}", symbol.to_uppercase(), leverage);
        let resp = self
            .send_signed(Method::POST, "/fapi/v1/leverage", &params)
            .await?;

        Self::decode::<LeverageResponse>(resp).await?.to_model()
    }

    async fn fetch_klines(
        &self,
        symbol: &str,
        interval: &str,
        limit: u16,
    ) -> Result<Vec<PriceBar>, GatewayError> {
        let url = format!("{}/fapi/v1/klines", self.base_url);
        let limit = limit.to_string();

        let resp = self
            .client
            .get(&url)
            .query(&[
                ("symbol", symbol.to_uppercase().as_str()),
                ("interval", interval),
                ("limit", limit.as_str()),
            ])
            .send()
            .await?;

        let rows = Self::decode::<Vec<KlineRow>>(resp).await?;
        rows.iter().map(|row| row.to_model()).collect()
    }

    async fn place_order(&self, order: &OrderRequest) -> Result<OrderResult, GatewayError> {
        let params = format!(
            "symbol={}&side={}&type={}&quantity={}&newClientOrderId={}",
            order.symbol,
            order.side,
            order.order_type.as_str(),
            order.quantity,
            order.client_order_id
        );

        info!(
            "Placing Order: {} {} {}",
            order.side, order.quantity, order.symbol
        );

        let resp = self
            .send_signed(Method::POST, "/fapi/v1/order", &params)
            .await?;

        Self::decode::<OrderResponse>(resp).await?.to_model()
    }
}
