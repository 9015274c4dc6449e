use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("binance rejected request (HTTP {status}, code {code}): {msg}")]
    Api { status: u16, code: i64, msg: String },
    #[error("unexpected HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed response: {0}")]
    Decode(String),
}

impl From<serde_json::Error> for GatewayError {
    fn from(e: serde_json::Error) -> Self {
        GatewayError::Decode(e.to_string())
    }
}
