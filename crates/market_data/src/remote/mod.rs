pub mod binance_client;
pub mod kline_response;
pub mod order_response;

pub use binance_client::BinanceClient;
pub use kline_response::KlineRow;
pub use order_response::{BinanceErrorResponse, LeverageResponse, OrderResponse};
