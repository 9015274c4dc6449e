pub mod kline;
pub mod order;
pub mod signal;

pub use kline::PriceBar;
pub use order::{LeverageAck, OrderRequest, OrderResult, OrderSide, OrderType};
pub use signal::Signal;
