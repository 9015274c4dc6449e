use std::fmt;

use crate::models::OrderSide;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    Buy,
    Sell,
    Hold,
}

impl Signal {
    /// The order side this signal asks for, `None` when holding.
    pub fn side(self) -> Option<OrderSide> {
        match self {
            Signal::Buy => Some(OrderSide::Buy),
            Signal::Sell => Some(OrderSide::Sell),
            Signal::Hold => None,
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signal::Buy => write!(f, "BUY"),
            Signal::Sell => write!(f, "SELL"),
            Signal::Hold => write!(f, "HOLD"),
        }
    }
}
