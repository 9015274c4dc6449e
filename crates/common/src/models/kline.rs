use chrono::{DateTime, Utc};

/// One historical candle. Only `close` feeds the signal engine.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceBar {
    pub open_time: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub close_time: DateTime<Utc>,
}

pub fn closes(bars: &[PriceBar]) -> Vec<f64> {
    bars.iter().map(|b| b.close).collect()
}
