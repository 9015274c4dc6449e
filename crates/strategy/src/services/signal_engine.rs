use common::models::Signal;
use ta::Next;
use ta::indicators::SimpleMovingAverage;
use thiserror::Error;
use tracing::trace;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignalError {
    #[error("moving average windows must be non-zero (short={short}, long={long})")]
    ZeroWindow { short: usize, long: usize },
    #[error("short window {short} must be smaller than long window {long}")]
    InvertedWindows { short: usize, long: usize },
}

/// Short/long simple moving average crossover.
///
/// Stateless: every call looks only at the closes it is given, so the same
/// input always yields the same signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignalEngine {
    short_window: usize,
    long_window: usize,
}

impl SignalEngine {
    pub fn new(short_window: usize, long_window: usize) -> Result<Self, SignalError> {
        if short_window == 0 || long_window == 0 {
            return Err(SignalError::ZeroWindow {
                short: short_window,
                long: long_window,
            });
        }
        if short_window >= long_window {
            return Err(SignalError::InvertedWindows {
                short: short_window,
                long: long_window,
            });
        }

        Ok(Self {
            short_window,
            long_window,
        })
    }

    pub fn short_window(&self) -> usize {
        self.short_window
    }

    pub fn long_window(&self) -> usize {
        self.long_window
    }

    /// `closes` is oldest first. Anything shorter than the long window is
    /// warm-up and yields `Hold`.
    pub fn compute(&self, closes: &[f64]) -> Signal {
        if closes.len() < self.long_window {
            return Signal::Hold;
        }

        let (Some(short_ma), Some(long_ma)) = (
            trailing_mean(closes, self.short_window),
            trailing_mean(closes, self.long_window),
        ) else {
            return Signal::Hold;
        };

        trace!("short_ma={} long_ma={}", short_ma, long_ma);

        if short_ma > long_ma {
            Signal::Buy
        } else if short_ma < long_ma {
            Signal::Sell
        } else {
            Signal::Hold
        }
    }
}

impl Default for SignalEngine {
    fn default() -> Self {
        Self {
            short_window: 5,
            long_window: 20,
        }
    }
}

/// One-shot form of [`SignalEngine::compute`]. Invalid windows hold.
pub fn compute_signal(closes: &[f64], short_window: usize, long_window: usize) -> Signal {
    match SignalEngine::new(short_window, long_window) {
        Ok(engine) => engine.compute(closes),
        Err(_) => Signal::Hold,
    }
}

fn trailing_mean(closes: &[f64], window: usize) -> Option<f64> {
    let tail = closes.get(closes.len().checked_sub(window)?..)?;
    let mut sma = SimpleMovingAverage::new(window).ok()?;
    tail.iter().fold(None, |_, &close| Some(sma.next(close)))
}
