pub mod services;

pub use services::signal_engine::{SignalEngine, SignalError, compute_signal};
