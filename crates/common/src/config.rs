use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "https://fapi.binance.com";
pub const DEFAULT_SYMBOL: &str = "BTCUSDT";
pub const DEFAULT_QUANTITY: f64 = 0.001;
pub const DEFAULT_LEVERAGE: u32 = 1;
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 60;
pub const DEFAULT_KLINE_INTERVAL: &str = "1m";
pub const DEFAULT_KLINE_LIMIT: u16 = 100;
pub const DEFAULT_SHORT_WINDOW: usize = 5;
pub const DEFAULT_LONG_WINDOW: usize = 20;

const MAX_LEVERAGE: u32 = 125;
const MAX_KLINE_LIMIT: u16 = 1500;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} must be set (see .env or the process environment)")]
    Missing(&'static str),
    #[error("{var} has invalid value {value:?}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Clone)]
pub struct Credentials {
    pub api_key: String,
    pub api_secret: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .finish()
    }
}

/// Process-wide settings, loaded once at startup.
#[derive(Debug, Clone)]
pub struct BotConfig {
    pub credentials: Credentials,
    pub base_url: String,
    pub symbol: String,
    pub quantity: f64,
    pub leverage: u32,
    pub poll_interval: Duration,
    pub kline_interval: String,
    pub kline_limit: u16,
    pub short_window: usize,
    pub long_window: usize,
}

impl BotConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = required(&lookup, "BINANCE_API_KEY")?;
        let api_secret = required(&lookup, "BINANCE_API_SECRET")?;

        let base_url = optional(&lookup, "BINANCE_FUTURES_URL")
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let symbol = optional(&lookup, "BOT_SYMBOL")
            .unwrap_or_else(|| DEFAULT_SYMBOL.to_string())
            .to_uppercase();

        let quantity = parsed(&lookup, "BOT_QUANTITY", DEFAULT_QUANTITY)?;
        if !quantity.is_finite() || quantity <= 0.0 {
            return Err(invalid("BOT_QUANTITY", quantity, "must be a positive number"));
        }

        let leverage = parsed(&lookup, "BOT_LEVERAGE", DEFAULT_LEVERAGE)?;
        if leverage == 0 || leverage > MAX_LEVERAGE {
            return Err(invalid(
                "BOT_LEVERAGE",
                leverage,
                &format!("must be between 1 and {}", MAX_LEVERAGE),
            ));
        }

        let poll_secs = parsed(&lookup, "BOT_POLL_INTERVAL_SECS", DEFAULT_POLL_INTERVAL_SECS)?;
        if poll_secs == 0 {
            return Err(invalid("BOT_POLL_INTERVAL_SECS", poll_secs, "must be non-zero"));
        }

        let kline_interval = optional(&lookup, "BOT_KLINE_INTERVAL")
            .unwrap_or_else(|| DEFAULT_KLINE_INTERVAL.to_string());

        let short_window = parsed(&lookup, "BOT_SHORT_WINDOW", DEFAULT_SHORT_WINDOW)?;
        let long_window = parsed(&lookup, "BOT_LONG_WINDOW", DEFAULT_LONG_WINDOW)?;
        if short_window == 0 {
            return Err(invalid("BOT_SHORT_WINDOW", short_window, "must be non-zero"));
        }
        if long_window <= short_window {
            return Err(invalid(
                "BOT_LONG_WINDOW",
                long_window,
                "must be greater than BOT_SHORT_WINDOW",
            ));
        }

        let kline_limit = parsed(&lookup, "BOT_KLINE_LIMIT", DEFAULT_KLINE_LIMIT)?;
        if kline_limit == 0 || kline_limit > MAX_KLINE_LIMIT {
            return Err(invalid(
                "BOT_KLINE_LIMIT",
                kline_limit,
                &format!("must be between 1 and {}", MAX_KLINE_LIMIT),
            ));
        }
        if usize::from(kline_limit) < long_window {
            return Err(invalid(
                "BOT_KLINE_LIMIT",
                kline_limit,
                "must cover at least BOT_LONG_WINDOW bars",
            ));
        }

        Ok(Self {
            credentials: Credentials {
                api_key,
                api_secret,
            },
            base_url,
            symbol,
            quantity,
            leverage,
            poll_interval: Duration::from_secs(poll_secs),
            kline_interval,
            kline_limit,
            short_window,
            long_window,
        })
    }
}

fn optional<F>(lookup: &F, var: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(var)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required<F>(lookup: &F, var: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    optional(lookup, var).ok_or(ConfigError::Missing(var))
}

fn parsed<F, T>(lookup: &F, var: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: fmt::Display,
{
    match optional(lookup, var) {
        Some(raw) => raw.parse::<T>().map_err(|e| ConfigError::Invalid {
            var,
            value: raw.clone(),
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}

fn invalid<T: fmt::Display>(var: &'static str, value: T, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        var,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    const CREDS: [(&str, &str); 2] = [
        ("BINANCE_API_KEY", "key"),
        ("BINANCE_API_SECRET", "secret"),
    ];

    #[test]
    fn test_defaults_with_only_credentials() {
        let config = BotConfig::from_lookup(lookup_from(&CREDS)).unwrap();

        assert_eq!(config.symbol, "BTCUSDT");
        assert_eq!(config.quantity, 0.001);
        assert_eq!(config.leverage, 1);
        assert_eq!(config.poll_interval, Duration::from_secs(60));
        assert_eq!(config.kline_interval, "1m");
        assert_eq!(config.kline_limit, 100);
        assert_eq!(config.short_window, 5);
        assert_eq!(config.long_window, 20);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_missing_key_is_reported() {
        let err = BotConfig::from_lookup(lookup_from(&[("BINANCE_API_SECRET", "s")])).unwrap_err();
        assert_eq!(err, ConfigError::Missing("BINANCE_API_KEY"));
    }

    #[test]
    fn test_empty_secret_counts_as_missing() {
        let err = BotConfig::from_lookup(lookup_from(&[
            ("BINANCE_API_KEY", "key"),
            ("BINANCE_API_SECRET", "  "),
        ]))
        .unwrap_err();
        assert_eq!(err, ConfigError::Missing("BINANCE_API_SECRET"));
    }

    #[test]
    fn test_overrides_are_applied() {
        let mut pairs = CREDS.to_vec();
        pairs.extend([
            ("BOT_SYMBOL", "ethusdt"),
            ("BOT_QUANTITY", "0.05"),
            ("BOT_POLL_INTERVAL_SECS", "15"),
            ("BINANCE_FUTURES_URL", "https://testnet.binancefuture.com/"),
        ]);
        let config = BotConfig::from_lookup(lookup_from(&pairs)).unwrap();

        assert_eq!(config.symbol, "ETHUSDT");
        assert_eq!(config.quantity, 0.05);
        assert_eq!(config.poll_interval, Duration::from_secs(15));
        assert_eq!(config.base_url, "https://testnet.binancefuture.com");
    }

    #[test]
    fn test_rejects_non_positive_quantity() {
        let mut pairs = CREDS.to_vec();
        pairs.push(("BOT_QUANTITY", "0"));
        let err = BotConfig::from_lookup(lookup_from(&pairs)).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "BOT_QUANTITY", .. }));
    }

    #[test]
    fn test_rejects_unparseable_number() {
        let mut pairs = CREDS.to_vec();
        pairs.push(("BOT_LEVERAGE", "ten"));
        let err = BotConfig::from_lookup(lookup_from(&pairs)).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "BOT_LEVERAGE", .. }));
    }

    #[test]
    fn test_rejects_inverted_windows() {
        let mut pairs = CREDS.to_vec();
        pairs.extend([("BOT_SHORT_WINDOW", "20"), ("BOT_LONG_WINDOW", "5")]);
        let err = BotConfig::from_lookup(lookup_from(&pairs)).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "BOT_LONG_WINDOW", .. }));
    }

    #[test]
    fn test_rejects_limit_shorter_than_long_window() {
        let mut pairs = CREDS.to_vec();
        pairs.push(("BOT_KLINE_LIMIT", "10"));
        let err = BotConfig::from_lookup(lookup_from(&pairs)).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "BOT_KLINE_LIMIT", .. }));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config = BotConfig::from_lookup(lookup_from(&CREDS)).unwrap();
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("\"secret\""));
        assert!(rendered.contains("<redacted>"));
    }
}
