use std::time::Duration;

use anyhow::Context;
use watchlist_market_data::{RefreshConfig, DEFAULT_REFRESH_INTERVAL};

/// Request timeout when `WATCHLIST_REQUEST_TIMEOUT_MS` is unset.
const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl LogFormat {
    fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("json") {
            Self::Json
        } else {
            Self::Text
        }
    }
}

pub struct Config {
    /// Alpha Vantage key. Without one every cycle is served synthetically.
    pub api_key: Option<String>,
    pub refresh: RefreshConfig,
    /// Appended to each symbol in provider requests, e.g. `.BSE`
    pub exchange_suffix: Option<String>,
    pub request_timeout: Duration,
    pub log_format: LogFormat,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let mut refresh = RefreshConfig::default();
        if let Some(symbols) = non_empty("WATCHLIST_SYMBOLS") {
            refresh = refresh.with_symbols(symbols.split(','));
        }
        if refresh.symbols.is_empty() {
            anyhow::bail!("WATCHLIST_SYMBOLS does not name any symbol");
        }

        refresh.refresh_interval = match non_empty("WATCHLIST_REFRESH_INTERVAL_SECS") {
            Some(raw) => {
                let secs: u64 = raw
                    .trim()
                    .parse()
                    .with_context(|| format!("Invalid WATCHLIST_REFRESH_INTERVAL_SECS: {}", raw))?;
                if secs == 0 {
                    anyhow::bail!("WATCHLIST_REFRESH_INTERVAL_SECS must be positive");
                }
                Duration::from_secs(secs)
            }
            None => DEFAULT_REFRESH_INTERVAL,
        };

        let timeout_ms: u64 = match non_empty("WATCHLIST_REQUEST_TIMEOUT_MS") {
            Some(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("Invalid WATCHLIST_REQUEST_TIMEOUT_MS: {}", raw))?,
            None => DEFAULT_REQUEST_TIMEOUT_MS,
        };

        Ok(Self {
            api_key: non_empty("WATCHLIST_ALPHA_VANTAGE_API_KEY").map(|k| k.trim().to_string()),
            refresh,
            exchange_suffix: non_empty("WATCHLIST_EXCHANGE_SUFFIX").map(|s| s.trim().to_string()),
            request_timeout: Duration::from_millis(timeout_ms),
            log_format: non_empty("WATCHLIST_LOG_FORMAT")
                .map(|v| LogFormat::parse(&v))
                .unwrap_or_default(),
        })
    }
}
