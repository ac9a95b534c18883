//! Pipeline configuration.

use std::sync::Arc;
use std::time::Duration;

use crate::executor::{RateLimitedExecutor, RetryPolicy};
use crate::fetcher::QuoteHistoryFetcher;
use crate::models::HISTORY_WINDOW;
use crate::provider::QuoteProvider;
use crate::refresh::{EventBus, LatestResults, RefreshOrchestrator};
use crate::synthetic::SyntheticDataGenerator;

/// Watchlist used when none is configured.
pub const DEFAULT_SYMBOLS: &[&str] = &[
    "RELIANCE",
    "TCS",
    "HDFCBANK",
    "INFY",
    "ICICIBANK",
    "ITC",
    "HINDUNILVR",
    "SBIN",
];

/// Default time between scheduled cycles.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RefreshConfig {
    /// Symbols refreshed each cycle, in fetch order
    pub symbols: Vec<String>,
    pub refresh_interval: Duration,
    pub retry: RetryPolicy,
    /// Trading days kept per history series
    pub history_window: usize,
    /// Substitute synthetic data when retries are exhausted
    pub synthetic_fallback: bool,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            symbols: DEFAULT_SYMBOLS.iter().map(|s| s.to_string()).collect(),
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            retry: RetryPolicy::default(),
            history_window: HISTORY_WINDOW,
            synthetic_fallback: true,
        }
    }
}

impl RefreshConfig {
    /// Replace the watchlist. Entries are trimmed and upper-cased; blanks
    /// and repeats are dropped, keeping the first occurrence.
    pub fn with_symbols<I, S>(mut self, symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut cleaned: Vec<String> = Vec::new();
        for symbol in symbols {
            let symbol = symbol.as_ref().trim().to_uppercase();
            if !symbol.is_empty() && !cleaned.contains(&symbol) {
                cleaned.push(symbol);
            }
        }
        self.symbols = cleaned;
        self
    }

    /// Wire an orchestrator for `provider` using this configuration.
    pub fn build_orchestrator(
        &self,
        provider: Arc<dyn QuoteProvider>,
        latest: Arc<LatestResults>,
        events: EventBus,
    ) -> RefreshOrchestrator {
        let generator = Arc::new(SyntheticDataGenerator::new());
        let executor = RateLimitedExecutor::new(self.retry.clone(), generator.clone());
        let fetcher = QuoteHistoryFetcher::new(provider, executor)
            .with_history_window(self.history_window)
            .with_synthetic_fallback(self.synthetic_fallback);

        RefreshOrchestrator::new(fetcher, generator, latest, events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RefreshConfig::default();
        assert_eq!(config.symbols.len(), 8);
        assert_eq!(config.symbols[0], "RELIANCE");
        assert_eq!(config.refresh_interval, Duration::from_secs(60));
        assert_eq!(config.retry.max_retries, 3);
        assert_eq!(config.retry.call_spacing, Duration::from_millis(1500));
        assert_eq!(config.history_window, 30);
        assert!(config.synthetic_fallback);
    }

    #[test]
    fn test_with_symbols_cleans_input() {
        let config = RefreshConfig::default().with_symbols([" tcs", "ITC ", "", "TCS", "sbin"]);
        assert_eq!(config.symbols, vec!["TCS", "ITC", "SBIN"]);
    }
}
