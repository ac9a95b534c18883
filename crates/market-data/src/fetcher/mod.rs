//! Per-symbol quote and history retrieval.

mod normalize;

pub use normalize::{normalize_history, normalize_quote, parse_number};

use std::sync::Arc;

use log::debug;

use crate::errors::MarketDataError;
use crate::executor::RateLimitedExecutor;
use crate::models::{SymbolResult, HISTORY_WINDOW};
use crate::provider::QuoteProvider;

/// Fetches one symbol's quote and history through the executor.
///
/// The two calls run concurrently and fail or fall back independently, so a
/// result may pair a live quote with a synthetic history.
pub struct QuoteHistoryFetcher {
    provider: Arc<dyn QuoteProvider>,
    executor: RateLimitedExecutor,
    history_window: usize,
    synthetic_fallback: bool,
}

impl QuoteHistoryFetcher {
    pub fn new(provider: Arc<dyn QuoteProvider>, executor: RateLimitedExecutor) -> Self {
        Self {
            provider,
            executor,
            history_window: HISTORY_WINDOW,
            synthetic_fallback: true,
        }
    }

    pub fn with_history_window(mut self, history_window: usize) -> Self {
        self.history_window = history_window;
        self
    }

    /// Enable or disable synthetic fallback inside the executor. Without it,
    /// exhausted retries surface as an error from [`fetch`](Self::fetch).
    pub fn with_synthetic_fallback(mut self, enabled: bool) -> Self {
        self.synthetic_fallback = enabled;
        self
    }

    pub fn provider_id(&self) -> &'static str {
        self.provider.id()
    }

    pub async fn fetch(&self, symbol: &str) -> Result<SymbolResult, MarketDataError> {
        let fallback = self.synthetic_fallback.then_some(symbol);
        let provider = &self.provider;
        let window = self.history_window;

        let quote_call = move || async move {
            let raw = provider.get_quote(symbol).await?;
            normalize_quote(symbol, raw)
        };

        let history_call = move || async move {
            let raw = provider.get_daily_history(symbol, window).await?;
            normalize_history(symbol, raw, window)
        };

        let (quote, history) = tokio::join!(
            self.executor.execute_default(quote_call, fallback),
            self.executor.execute_default(history_call, fallback),
        );

        let result = SymbolResult::new(symbol, quote?, history?);

        debug!(
            "Fetched {} from '{}': quote {}, history {} ({} points)",
            symbol,
            self.provider.id(),
            result.quote_source,
            result.history_source,
            result.history.len()
        );

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::RetryPolicy;
    use crate::models::{RawHistoryPoint, RawQuote, SourceKind};
    use crate::synthetic::SyntheticDataGenerator;
    use async_trait::async_trait;
    use rust_decimal_macros::dec;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Quote always rate limited, history always served.
    struct QuoteDownProvider {
        quote_calls: AtomicU32,
    }

    #[async_trait]
    impl QuoteProvider for QuoteDownProvider {
        fn id(&self) -> &'static str {
            "QUOTE_DOWN"
        }

        async fn get_quote(&self, _symbol: &str) -> Result<RawQuote, MarketDataError> {
            self.quote_calls.fetch_add(1, Ordering::SeqCst);
            Err(MarketDataError::RateLimited {
                provider: self.id().to_string(),
            })
        }

        async fn get_daily_history(
            &self,
            _symbol: &str,
            _size_hint: usize,
        ) -> Result<Vec<RawHistoryPoint>, MarketDataError> {
            Ok(vec![
                RawHistoryPoint::new("2024-03-15", "101.25"),
                RawHistoryPoint::new("2024-03-14", "100.75"),
            ])
        }
    }

    fn fetcher(provider: Arc<dyn QuoteProvider>) -> QuoteHistoryFetcher {
        let executor = RateLimitedExecutor::new(
            RetryPolicy {
                max_retries: 1,
                ..RetryPolicy::default()
            },
            Arc::new(SyntheticDataGenerator::new()),
        );
        QuoteHistoryFetcher::new(provider, executor)
    }

    #[tokio::test(start_paused = true)]
    async fn test_quote_and_history_fall_back_independently() {
        let provider = Arc::new(QuoteDownProvider {
            quote_calls: AtomicU32::new(0),
        });

        let result = fetcher(provider.clone()).fetch("HDFCBANK").await.unwrap();

        assert_eq!(provider.quote_calls.load(Ordering::SeqCst), 2);
        assert_eq!(result.quote_source, SourceKind::Synthetic);
        assert_eq!(result.history_source, SourceKind::Live);
        assert_eq!(result.source, SourceKind::Synthetic);
        assert_eq!(result.quote.symbol, "HDFCBANK");
        assert_eq!(result.history.len(), 2);
        assert_eq!(result.history.latest().unwrap().price, dec!(101.25));
    }

    #[tokio::test(start_paused = true)]
    async fn test_without_fallback_propagates_error() {
        let provider = Arc::new(QuoteDownProvider {
            quote_calls: AtomicU32::new(0),
        });

        let err = fetcher(provider)
            .with_synthetic_fallback(false)
            .fetch("HDFCBANK")
            .await
            .unwrap_err();

        assert!(matches!(err, MarketDataError::RateLimited { .. }));
    }
}
