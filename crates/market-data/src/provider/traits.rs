//! Quote provider trait definitions.
//!
//! This module defines the core `QuoteProvider` trait that the upstream
//! market data source implements.

use async_trait::async_trait;

use crate::errors::MarketDataError;
use crate::models::{RawHistoryPoint, RawQuote};

/// Trait for the upstream quote provider.
///
/// Providers only speak their own wire format and map it onto the raw
/// records; normalization, retries and fallback happen further up in the
/// [`QuoteHistoryFetcher`](crate::fetcher::QuoteHistoryFetcher) and
/// [`RateLimitedExecutor`](crate::executor::RateLimitedExecutor).
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use watchlist_market_data::provider::QuoteProvider;
///
/// struct MyProvider;
///
/// #[async_trait]
/// impl QuoteProvider for MyProvider {
///     fn id(&self) -> &'static str {
///         "MY_PROVIDER"
///     }
///
///     // ... implement quote and history methods
/// }
/// ```
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Unique identifier for this provider, used in logs and errors.
    fn id(&self) -> &'static str;

    /// Fetch the current quote for `symbol`.
    ///
    /// Must return [`MarketDataError::NoData`] when the provider answered
    /// without the expected payload, and [`MarketDataError::RateLimited`]
    /// when it signalled an exhausted call budget.
    async fn get_quote(&self, symbol: &str) -> Result<RawQuote, MarketDataError>;

    /// Fetch daily closes for `symbol`, in whatever order the provider uses.
    ///
    /// `size_hint` is the number of days the caller will keep; providers may
    /// return more.
    async fn get_daily_history(
        &self,
        symbol: &str,
        size_hint: usize,
    ) -> Result<Vec<RawHistoryPoint>, MarketDataError>;
}
