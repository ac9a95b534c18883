//! Watchlist Market Data Crate
//!
//! Keeps a fixed watchlist of equities refreshed from a rate-limited quote
//! provider, and degrades to synthetic data instead of failing when the
//! provider is unavailable.
//!
//! # Architecture
//!
//! ```text
//! +------------------+
//! | RefreshScheduler |  (interval timer, overlap protection)
//! +------------------+
//!          |
//!          v
//! +---------------------+
//! | RefreshOrchestrator |  (one sequential pass over the watchlist)
//! +---------------------+
//!          |
//!          v
//! +---------------------+     +------------------------+
//! | QuoteHistoryFetcher | --> | RateLimitedExecutor    |  (spacing, retry, fallback)
//! +---------------------+     +------------------------+
//!          |                        |
//!          v                        v
//! +------------------+     +------------------------+
//! |  QuoteProvider   |     | SyntheticDataGenerator |
//! +------------------+     +------------------------+
//! ```
//!
//! Results land in [`LatestResults`] and are broadcast on the [`EventBus`]
//! as each symbol completes.
//!
//! # Core Types
//!
//! - [`Quote`] - Normalized quote snapshot
//! - [`HistorySeries`] - Ascending, date-unique daily closes
//! - [`SymbolResult`] - Quote and history for one symbol from one cycle
//! - [`SourceKind`] - Whether a value is live or synthetic

pub mod config;
pub mod errors;
pub mod executor;
pub mod fetcher;
pub mod models;
pub mod provider;
pub mod refresh;
pub mod synthetic;

pub use config::{RefreshConfig, DEFAULT_REFRESH_INTERVAL, DEFAULT_SYMBOLS};
pub use errors::{MarketDataError, RetryClass};
pub use executor::{RateLimitedExecutor, RetryPolicy};
pub use fetcher::QuoteHistoryFetcher;
pub use models::{
    HistoryPoint, HistorySeries, Quote, RawHistoryPoint, RawQuote, SourceKind, Sourced,
    SymbolResult, HISTORY_WINDOW,
};
pub use provider::{alpha_vantage::AlphaVantageProvider, QuoteProvider};
pub use refresh::{
    CycleState, CycleSummary, EventBus, LatestResults, RefreshEvent, RefreshOrchestrator,
    RefreshScheduler, SortKey, WatchlistQuery, DEFAULT_EVENT_CAPACITY, DEGRADED_ADVISORY,
};
pub use synthetic::{Synthesize, SyntheticDataGenerator};
