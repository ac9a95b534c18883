//! Error types and retry classification for the market data crate.
//!
//! This module provides:
//! - [`MarketDataError`]: The main error enum for all market data operations
//! - [`RetryClass`]: Classification for determining retry behavior

mod retry;

pub use retry::RetryClass;

use thiserror::Error;

/// Errors that can occur during market data operations.
///
/// Each variant is classified into a [`RetryClass`] via the [`retry_class`](Self::retry_class)
/// method, which determines how the executor waits before trying again.
#[derive(Error, Debug)]
pub enum MarketDataError {
    /// The provider rate limited the request (HTTP 429 or a rate-limit note).
    #[error("Rate limited: {provider}")]
    RateLimited {
        /// The provider that rate limited the request
        provider: String,
    },

    /// The request to the provider timed out.
    #[error("Timeout: {provider}")]
    Timeout {
        /// The provider that timed out
        provider: String,
    },

    /// A provider-specific error occurred (non-success status, error body,
    /// unparseable response).
    #[error("Provider error: {provider} - {message}")]
    ProviderError {
        /// The provider that returned the error
        provider: String,
        /// The error message from the provider
        message: String,
    },

    /// The provider answered but the expected payload was missing or empty.
    #[error("No data available for {symbol}")]
    NoData {
        /// The symbol that came back empty
        symbol: String,
    },

    /// No API key was configured for the provider.
    #[error("Missing credential for provider: {provider}")]
    MissingCredential {
        /// The provider lacking a credential
        provider: String,
    },

    /// A network error occurred while communicating with a provider.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl MarketDataError {
    /// Returns the retry classification for this error.
    ///
    /// # Examples
    ///
    /// ```
    /// use watchlist_market_data::errors::{MarketDataError, RetryClass};
    ///
    /// let error = MarketDataError::RateLimited { provider: "ALPHA_VANTAGE".to_string() };
    /// assert_eq!(error.retry_class(), RetryClass::Cooldown);
    ///
    /// let error = MarketDataError::NoData { symbol: "TCS".to_string() };
    /// assert_eq!(error.retry_class(), RetryClass::Backoff);
    /// ```
    pub fn retry_class(&self) -> RetryClass {
        match self {
            Self::RateLimited { .. } => RetryClass::Cooldown,

            Self::Timeout { .. }
            | Self::ProviderError { .. }
            | Self::NoData { .. }
            | Self::Network(_) => RetryClass::Backoff,

            Self::MissingCredential { .. } => RetryClass::Never,
        }
    }

    /// Shorthand for a [`MarketDataError::NoData`] on `symbol`.
    pub fn no_data(symbol: impl Into<String>) -> Self {
        Self::NoData {
            symbol: symbol.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limited_uses_cooldown() {
        let error = MarketDataError::RateLimited {
            provider: "ALPHA_VANTAGE".to_string(),
        };
        assert_eq!(error.retry_class(), RetryClass::Cooldown);
    }

    #[test]
    fn test_timeout_uses_backoff() {
        let error = MarketDataError::Timeout {
            provider: "ALPHA_VANTAGE".to_string(),
        };
        assert_eq!(error.retry_class(), RetryClass::Backoff);
    }

    #[test]
    fn test_provider_error_uses_backoff() {
        let error = MarketDataError::ProviderError {
            provider: "ALPHA_VANTAGE".to_string(),
            message: "HTTP 503 Service Unavailable".to_string(),
        };
        assert_eq!(error.retry_class(), RetryClass::Backoff);
    }

    #[test]
    fn test_empty_payload_uses_backoff() {
        assert_eq!(MarketDataError::no_data("TCS").retry_class(), RetryClass::Backoff);
    }

    #[test]
    fn test_missing_credential_never_retries() {
        let error = MarketDataError::MissingCredential {
            provider: "ALPHA_VANTAGE".to_string(),
        };
        assert_eq!(error.retry_class(), RetryClass::Never);
    }

    #[test]
    fn test_error_display() {
        let error = MarketDataError::no_data("INFY");
        assert_eq!(format!("{}", error), "No data available for INFY");

        let error = MarketDataError::RateLimited {
            provider: "ALPHA_VANTAGE".to_string(),
        };
        assert_eq!(format!("{}", error), "Rate limited: ALPHA_VANTAGE");

        let error = MarketDataError::ProviderError {
            provider: "ALPHA_VANTAGE".to_string(),
            message: "Invalid API call".to_string(),
        };
        assert_eq!(
            format!("{}", error),
            "Provider error: ALPHA_VANTAGE - Invalid API call"
        );
    }
}
