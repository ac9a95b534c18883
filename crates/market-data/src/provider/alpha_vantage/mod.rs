//! Alpha Vantage market data provider implementation.
//!
//! This module provides market data from Alpha Vantage API:
//! - Latest quotes via GLOBAL_QUOTE endpoint
//! - Daily closes via TIME_SERIES_DAILY endpoint
//!
//! Note: Alpha Vantage free tier is limited to 5 API calls per minute.

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

use crate::errors::MarketDataError;
use crate::models::{RawHistoryPoint, RawQuote};
use crate::provider::QuoteProvider;

const BASE_URL: &str = "https://www.alphavantage.co/query";
const PROVIDER_ID: &str = "ALPHA_VANTAGE";

/// Default HTTP timeout for a single request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// `compact` returns the latest 100 data points; anything larger needs `full`.
const COMPACT_OUTPUT_SIZE: usize = 100;

/// Alpha Vantage market data provider.
pub struct AlphaVantageProvider {
    client: Client,
    api_key: String,
    base_url: String,
    exchange_suffix: Option<String>,
}

// ============================================================================
// Response structures for Alpha Vantage API
// ============================================================================

/// GLOBAL_QUOTE response
#[derive(Debug, Deserialize)]
struct GlobalQuoteResponse {
    #[serde(rename = "Global Quote")]
    global_quote: Option<GlobalQuote>,
    #[serde(rename = "Error Message")]
    error_message: Option<String>,
    #[serde(rename = "Note")]
    note: Option<String>,
    #[serde(rename = "Information")]
    information: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct GlobalQuote {
    #[serde(rename = "03. high")]
    high: Option<String>,
    #[serde(rename = "04. low")]
    low: Option<String>,
    #[serde(rename = "05. price")]
    price: Option<String>,
    #[serde(rename = "06. volume")]
    volume: Option<String>,
    #[serde(rename = "08. previous close")]
    previous_close: Option<String>,
    #[serde(rename = "09. change")]
    change: Option<String>,
    #[serde(rename = "10. change percent")]
    change_percent: Option<String>,
}

impl From<GlobalQuote> for RawQuote {
    fn from(quote: GlobalQuote) -> Self {
        RawQuote {
            price: quote.price,
            previous_close: quote.previous_close,
            high: quote.high,
            low: quote.low,
            change: quote.change,
            change_percent: quote.change_percent,
            volume: quote.volume,
            // GLOBAL_QUOTE carries no market capitalization
            market_cap: None,
        }
    }
}

/// TIME_SERIES_DAILY response
#[derive(Debug, Deserialize)]
struct TimeSeriesResponse {
    #[serde(rename = "Time Series (Daily)")]
    time_series: Option<HashMap<String, DailyQuote>>,
    #[serde(rename = "Error Message")]
    error_message: Option<String>,
    #[serde(rename = "Note")]
    note: Option<String>,
    #[serde(rename = "Information")]
    information: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DailyQuote {
    #[serde(rename = "4. close")]
    close: Option<String>,
}

// ============================================================================
// AlphaVantageProvider implementation
// ============================================================================

impl AlphaVantageProvider {
    /// Create a new Alpha Vantage provider with the given API key.
    pub fn new(api_key: String) -> Self {
        Self::with_timeout(api_key, DEFAULT_REQUEST_TIMEOUT)
    }

    /// Create a provider whose requests time out after `timeout`.
    pub fn with_timeout(api_key: String, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            api_key,
            base_url: BASE_URL.to_string(),
            exchange_suffix: None,
        }
    }

    /// Append `suffix` (e.g. `.BSE`) to every symbol sent upstream.
    pub fn with_exchange_suffix(mut self, suffix: Option<String>) -> Self {
        self.exchange_suffix = suffix.filter(|s| !s.trim().is_empty());
        self
    }

    /// Point the provider at a different endpoint.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn provider_symbol(&self, symbol: &str) -> String {
        match &self.exchange_suffix {
            Some(suffix) if !symbol.ends_with(suffix.as_str()) => format!("{}{}", symbol, suffix),
            _ => symbol.to_string(),
        }
    }

    /// Make a request to the Alpha Vantage API.
    async fn fetch(&self, params: &[(&str, &str)]) -> Result<String, MarketDataError> {
        if self.api_key.trim().is_empty() {
            return Err(MarketDataError::MissingCredential {
                provider: PROVIDER_ID.to_string(),
            });
        }

        let mut all_params: Vec<(&str, &str)> = params.to_vec();
        all_params.push(("apikey", self.api_key.as_str()));

        let url = reqwest::Url::parse_with_params(&self.base_url, &all_params).map_err(|e| {
            MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: format!("Failed to build URL: {}", e),
            }
        })?;

        debug!(
            "Alpha Vantage request: {}",
            url.as_str().replace(&self.api_key, "***")
        );

        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                MarketDataError::Timeout {
                    provider: PROVIDER_ID.to_string(),
                }
            } else {
                MarketDataError::Network(e)
            }
        })?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(MarketDataError::RateLimited {
                provider: PROVIDER_ID.to_string(),
            });
        }

        if !status.is_success() {
            return Err(MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: format!("HTTP {}", status),
            });
        }

        response
            .text()
            .await
            .map_err(|e| MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: e.to_string(),
            })
    }

    /// Check for API-level errors in the response.
    ///
    /// Alpha Vantage answers throttled requests with HTTP 200 and a
    /// `Note` or `Information` body, so those are mapped to `RateLimited`.
    fn check_api_error(
        error_message: &Option<String>,
        note: &Option<String>,
        information: &Option<String>,
    ) -> Result<(), MarketDataError> {
        if let Some(ref msg) = error_message {
            return Err(MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: msg.clone(),
            });
        }

        for msg in [note, information].into_iter().flatten() {
            if Self::is_rate_limit_message(msg) {
                return Err(MarketDataError::RateLimited {
                    provider: PROVIDER_ID.to_string(),
                });
            }
            warn!("Alpha Vantage note: {}", msg);
        }

        Ok(())
    }

    fn is_rate_limit_message(msg: &str) -> bool {
        let msg = msg.to_lowercase();
        msg.contains("api call frequency") || msg.contains("rate limit")
    }

    fn parse_error(e: serde_json::Error) -> MarketDataError {
        MarketDataError::ProviderError {
            provider: PROVIDER_ID.to_string(),
            message: format!("Failed to parse response: {}", e),
        }
    }

    /// Decode a GLOBAL_QUOTE body.
    fn parse_global_quote(symbol: &str, text: &str) -> Result<RawQuote, MarketDataError> {
        let response: GlobalQuoteResponse = serde_json::from_str(text).map_err(Self::parse_error)?;

        Self::check_api_error(
            &response.error_message,
            &response.note,
            &response.information,
        )?;

        let raw: RawQuote = response
            .global_quote
            .ok_or_else(|| MarketDataError::no_data(symbol))?
            .into();

        if raw.is_empty() {
            return Err(MarketDataError::no_data(symbol));
        }

        Ok(raw)
    }

    /// Decode a TIME_SERIES_DAILY body. Points come back in map order.
    fn parse_time_series(symbol: &str, text: &str) -> Result<Vec<RawHistoryPoint>, MarketDataError> {
        let response: TimeSeriesResponse = serde_json::from_str(text).map_err(Self::parse_error)?;

        Self::check_api_error(
            &response.error_message,
            &response.note,
            &response.information,
        )?;

        let time_series = response
            .time_series
            .filter(|series| !series.is_empty())
            .ok_or_else(|| MarketDataError::no_data(symbol))?;

        Ok(time_series
            .into_iter()
            .map(|(date, daily)| RawHistoryPoint {
                date,
                close: daily.close,
            })
            .collect())
    }
}

// ============================================================================
// QuoteProvider trait implementation
// ============================================================================

#[async_trait]
impl QuoteProvider for AlphaVantageProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    async fn get_quote(&self, symbol: &str) -> Result<RawQuote, MarketDataError> {
        let provider_symbol = self.provider_symbol(symbol);
        let params = [("function", "GLOBAL_QUOTE"), ("symbol", provider_symbol.as_str())];

        let text = self.fetch(&params).await?;
        let raw = Self::parse_global_quote(symbol, &text)?;

        debug!("Alpha Vantage: fetched quote for {}", symbol);
        Ok(raw)
    }

    async fn get_daily_history(
        &self,
        symbol: &str,
        size_hint: usize,
    ) -> Result<Vec<RawHistoryPoint>, MarketDataError> {
        let provider_symbol = self.provider_symbol(symbol);
        let output_size = if size_hint <= COMPACT_OUTPUT_SIZE {
            "compact"
        } else {
            "full"
        };
        let params = [
            ("function", "TIME_SERIES_DAILY"),
            ("symbol", provider_symbol.as_str()),
            ("outputsize", output_size),
        ];

        let text = self.fetch(&params).await?;
        let points = Self::parse_time_series(symbol, &text)?;

        debug!(
            "Alpha Vantage: fetched {} daily closes for {}",
            points.len(),
            symbol
        );
        Ok(points)
    }
}
