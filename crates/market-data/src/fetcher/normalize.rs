//! Provider record normalization.
//!
//! Unparseable or missing numbers become zero rather than an error: a quote
//! with one odd field is still worth showing. Only an entirely empty payload
//! is rejected, so the executor retries or falls back.

use std::str::FromStr;

use chrono::NaiveDate;
use log::debug;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::errors::MarketDataError;
use crate::models::{HistoryPoint, HistorySeries, Quote, RawHistoryPoint, RawQuote};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a provider number, tolerating a trailing `%`, thousands separators
/// and surrounding whitespace. Anything else yields zero.
pub fn parse_number(value: Option<&str>) -> Decimal {
    let Some(value) = value else {
        return Decimal::ZERO;
    };

    let cleaned: String = value
        .trim()
        .trim_end_matches('%')
        .chars()
        .filter(|c| !matches!(c, ',' | '_' | ' ' | '\u{a0}'))
        .collect();

    Decimal::from_str(&cleaned)
        .or_else(|_| Decimal::from_scientific(&cleaned))
        .unwrap_or(Decimal::ZERO)
}

/// Like [`parse_number`], clamped at zero.
fn parse_non_negative(value: Option<&str>) -> Decimal {
    parse_number(value).max(Decimal::ZERO)
}

fn parse_volume(value: Option<&str>) -> u64 {
    parse_non_negative(value).trunc().to_u64().unwrap_or(0)
}

/// Turn a raw provider quote into a [`Quote`].
pub fn normalize_quote(symbol: &str, raw: RawQuote) -> Result<Quote, MarketDataError> {
    if raw.is_empty() {
        return Err(MarketDataError::no_data(symbol));
    }

    Ok(Quote {
        symbol: symbol.to_string(),
        display_name: symbol.to_string(),
        current_price: parse_non_negative(raw.price.as_deref()),
        previous_close: parse_non_negative(raw.previous_close.as_deref()),
        high: parse_non_negative(raw.high.as_deref()),
        low: parse_non_negative(raw.low.as_deref()),
        change: parse_number(raw.change.as_deref()),
        change_percent: parse_number(raw.change_percent.as_deref()),
        volume: parse_volume(raw.volume.as_deref()),
        market_cap: parse_non_negative(raw.market_cap.as_deref()),
    })
}

/// Turn raw daily closes (any order) into a [`HistorySeries`] of at most
/// `window` points, oldest first. Points with an unreadable date are dropped.
pub fn normalize_history(
    symbol: &str,
    raw: Vec<RawHistoryPoint>,
    window: usize,
) -> Result<HistorySeries, MarketDataError> {
    let points: Vec<HistoryPoint> = raw
        .into_iter()
        .filter_map(|point| match NaiveDate::parse_from_str(point.date.trim(), DATE_FORMAT) {
            Ok(date) => Some(HistoryPoint::new(
                date,
                parse_non_negative(point.close.as_deref()),
            )),
            Err(_) => {
                debug!("Skipping history point for {} with date '{}'", symbol, point.date);
                None
            }
        })
        .collect();

    if points.is_empty() {
        return Err(MarketDataError::no_data(symbol));
    }

    Ok(HistorySeries::from_unordered(points, window))
}
