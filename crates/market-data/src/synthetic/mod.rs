//! Synthetic quote and history generation.
//!
//! Used when the provider cannot be reached or keeps rate limiting us. The
//! values are random but always satisfy the same range invariants as live
//! data, so consumers never need to special-case them.

use chrono::{Days, NaiveDate, Utc};
use rand::Rng;
use rust_decimal::Decimal;

use crate::models::{HistoryPoint, HistorySeries, Quote, HISTORY_WINDOW};

/// Base price used for symbols missing from the reference table.
pub const DEFAULT_BASE_PRICE: f64 = 1000.0;

/// Maximum absolute daily move, in percent.
pub const MAX_CHANGE_PERCENT: f64 = 2.0;

/// Maximum relative distance of the session high/low from the base price.
const MAX_RANGE_PERTURBATION: f64 = 0.02;

/// Maximum relative daily perturbation of history points.
const HISTORY_VOLATILITY: f64 = 0.02;

const MIN_VOLUME: u64 = 500_000;
const MAX_VOLUME: u64 = 1_500_000;

const MARKET_CAP_MULTIPLIER: f64 = 1_000_000_000.0;

/// Reference prices for the default watchlist.
const REFERENCE_PRICES: &[(&str, f64)] = &[
    ("RELIANCE", 2450.75),
    ("TCS", 3890.25),
    ("HDFCBANK", 1678.50),
    ("INFY", 1456.80),
    ("ICICIBANK", 987.65),
    ("ITC", 432.15),
    ("HINDUNILVR", 2567.90),
    ("SBIN", 645.30),
];

/// Produces plausible quote and history records without any I/O.
#[derive(Clone, Debug, Default)]
pub struct SyntheticDataGenerator;

impl SyntheticDataGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Reference base price for `symbol`, or [`DEFAULT_BASE_PRICE`].
    pub fn base_price(symbol: &str) -> f64 {
        REFERENCE_PRICES
            .iter()
            .find(|(s, _)| s.eq_ignore_ascii_case(symbol))
            .map(|(_, price)| *price)
            .unwrap_or(DEFAULT_BASE_PRICE)
    }

    pub fn generate_quote(&self, symbol: &str) -> Quote {
        let mut rng = rand::thread_rng();
        let base = Self::base_price(symbol);

        let change_percent = rng.gen_range(-MAX_CHANGE_PERCENT..=MAX_CHANGE_PERCENT);
        let change = base * change_percent / 100.0;
        let current = base + change;

        // Keep the session range consistent with the generated price.
        let high = (base * (1.0 + rng.gen_range(0.0..=MAX_RANGE_PERTURBATION))).max(current);
        let low = (base * (1.0 - rng.gen_range(0.0..=MAX_RANGE_PERTURBATION))).min(current);

        Quote {
            symbol: symbol.to_string(),
            display_name: symbol.to_string(),
            current_price: to_price(current),
            previous_close: to_price(base),
            high: to_price(high),
            low: to_price(low),
            change: to_price(change),
            change_percent: to_price(change_percent),
            volume: rng.gen_range(MIN_VOLUME..MAX_VOLUME),
            market_cap: to_price(base * MARKET_CAP_MULTIPLIER),
        }
    }

    /// History for the last [`HISTORY_WINDOW`] calendar days ending today.
    pub fn generate_history(&self, symbol: &str) -> HistorySeries {
        self.generate_history_ending(symbol, Utc::now().date_naive())
    }

    /// History for the last [`HISTORY_WINDOW`] calendar days ending on `today`.
    pub fn generate_history_ending(&self, symbol: &str, today: NaiveDate) -> HistorySeries {
        let mut rng = rand::thread_rng();
        let base = Self::base_price(symbol);

        let points = (0..HISTORY_WINDOW as u64).rev().filter_map(|days_back| {
            let date = today.checked_sub_days(Days::new(days_back))?;
            let perturbation = rng.gen_range(-HISTORY_VOLATILITY..=HISTORY_VOLATILITY);
            Some(HistoryPoint::new(date, to_price(base * (1.0 + perturbation))))
        });

        HistorySeries::from_unordered(points.collect::<Vec<_>>(), HISTORY_WINDOW)
    }
}

/// Values that can stand in for a failed provider call.
pub trait Synthesize: Sized {
    fn synthesize(generator: &SyntheticDataGenerator, symbol: &str) -> Self;
}

impl Synthesize for Quote {
    fn synthesize(generator: &SyntheticDataGenerator, symbol: &str) -> Self {
        generator.generate_quote(symbol)
    }
}

impl Synthesize for HistorySeries {
    fn synthesize(generator: &SyntheticDataGenerator, symbol: &str) -> Self {
        generator.generate_history(symbol)
    }
}

/// Round to cents; non-finite input collapses to zero.
fn to_price(value: f64) -> Decimal {
    Decimal::from_f64_retain(value)
        .unwrap_or(Decimal::ZERO)
        .round_dp(2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_base_price_lookup() {
        assert_eq!(SyntheticDataGenerator::base_price("TCS"), 3890.25);
        assert_eq!(SyntheticDataGenerator::base_price("tcs"), 3890.25);
        assert_eq!(SyntheticDataGenerator::base_price("UNKNOWN"), DEFAULT_BASE_PRICE);
    }

    #[test]
    fn test_quote_shape() {
        let quote = SyntheticDataGenerator::new().generate_quote("RELIANCE");

        assert_eq!(quote.symbol, "RELIANCE");
        assert_eq!(quote.previous_close, dec!(2450.75));
        assert_eq!(quote.market_cap, dec!(2450750000000));
        assert!(quote.low <= quote.current_price);
        assert!(quote.current_price <= quote.high);
        assert!((MIN_VOLUME..MAX_VOLUME).contains(&quote.volume));
    }

    #[test]
    fn test_unknown_symbol_uses_default_base() {
        let quote = SyntheticDataGenerator::new().generate_quote("NEWCO");
        assert_eq!(quote.previous_close, dec!(1000));
        assert!(quote.current_price >= dec!(980) && quote.current_price <= dec!(1020));
    }

    #[test]
    fn test_history_covers_window_ending_today() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();
        let history = SyntheticDataGenerator::new().generate_history_ending("ITC", today);

        assert_eq!(history.len(), HISTORY_WINDOW);
        assert_eq!(history.last_date(), Some(today));
        assert_eq!(history.first_date(), NaiveDate::from_ymd_opt(2024, 3, 2));
        assert!(history
            .points()
            .windows(2)
            .all(|pair| pair[0].date < pair[1].date));
    }

    #[test]
    fn test_history_prices_rounded_and_bounded() {
        let history = SyntheticDataGenerator::new().generate_history("SBIN");

        for point in &history {
            assert_eq!(point.price, point.price.round_dp(2));
            assert!(point.price >= dec!(632.39) && point.price <= dec!(658.21));
        }
    }

    #[test]
    fn test_synthesize_dispatch() {
        let generator = SyntheticDataGenerator::new();
        let quote = Quote::synthesize(&generator, "INFY");
        let history = HistorySeries::synthesize(&generator, "INFY");

        assert_eq!(quote.symbol, "INFY");
        assert_eq!(history.len(), HISTORY_WINDOW);
    }
}
