//! Property-based tests for synthetic data and history normalization.
//!
//! Synthetic values stand in for live data, so they must satisfy the same
//! range and ordering invariants no matter what the random draw was.

use chrono::{Days, NaiveDate};
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use watchlist_market_data::fetcher::normalize_history;
use watchlist_market_data::{RawHistoryPoint, SyntheticDataGenerator, DEFAULT_SYMBOLS, HISTORY_WINDOW};

// =============================================================================
// Generators
// =============================================================================

/// A watchlist symbol or an arbitrary unknown ticker.
fn arb_symbol() -> impl Strategy<Value = String> {
    prop_oneof![
        proptest::sample::select(DEFAULT_SYMBOLS).prop_map(|s| s.to_string()),
        "[A-Z]{3,10}",
    ]
}

fn arb_date() -> impl Strategy<Value = NaiveDate> {
    (0u64..3650).prop_map(|offset| {
        NaiveDate::from_ymd_opt(2015, 1, 1).unwrap() + Days::new(offset)
    })
}

/// Raw history with possibly repeated dates, shuffled order and some junk.
fn arb_raw_history() -> impl Strategy<Value = Vec<RawHistoryPoint>> {
    proptest::collection::vec(
        prop_oneof![
            8 => (arb_date(), 0u32..100_000).prop_map(|(date, cents)| RawHistoryPoint::new(
                date.format("%Y-%m-%d").to_string(),
                format!("{}.{:02}", cents / 100, cents % 100),
            )),
            1 => Just(RawHistoryPoint::new("not-a-date", "1.00")),
            1 => arb_date().prop_map(|date| RawHistoryPoint {
                date: date.format("%Y-%m-%d").to_string(),
                close: None,
            }),
        ],
        0..80,
    )
}

fn base(symbol: &str) -> Decimal {
    Decimal::from_f64_retain(SyntheticDataGenerator::base_price(symbol))
        .unwrap()
        .round_dp(2)
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    #[test]
    fn prop_quote_within_daily_band(symbol in arb_symbol()) {
        let quote = SyntheticDataGenerator::new().generate_quote(&symbol);
        let base = base(&symbol);
        // Half a cent of slack for rounding at the edges
        let slack = dec!(0.01);

        prop_assert!(quote.current_price >= base * dec!(0.95) - slack);
        prop_assert!(quote.current_price <= base * dec!(1.05) + slack);
        prop_assert!(quote.change_percent >= dec!(-2) && quote.change_percent <= dec!(2));
        prop_assert!(quote.low <= quote.current_price && quote.current_price <= quote.high);
        prop_assert_eq!(quote.previous_close, base);
        prop_assert!(quote.volume >= 500_000 && quote.volume < 1_500_000);
    }

    #[test]
    fn prop_history_within_band(symbol in arb_symbol(), date in arb_date()) {
        let history = SyntheticDataGenerator::new().generate_history_ending(&symbol, date);
        let base = base(&symbol);

        prop_assert_eq!(history.len(), HISTORY_WINDOW);
        prop_assert_eq!(history.last_date(), Some(date));
        for point in &history {
            prop_assert!(point.price >= base * dec!(0.95));
            prop_assert!(point.price <= base * dec!(1.05));
        }
    }
}

proptest! {
    #[test]
    fn prop_normalized_history_is_ascending_and_bounded(raw in arb_raw_history()) {
        let has_valid_date = raw.iter().any(|p| p.date != "not-a-date");

        match normalize_history("TCS", raw, HISTORY_WINDOW) {
            Ok(series) => {
                prop_assert!(!series.is_empty());
                prop_assert!(series.len() <= HISTORY_WINDOW);
                prop_assert!(series.points().windows(2).all(|w| w[0].date < w[1].date));
                prop_assert!(series.iter().all(|p| p.price >= Decimal::ZERO));
            }
            Err(_) => prop_assert!(!has_valid_date),
        }
    }

    #[test]
    fn prop_normalized_history_keeps_most_recent(dates in proptest::collection::btree_set(arb_date(), 1..60)) {
        let raw: Vec<RawHistoryPoint> = dates
            .iter()
            .rev()
            .map(|d| RawHistoryPoint::new(d.format("%Y-%m-%d").to_string(), "10"))
            .collect();

        let series = normalize_history("INFY", raw, HISTORY_WINDOW).unwrap();

        let expected: Vec<NaiveDate> = dates
            .iter()
            .rev()
            .take(HISTORY_WINDOW)
            .rev()
            .copied()
            .collect();
        let actual: Vec<NaiveDate> = series.iter().map(|p| p.date).collect();
        prop_assert_eq!(actual, expected);
    }
}
