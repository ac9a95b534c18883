use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Point-in-time price/volume snapshot for one watchlist symbol.
///
/// Every numeric field is non-negative except `change` and `change_percent`.
/// Fields the provider left out or sent in an unparseable form are zero,
/// never missing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    /// Ticker, unique key of the watchlist
    pub symbol: String,

    /// Name shown next to the ticker
    pub display_name: String,

    /// Latest traded price
    pub current_price: Decimal,

    /// Previous session close
    pub previous_close: Decimal,

    /// Session high
    pub high: Decimal,

    /// Session low
    pub low: Decimal,

    /// Absolute change versus previous close
    pub change: Decimal,

    /// Change versus previous close, in percent (1.5 means 1.5%)
    pub change_percent: Decimal,

    /// Traded volume
    pub volume: u64,

    /// Market capitalization (zero when the provider does not report it)
    pub market_cap: Decimal,
}

impl Quote {
    /// Create a quote with every numeric field set to zero.
    pub fn empty(symbol: impl Into<String>) -> Self {
        let symbol = symbol.into();
        Self {
            display_name: symbol.clone(),
            symbol,
            current_price: Decimal::ZERO,
            previous_close: Decimal::ZERO,
            high: Decimal::ZERO,
            low: Decimal::ZERO,
            change: Decimal::ZERO,
            change_percent: Decimal::ZERO,
            volume: 0,
            market_cap: Decimal::ZERO,
        }
    }

    /// True when the price moved up (or not at all) since the previous close.
    ///
    /// `change` decides; when it is zero (often because the provider left it
    /// out) the sign of `change_percent` is used instead.
    pub fn is_gain(&self) -> bool {
        if self.change.is_zero() {
            self.change_percent >= Decimal::ZERO
        } else {
            self.change > Decimal::ZERO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_quote_empty() {
        let quote = Quote::empty("ITC");
        assert_eq!(quote.symbol, "ITC");
        assert_eq!(quote.display_name, "ITC");
        assert_eq!(quote.current_price, Decimal::ZERO);
        assert_eq!(quote.volume, 0);
    }

    #[test]
    fn test_quote_serializes_camel_case() {
        let mut quote = Quote::empty("SBIN");
        quote.change_percent = dec!(-1.25);
        let json = serde_json::to_value(&quote).unwrap();
        assert_eq!(json["displayName"], "SBIN");
        assert_eq!(json["changePercent"], -1.25);
        assert!(!quote.is_gain());
    }

    #[test]
    fn test_is_gain_prefers_change_over_percent() {
        let mut quote = Quote::empty("TCS");
        assert!(quote.is_gain());

        quote.change_percent = dec!(-0.5);
        assert!(!quote.is_gain());

        quote.change = dec!(2.10);
        assert!(quote.is_gain());

        quote.change = dec!(-2.10);
        quote.change_percent = Decimal::ZERO;
        assert!(!quote.is_gain());
    }
}
