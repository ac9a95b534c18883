use serde::{Deserialize, Serialize};

/// Quote fields as the provider sent them, before normalization.
///
/// Providers map their own field names onto this shape; the fetcher turns it
/// into a [`Quote`](super::Quote).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawQuote {
    pub price: Option<String>,
    pub previous_close: Option<String>,
    pub high: Option<String>,
    pub low: Option<String>,
    pub change: Option<String>,
    pub change_percent: Option<String>,
    pub volume: Option<String>,
    pub market_cap: Option<String>,
}

impl RawQuote {
    /// True when the provider sent no usable field at all.
    pub fn is_empty(&self) -> bool {
        [
            &self.price,
            &self.previous_close,
            &self.high,
            &self.low,
            &self.change,
            &self.change_percent,
            &self.volume,
            &self.market_cap,
        ]
        .iter()
        .all(|field| field.as_deref().map_or(true, |v| v.trim().is_empty()))
    }
}

/// One day of provider history, in provider order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawHistoryPoint {
    /// `YYYY-MM-DD`
    pub date: String,
    pub close: Option<String>,
}

impl RawHistoryPoint {
    pub fn new(date: impl Into<String>, close: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            close: Some(close.into()),
        }
    }
}
