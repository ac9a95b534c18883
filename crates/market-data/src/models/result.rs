use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::history::HistorySeries;
use super::quote::Quote;

/// Where a record came from.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Returned by the upstream provider
    Live,
    /// Generated locally after the provider could not be reached
    Synthetic,
}

impl SourceKind {
    pub fn is_synthetic(self) -> bool {
        matches!(self, Self::Synthetic)
    }

    /// Synthetic if either side is synthetic.
    pub fn combine(self, other: SourceKind) -> SourceKind {
        if self.is_synthetic() || other.is_synthetic() {
            Self::Synthetic
        } else {
            Self::Live
        }
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Live => write!(f, "live"),
            Self::Synthetic => write!(f, "synthetic"),
        }
    }
}

/// A value tagged with its [`SourceKind`].
#[derive(Clone, Debug, PartialEq)]
pub struct Sourced<T> {
    pub value: T,
    pub source: SourceKind,
}

impl<T> Sourced<T> {
    pub fn live(value: T) -> Self {
        Self {
            value,
            source: SourceKind::Live,
        }
    }

    pub fn synthetic(value: T) -> Self {
        Self {
            value,
            source: SourceKind::Synthetic,
        }
    }
}

/// Unit published by the pipeline: one symbol, one refresh cycle.
///
/// Immutable once published; the next cycle supersedes it with a new value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolResult {
    pub symbol: String,
    pub quote: Quote,
    pub history: HistorySeries,

    /// Synthetic when either the quote or the history is synthetic
    pub source: SourceKind,
    pub quote_source: SourceKind,
    pub history_source: SourceKind,

    pub fetched_at: DateTime<Utc>,
}

impl SymbolResult {
    pub fn new(symbol: impl Into<String>, quote: Sourced<Quote>, history: Sourced<HistorySeries>) -> Self {
        Self {
            symbol: symbol.into(),
            source: quote.source.combine(history.source),
            quote_source: quote.source,
            history_source: history.source,
            quote: quote.value,
            history: history.value,
            fetched_at: Utc::now(),
        }
    }

    pub fn is_synthetic(&self) -> bool {
        self.source.is_synthetic()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_combine() {
        assert_eq!(SourceKind::Live.combine(SourceKind::Live), SourceKind::Live);
        assert_eq!(
            SourceKind::Live.combine(SourceKind::Synthetic),
            SourceKind::Synthetic
        );
        assert_eq!(
            SourceKind::Synthetic.combine(SourceKind::Live),
            SourceKind::Synthetic
        );
    }

    #[test]
    fn test_result_mixed_sources() {
        let result = SymbolResult::new(
            "INFY",
            Sourced::live(Quote::empty("INFY")),
            Sourced::synthetic(HistorySeries::default()),
        );

        assert_eq!(result.quote_source, SourceKind::Live);
        assert_eq!(result.history_source, SourceKind::Synthetic);
        assert!(result.is_synthetic());
    }

    #[test]
    fn test_source_kind_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&SourceKind::Live).unwrap(), "\"live\"");
        assert_eq!(SourceKind::Synthetic.to_string(), "synthetic");
    }
}
