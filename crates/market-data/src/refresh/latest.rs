//! Consumer-side store of the most recent result per symbol.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use log::warn;

use crate::models::SymbolResult;

/// Latest [`SymbolResult`] per symbol.
///
/// Each publish replaces the symbol's entry. Readers may observe a cycle
/// partially applied; there is no cross-symbol atomicity.
#[derive(Debug, Default)]
pub struct LatestResults {
    entries: RwLock<HashMap<String, Arc<SymbolResult>>>,
    last_updated: RwLock<Option<DateTime<Utc>>>,
}

impl LatestResults {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock the entries for reading, recovering from poison if necessary.
    fn read_entries(&self) -> RwLockReadGuard<'_, HashMap<String, Arc<SymbolResult>>> {
        self.entries.read().unwrap_or_else(|poisoned| {
            warn!("Latest results lock was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    fn write_entries(&self) -> RwLockWriteGuard<'_, HashMap<String, Arc<SymbolResult>>> {
        self.entries.write().unwrap_or_else(|poisoned| {
            warn!("Latest results lock was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Replace the entry for `result.symbol`, returning the superseded one.
    pub fn upsert(&self, result: Arc<SymbolResult>) -> Option<Arc<SymbolResult>> {
        let mut entries = self.write_entries();
        let previous = entries.remove(&result.symbol);
        entries.insert(result.symbol.clone(), result);
        previous
    }

    pub fn get(&self, symbol: &str) -> Option<Arc<SymbolResult>> {
        self.read_entries().get(symbol).cloned()
    }

    /// All entries, in no particular order.
    pub fn snapshot(&self) -> Vec<Arc<SymbolResult>> {
        self.read_entries().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.read_entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read_entries().is_empty()
    }

    /// Record the completion time of the last cycle.
    pub fn mark_updated(&self, at: DateTime<Utc>) {
        let mut last_updated = self.last_updated.write().unwrap_or_else(|poisoned| {
            warn!("Latest results lock was poisoned, recovering");
            poisoned.into_inner()
        });
        *last_updated = Some(at);
    }

    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        *self
            .last_updated
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Filtered, sorted view of the current entries.
    pub fn query(&self, query: &WatchlistQuery) -> Vec<Arc<SymbolResult>> {
        let mut results: Vec<_> = self
            .snapshot()
            .into_iter()
            .filter(|result| query.matches(result))
            .collect();
        results.sort_by(|a, b| query.sort.compare(a, b));
        results
    }
}

/// Column a watchlist view is sorted by, always descending.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum SortKey {
    #[default]
    Price,
    Change,
    Volume,
}

impl SortKey {
    fn compare(self, a: &SymbolResult, b: &SymbolResult) -> Ordering {
        let ordering = match self {
            Self::Price => b.quote.current_price.cmp(&a.quote.current_price),
            Self::Change => b.quote.change_percent.cmp(&a.quote.change_percent),
            Self::Volume => b.quote.volume.cmp(&a.quote.volume),
        };
        ordering.then_with(|| a.symbol.cmp(&b.symbol))
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "price" => Ok(Self::Price),
            "change" | "change%" => Ok(Self::Change),
            "volume" => Ok(Self::Volume),
            other => Err(format!("Unknown sort key: {}", other)),
        }
    }
}

/// Search and sort settings for [`LatestResults::query`].
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct WatchlistQuery {
    /// Case-insensitive substring of symbol or display name
    pub search: Option<String>,
    pub sort: SortKey,
}

impl WatchlistQuery {
    pub fn matches(&self, result: &SymbolResult) -> bool {
        match self.search.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(term) => {
                let term = term.to_lowercase();
                result.symbol.to_lowercase().contains(&term)
                    || result.quote.display_name.to_lowercase().contains(&term)
            }
        }
    }
}
