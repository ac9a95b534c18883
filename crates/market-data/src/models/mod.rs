//! Market data models
//!
//! - `quote` - Normalized quote snapshot (Quote)
//! - `history` - Daily price history (HistoryPoint, HistorySeries)
//! - `raw` - Provider records before normalization (RawQuote, RawHistoryPoint)
//! - `result` - Published per-symbol unit (SymbolResult, SourceKind, Sourced)

mod history;
mod quote;
mod raw;
mod result;

pub use history::{HistoryPoint, HistorySeries, HISTORY_WINDOW};
pub use quote::Quote;
pub use raw::{RawHistoryPoint, RawQuote};
pub use result::{SourceKind, Sourced, SymbolResult};
