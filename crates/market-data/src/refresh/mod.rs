//! Refresh cycles: orchestration, scheduling and the consumer-facing outputs.
//!
//! - `orchestrator` - one sequential pass over the watchlist
//! - `scheduler` - periodic firing with overlap protection
//! - `events` - broadcast of cycle progress
//! - `latest` - most recent result per symbol

mod events;
mod latest;
mod orchestrator;
mod scheduler;

pub use events::{EventBus, RefreshEvent, DEFAULT_EVENT_CAPACITY};
pub use latest::{LatestResults, SortKey, WatchlistQuery};
pub use orchestrator::{CycleState, CycleSummary, RefreshOrchestrator, DEGRADED_ADVISORY};
pub use scheduler::{RefreshScheduler, TriggerSource, MIN_REFRESH_INTERVAL};
