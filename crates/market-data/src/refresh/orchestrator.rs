//! One pass over the watchlist.
//!
//! Symbols are fetched strictly one after another so the executor's call
//! spacing applies across the whole list, which is what keeps a cycle under
//! the provider's per-minute budget. Each result is published as soon as it
//! is ready.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde::Serialize;

use crate::fetcher::QuoteHistoryFetcher;
use crate::models::{SourceKind, Sourced, SymbolResult};
use crate::synthetic::SyntheticDataGenerator;

use super::events::{EventBus, RefreshEvent};
use super::latest::LatestResults;

/// Shown to consumers when a cycle used synthetic data.
pub const DEGRADED_ADVISORY: &str = "Some stock data may be delayed or using estimates";

/// Lifecycle of the orchestrator's current cycle.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CycleState {
    Idle,
    Running,
    Completed,
}

/// Outcome of one cycle.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleSummary {
    pub cycle_id: u64,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    /// True if any symbol used synthetic data
    pub degraded: bool,
    pub advisory: Option<String>,
    /// Symbols published, in publish order
    pub published: Vec<String>,
    pub live: usize,
    pub synthetic: usize,
    /// Symbols whose fetch failed outright and were filled in synthetically
    pub failed: Vec<String>,
}

/// Cycle-scoped bookkeeping, owned by a single `run_cycle` call.
struct RefreshCycle {
    id: u64,
    started_at: DateTime<Utc>,
    seen: HashSet<String>,
    published: Vec<String>,
    live: usize,
    synthetic: usize,
    failed: Vec<String>,
}

impl RefreshCycle {
    fn new(id: u64) -> Self {
        Self {
            id,
            started_at: Utc::now(),
            seen: HashSet::new(),
            published: Vec::new(),
            live: 0,
            synthetic: 0,
            failed: Vec::new(),
        }
    }

    /// Claim `symbol` for this cycle. False if it was already claimed.
    fn claim(&mut self, symbol: &str) -> bool {
        self.seen.insert(symbol.to_string())
    }

    fn record(&mut self, result: &SymbolResult) {
        self.published.push(result.symbol.clone());
        match result.source {
            SourceKind::Live => self.live += 1,
            SourceKind::Synthetic => self.synthetic += 1,
        }
    }

    fn finish(self) -> CycleSummary {
        let degraded = self.synthetic > 0;
        CycleSummary {
            cycle_id: self.id,
            started_at: self.started_at,
            completed_at: Utc::now(),
            degraded,
            advisory: degraded.then(|| DEGRADED_ADVISORY.to_string()),
            published: self.published,
            live: self.live,
            synthetic: self.synthetic,
            failed: self.failed,
        }
    }
}

/// Runs refresh cycles and publishes their results.
pub struct RefreshOrchestrator {
    fetcher: QuoteHistoryFetcher,
    generator: Arc<SyntheticDataGenerator>,
    latest: Arc<LatestResults>,
    events: EventBus,
    next_cycle_id: AtomicU64,
    state: Mutex<CycleState>,
}

impl RefreshOrchestrator {
    pub fn new(
        fetcher: QuoteHistoryFetcher,
        generator: Arc<SyntheticDataGenerator>,
        latest: Arc<LatestResults>,
        events: EventBus,
    ) -> Self {
        Self {
            fetcher,
            generator,
            latest,
            events,
            next_cycle_id: AtomicU64::new(1),
            state: Mutex::new(CycleState::Idle),
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, CycleState> {
        self.state.lock().unwrap_or_else(|poisoned| {
            warn!("Orchestrator state mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    fn set_state(&self, state: CycleState) {
        *self.lock_state() = state;
    }

    pub fn state(&self) -> CycleState {
        *self.lock_state()
    }

    pub fn latest(&self) -> &Arc<LatestResults> {
        &self.latest
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn provider_id(&self) -> &'static str {
        self.fetcher.provider_id()
    }

    /// Fetch every symbol in order, publishing each result before moving on.
    ///
    /// Never fails: a symbol whose fetch errors is filled in with synthetic
    /// data and the cycle is marked degraded.
    pub async fn run_cycle(&self, symbols: &[String]) -> CycleSummary {
        let mut cycle = RefreshCycle::new(self.next_cycle_id.fetch_add(1, Ordering::SeqCst));
        self.set_state(CycleState::Running);

        info!(
            "Refresh cycle {} started for {} symbols",
            cycle.id,
            symbols.len()
        );
        self.events.publish(RefreshEvent::CycleStarted {
            cycle_id: cycle.id,
            started_at: cycle.started_at,
            symbol_count: symbols.len(),
        });

        for symbol in symbols {
            if !cycle.claim(symbol) {
                debug!("Symbol {} listed twice, skipping duplicate", symbol);
                continue;
            }

            let result = match self.fetcher.fetch(symbol).await {
                Ok(result) => result,
                Err(e) => {
                    warn!(
                        "Fetch failed for {} in cycle {}: {}. Using synthetic data",
                        symbol, cycle.id, e
                    );
                    cycle.failed.push(symbol.clone());
                    self.synthetic_result(symbol)
                }
            };

            cycle.record(&result);
            self.publish(cycle.id, result);
        }

        let summary = cycle.finish();
        self.latest.mark_updated(summary.completed_at);
        self.set_state(CycleState::Completed);

        if summary.degraded {
            warn!(
                "Refresh cycle {} completed degraded: {} live, {} synthetic",
                summary.cycle_id, summary.live, summary.synthetic
            );
        } else {
            info!(
                "Refresh cycle {} completed: {} live",
                summary.cycle_id, summary.live
            );
        }

        self.events
            .publish(RefreshEvent::CycleCompleted(summary.clone()));
        summary
    }

    fn synthetic_result(&self, symbol: &str) -> SymbolResult {
        SymbolResult::new(
            symbol,
            Sourced::synthetic(self.generator.generate_quote(symbol)),
            Sourced::synthetic(self.generator.generate_history(symbol)),
        )
    }

    fn publish(&self, cycle_id: u64, result: SymbolResult) {
        let result = Arc::new(result);
        self.latest.upsert(result.clone());
        self.events
            .publish(RefreshEvent::SymbolUpdated { cycle_id, result });
    }
}
