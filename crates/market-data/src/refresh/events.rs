use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::broadcast;

use crate::models::SymbolResult;

use super::orchestrator::CycleSummary;

/// Default number of buffered events per subscriber.
pub const DEFAULT_EVENT_CAPACITY: usize = 64;

/// Progress of a refresh cycle, pushed to consumers as it happens.
#[derive(Clone, Debug)]
pub enum RefreshEvent {
    CycleStarted {
        cycle_id: u64,
        started_at: DateTime<Utc>,
        symbol_count: usize,
    },
    /// One symbol finished; published before the next symbol is fetched.
    SymbolUpdated {
        cycle_id: u64,
        result: Arc<SymbolResult>,
    },
    CycleCompleted(CycleSummary),
}

impl RefreshEvent {
    pub fn cycle_id(&self) -> u64 {
        match self {
            Self::CycleStarted { cycle_id, .. } | Self::SymbolUpdated { cycle_id, .. } => *cycle_id,
            Self::CycleCompleted(summary) => summary.cycle_id,
        }
    }
}

/// Lightweight broadcast bus that fans out refresh events to any listener.
#[derive(Clone, Debug)]
pub struct EventBus {
    sender: broadcast::Sender<RefreshEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _receiver) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RefreshEvent> {
        self.sender.subscribe()
    }

    pub fn publish(&self, event: RefreshEvent) {
        // Lagging listeners are ignored to avoid blocking producers.
        let _ = self.sender.send(event);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}
