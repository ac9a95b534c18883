use std::sync::Arc;

use futures::StreamExt;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tracing::{debug, info, warn};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};
use watchlist_market_data::{
    AlphaVantageProvider, EventBus, LatestResults, QuoteProvider, RefreshEvent,
    RefreshOrchestrator, RefreshScheduler, WatchlistQuery, DEFAULT_EVENT_CAPACITY,
};

use crate::config::{Config, LogFormat};
use crate::console::render_table;

/// Everything the daemon needs to run and observe refresh cycles.
pub struct Pipeline {
    pub latest: Arc<LatestResults>,
    pub events: EventBus,
    pub orchestrator: Arc<RefreshOrchestrator>,
    pub scheduler: RefreshScheduler,
}

pub fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_current_span(false))
            .init(),
        LogFormat::Text => registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init(),
    }
}

pub fn build_pipeline(config: &Config) -> Pipeline {
    let api_key = match &config.api_key {
        Some(key) => key.clone(),
        None => {
            warn!("WATCHLIST_ALPHA_VANTAGE_API_KEY is not set; serving synthetic data only");
            String::new()
        }
    };

    let provider: Arc<dyn QuoteProvider> = Arc::new(
        AlphaVantageProvider::with_timeout(api_key, config.request_timeout)
            .with_exchange_suffix(config.exchange_suffix.clone()),
    );

    let latest = Arc::new(LatestResults::new());
    let events = EventBus::new(DEFAULT_EVENT_CAPACITY);
    let orchestrator = Arc::new(config.refresh.build_orchestrator(
        provider,
        latest.clone(),
        events.clone(),
    ));
    let scheduler = RefreshScheduler::new(orchestrator.clone(), config.refresh.symbols.clone());

    info!(
        "Watchlist pipeline ready: {} symbols via {}",
        config.refresh.symbols.len(),
        orchestrator.provider_id()
    );

    Pipeline {
        latest,
        events,
        orchestrator,
        scheduler,
    }
}

/// Log refresh progress as it is broadcast and print the watchlist after
/// each completed cycle.
pub fn spawn_event_logger(pipeline: &Pipeline) -> JoinHandle<()> {
    let mut stream = BroadcastStream::new(pipeline.events.subscribe());
    let latest = pipeline.latest.clone();

    tokio::spawn(async move {
        while let Some(item) = stream.next().await {
            match item {
                Ok(event) => {
                    log_event(&event);
                    if matches!(event, RefreshEvent::CycleCompleted(_)) {
                        let results = latest.query(&WatchlistQuery::default());
                        print!("{}", render_table(&results, latest.last_updated()));
                    }
                }
                Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                    warn!("Event logger lagged, skipped {} events", skipped);
                }
            }
        }
        debug!("Event logger stopped");
    })
}

fn log_event(event: &RefreshEvent) {
    let cycle_id = event.cycle_id();
    match event {
        RefreshEvent::CycleStarted { symbol_count, .. } => {
            info!(cycle_id, symbol_count, "Refresh cycle started")
        }
        RefreshEvent::SymbolUpdated { result, .. } => info!(
            cycle_id,
            symbol = %result.symbol,
            price = %result.quote.current_price,
            change_percent = %result.quote.change_percent,
            source = %result.source,
            "Symbol updated"
        ),
        RefreshEvent::CycleCompleted(summary) => {
            let payload = serde_json::to_string(summary).unwrap_or_default();
            if let Some(advisory) = &summary.advisory {
                warn!(cycle_id, summary = %payload, "{}", advisory);
            } else {
                info!(cycle_id, summary = %payload, "Refresh cycle completed");
            }
        }
    }
}
