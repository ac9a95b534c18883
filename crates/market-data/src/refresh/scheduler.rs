//! Periodic refresh scheduler.
//!
//! A single worker task runs cycles; a timer task and manual refresh requests
//! only hand it triggers. A trigger is accepted only while no cycle is in
//! flight, so a tick that lands during a running cycle is dropped instead of
//! queued.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use log::{debug, info, warn};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

use super::orchestrator::RefreshOrchestrator;

/// Shortest interval the timer accepts; smaller values are raised to it.
pub const MIN_REFRESH_INTERVAL: Duration = Duration::from_secs(1);

/// What asked for a cycle.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TriggerSource {
    Timer,
    Manual,
}

/// Admits at most one cycle at a time.
#[derive(Debug, Default)]
struct CycleGate {
    in_flight: AtomicBool,
}

impl CycleGate {
    fn try_acquire(&self) -> bool {
        self.in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    fn release(&self) {
        self.in_flight.store(false, Ordering::SeqCst);
    }

    fn is_held(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }
}

#[derive(Default)]
struct Tasks {
    trigger: Option<mpsc::Sender<TriggerSource>>,
    worker: Option<JoinHandle<()>>,
    timer: Option<JoinHandle<()>>,
}

/// Fires the orchestrator immediately on start and then on a fixed interval.
pub struct RefreshScheduler {
    orchestrator: Arc<RefreshOrchestrator>,
    symbols: Arc<[String]>,
    gate: Arc<CycleGate>,
    shutdown: watch::Sender<bool>,
    tasks: Mutex<Tasks>,
}

impl RefreshScheduler {
    pub fn new(orchestrator: Arc<RefreshOrchestrator>, symbols: Vec<String>) -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            orchestrator,
            symbols: symbols.into(),
            gate: Arc::new(CycleGate::default()),
            shutdown,
            tasks: Mutex::new(Tasks::default()),
        }
    }

    fn lock_tasks(&self) -> MutexGuard<'_, Tasks> {
        self.tasks.lock().unwrap_or_else(|poisoned| {
            warn!("Scheduler task mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Start the worker and the timer. The first tick fires immediately.
    ///
    /// Calling `start` on a running scheduler does nothing. An interval below
    /// [`MIN_REFRESH_INTERVAL`] is raised to it.
    pub fn start(&self, every: Duration) {
        let mut tasks = self.lock_tasks();
        if tasks.worker.is_some() {
            warn!("Refresh scheduler already started");
            return;
        }

        let every = if every < MIN_REFRESH_INTERVAL {
            warn!(
                "Refresh interval {:?} too short, using {:?}",
                every, MIN_REFRESH_INTERVAL
            );
            MIN_REFRESH_INTERVAL
        } else {
            every
        };

        // Capacity 1 is enough: the gate admits a single pending trigger.
        let (trigger_tx, trigger_rx) = mpsc::channel(1);

        tasks.worker = Some(tokio::spawn(run_worker(
            self.orchestrator.clone(),
            self.symbols.clone(),
            self.gate.clone(),
            trigger_rx,
        )));
        tasks.timer = Some(tokio::spawn(run_timer(
            every,
            self.gate.clone(),
            trigger_tx.clone(),
            self.shutdown.subscribe(),
        )));
        tasks.trigger = Some(trigger_tx);

        info!(
            "Refresh scheduler started ({} symbols, every {:?})",
            self.symbols.len(),
            every
        );
    }

    /// Run a cycle now unless one is already in flight.
    ///
    /// Returns false when the request was dropped.
    pub fn refresh_now(&self) -> bool {
        let tasks = self.lock_tasks();
        match &tasks.trigger {
            Some(trigger) => fire(&self.gate, trigger, TriggerSource::Manual),
            None => {
                debug!("Manual refresh ignored: scheduler not running");
                false
            }
        }
    }

    pub fn is_cycle_in_flight(&self) -> bool {
        self.gate.is_held()
    }

    /// Stop future firings. A cycle already in flight runs to completion.
    pub fn stop(&self) {
        let _ = self.shutdown.send(true);
        let mut tasks = self.lock_tasks();
        // Dropping the last sender lets the worker exit once it is idle.
        tasks.trigger = None;
        info!("Refresh scheduler stopping");
    }

    /// Wait for the timer and worker to exit. Call after [`stop`](Self::stop).
    pub async fn join(&self) {
        let (timer, worker) = {
            let mut tasks = self.lock_tasks();
            (tasks.timer.take(), tasks.worker.take())
        };

        for handle in [timer, worker].into_iter().flatten() {
            if let Err(e) = handle.await {
                warn!("Refresh scheduler task ended abnormally: {}", e);
            }
        }
    }
}

/// Hand a trigger to the worker if the gate admits it.
fn fire(gate: &CycleGate, trigger: &mpsc::Sender<TriggerSource>, source: TriggerSource) -> bool {
    if !gate.try_acquire() {
        debug!("{:?} refresh skipped: cycle already in flight", source);
        return false;
    }

    match trigger.try_send(source) {
        Ok(()) => true,
        Err(e) => {
            debug!("{:?} refresh dropped: {}", source, e);
            gate.release();
            false
        }
    }
}

async fn run_timer(
    every: Duration,
    gate: Arc<CycleGate>,
    trigger: mpsc::Sender<TriggerSource>,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut ticker = interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                fire(&gate, &trigger, TriggerSource::Timer);
            }
            _ = shutdown.changed() => break,
        }
    }

    debug!("Refresh timer stopped");
}

async fn run_worker(
    orchestrator: Arc<RefreshOrchestrator>,
    symbols: Arc<[String]>,
    gate: Arc<CycleGate>,
    mut triggers: mpsc::Receiver<TriggerSource>,
) {
    while let Some(source) = triggers.recv().await {
        debug!("Refresh cycle triggered by {:?}", source);
        orchestrator.run_cycle(&symbols).await;
        gate.release();
    }

    debug!("Refresh worker stopped");
}
