//! Periodic refresh of the dashboard data.
//!
//! A [`RefreshController`] owns the current [`RefreshState`] and publishes
//! every change through a [`tokio::sync::watch`] channel. The first cycle
//! runs with the loading flag raised; later cycles refresh in the background
//! and keep the previous dataset visible while they run.
//!
//! # Example
//!
//! ```no_run
//! use sheet_dashboard::{config, RefreshController, SheetFetcher};
//!
//! #[tokio::main]
//! async fn main() -> sheet_dashboard::Result<()> {
//!     let fetcher = SheetFetcher::new(config::SHEET_CSV_URL, config::DEFAULT_TIMEOUT)?;
//!     let mut controller = RefreshController::new(fetcher, config::REFRESH_INTERVAL);
//!     let mut updates = controller.subscribe();
//!     controller.start();
//!
//!     while updates.changed().await.is_ok() {
//!         let state = updates.borrow_and_update().clone();
//!         println!("{} rows, error: {:?}", state.dataset.records.len(), state.error);
//!     }
//!     Ok(())
//! }
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::fetcher::DatasetSource;
use crate::models::Dataset;

// ---------------------------------------------------------------------------
// RefreshState
// ---------------------------------------------------------------------------

/// Snapshot published to subscribers after every change.
#[derive(Debug, Clone)]
pub struct RefreshState {
    /// Latest successfully parsed dataset; empty until the first success.
    pub dataset: Arc<Dataset>,
    /// User-facing message from the most recent failed cycle, cleared by the
    /// next success.
    pub error: Option<String>,
    /// Raised only while the initial cycle is in flight.
    pub loading: bool,
    /// Number of completed refresh cycles.
    pub generation: u64,
}

impl Default for RefreshState {
    fn default() -> Self {
        Self {
            dataset: Arc::new(Dataset::empty()),
            error: None,
            loading: true,
            generation: 0,
        }
    }
}

// ---------------------------------------------------------------------------
// RefreshController
// ---------------------------------------------------------------------------

/// Owns the refresh timer and the state it mutates.
///
/// Cycles run one after another on a single task, so fetches never overlap;
/// a fetch slower than the period delays the next tick instead of stacking
/// up. Each publish is checked against the run it belongs to, so nothing is
/// written after [`stop()`](Self::stop).
pub struct RefreshController<S: DatasetSource> {
    source: Arc<S>,
    period: Duration,
    state: Arc<watch::Sender<RefreshState>>,
    run: Arc<AtomicU64>,
    task: Option<JoinHandle<()>>,
}

impl<S: DatasetSource> RefreshController<S> {
    /// Create a stopped controller polling `source` every `period`.
    pub fn new(source: S, period: Duration) -> Self {
        Self::with_shared_source(Arc::new(source), period)
    }

    /// Like [`new()`](Self::new), for a source that is also used elsewhere.
    pub fn with_shared_source(source: Arc<S>, period: Duration) -> Self {
        let (state, _) = watch::channel(RefreshState::default());
        Self {
            source,
            // tokio intervals reject a zero period
            period: period.max(Duration::from_millis(1)),
            state: Arc::new(state),
            run: Arc::new(AtomicU64::new(0)),
            task: None,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Receive every state change from now on.
    pub fn subscribe(&self) -> watch::Receiver<RefreshState> {
        self.state.subscribe()
    }

    /// Copy of the current state.
    pub fn state(&self) -> RefreshState {
        self.state.borrow().clone()
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Run the initial cycle immediately, then one background cycle per
    /// period until [`stop()`](Self::stop).
    ///
    /// Must be called from within a Tokio runtime. Does nothing if already
    /// running.
    pub fn start(&mut self) {
        if self.is_running() {
            return;
        }
        let run_id = self.run.fetch_add(1, Ordering::SeqCst) + 1;
        info!(period_secs = self.period.as_secs_f64(), "starting refresh controller");
        self.task = Some(tokio::spawn(run_cycles(
            self.source.clone(),
            self.period,
            self.state.clone(),
            self.run.clone(),
            run_id,
        )));
    }

    /// Cancel the timer. A fetch already in flight is abandoned and its
    /// result discarded.
    pub fn stop(&mut self) {
        // Bumped under the channel lock: a publish either lands before this
        // or sees the new run id and backs off.
        self.state.send_if_modified(|_| {
            self.run.fetch_add(1, Ordering::SeqCst);
            false
        });
        if let Some(task) = self.task.take() {
            task.abort();
            info!("refresh controller stopped");
        }
    }
}

impl<S: DatasetSource> Drop for RefreshController<S> {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn run_cycles<S: DatasetSource>(
    source: Arc<S>,
    period: Duration,
    state: Arc<watch::Sender<RefreshState>>,
    run: Arc<AtomicU64>,
    run_id: u64,
) {
    let started = state.send_if_modified(|s| {
        if run.load(Ordering::SeqCst) != run_id {
            return false;
        }
        s.loading = true;
        s.error = None;
        true
    });
    if !started {
        return;
    }
    refresh_cycle(source.as_ref(), &state, &run, run_id, true).await;

    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately; the initial cycle covered it.
    ticker.tick().await;

    loop {
        ticker.tick().await;
        if run.load(Ordering::SeqCst) != run_id {
            break;
        }
        refresh_cycle(source.as_ref(), &state, &run, run_id, false).await;
    }
}

async fn refresh_cycle<S: DatasetSource>(
    source: &S,
    state: &watch::Sender<RefreshState>,
    run: &AtomicU64,
    run_id: u64,
    initial: bool,
) {
    let result = source.fetch_dataset().await;
    if run.load(Ordering::SeqCst) != run_id {
        debug!("discarding refresh result from a stopped run");
        return;
    }

    match &result {
        Ok(dataset) => info!(
            records = dataset.records.len(),
            columns = dataset.column_keys.len(),
            initial,
            "sheet refreshed"
        ),
        Err(e) => warn!(error = %e, initial, "sheet refresh failed; keeping previous data"),
    }

    // Re-checked under the channel lock; see stop().
    let published = state.send_if_modified(move |s| {
        if run.load(Ordering::SeqCst) != run_id {
            return false;
        }
        match result {
            Ok(dataset) => {
                s.dataset = Arc::new(dataset);
                s.error = None;
            }
            Err(e) => s.error = Some(e.user_message()),
        }
        if initial {
            s.loading = false;
        }
        s.generation += 1;
        true
    });
    if !published {
        debug!("controller stopped while publishing; result dropped");
    }
}
