//! Tick scheduler - drives an engine from a background worker
//!
//! The engine itself is synchronous. The scheduler owns a worker thread that
//! repeatedly calls `Engine::tick`, pausing between steps, until the requested
//! number of steps has run or the run is cancelled.
//!
//! ```text
//! Idle --start--> Running --(all steps done | cancel | error)--> Stopped
//!                    ^                                              |
//!                    +------------------- start --------------------+
//! ```
//!
//! # Critical Invariants
//!
//! - At most one worker drives a given engine at any time
//! - Cancellation is cooperative: it takes effect at the next step boundary
//!   and wakes a sleeping pacer immediately
//! - The worker re-checks cancellation after taking the engine lock, so no
//!   step starts once `cancel` has returned
//! - Listeners run on the worker thread, while the engine lock is held
//!
//! # Example
//!
//! ```rust
//! use parking_simulator_core_rs::garage::ParkingGarage;
//! use parking_simulator_core_rs::ledger::{Finances, PricingConfig};
//! use parking_simulator_core_rs::scheduler::{ImmediatePacer, SchedulerState, TickScheduler};
//! use parking_simulator_core_rs::{Engine, SimulationConfig};
//!
//! let engine = Engine::new(
//!     SimulationConfig::default(),
//!     ParkingGarage::new(1, 2, 10),
//!     Finances::new(PricingConfig::default()),
//! )
//! .unwrap();
//!
//! let mut scheduler = TickScheduler::with_pacer(engine, ImmediatePacer);
//! scheduler.start(100, std::time::Duration::ZERO).unwrap();
//! scheduler.wait().unwrap();
//!
//! assert_eq!(scheduler.state(), SchedulerState::Stopped);
//! assert_eq!(scheduler.completed_steps(), 100);
//! ```

use crate::garage::GarageOps;
use crate::ledger::Ledger;
use crate::orchestrator::{Engine, SimulationError};
use parking_lot::{Condvar, Mutex};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Pause between steps when none is given
pub const DEFAULT_STEP_INTERVAL: Duration = Duration::from_millis(1);

// ============================================================================
// Errors and State
// ============================================================================

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SchedulerError {
    #[error("Simulation step failed: {0}")]
    Simulation(#[from] SimulationError),

    #[error("Simulation step panicked")]
    WorkerPanicked,

    #[error("Failed to spawn worker thread: {0}")]
    Spawn(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// Never started
    Idle,
    Running,
    /// Finished, cancelled, or failed
    Stopped,
}

// ============================================================================
// Cancellation
// ============================================================================

/// Cooperative cancellation flag shared with a worker
///
/// Cloning yields a handle to the same flag, so a listener can stop the run
/// it is called from.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        let (flag, signal) = &*self.inner;
        *flag.lock() = true;
        signal.notify_all();
    }

    pub fn is_cancelled(&self) -> bool {
        *self.inner.0.lock()
    }

    /// Sleep for up to `timeout`, returning early on cancellation
    ///
    /// Returns true if the token is cancelled.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let (flag, signal) = &*self.inner;
        let deadline = Instant::now() + timeout;
        let mut cancelled = flag.lock();

        while !*cancelled {
            if signal.wait_until(&mut cancelled, deadline).timed_out() {
                break;
            }
        }

        *cancelled
    }
}

// ============================================================================
// Pacing
// ============================================================================

/// Decides how long the worker waits between two steps
pub trait Pacer: Clone + Send + 'static {
    fn pace(&mut self, interval: Duration, cancel: &CancelToken);
}

/// Sleeps for the full interval (interrupted by cancellation)
#[derive(Debug, Clone, Copy, Default)]
pub struct WallClockPacer;

impl Pacer for WallClockPacer {
    fn pace(&mut self, interval: Duration, cancel: &CancelToken) {
        if !interval.is_zero() {
            cancel.wait_timeout(interval);
        }
    }
}

/// Never waits; for tests and batch runs
#[derive(Debug, Clone, Copy, Default)]
pub struct ImmediatePacer;

impl Pacer for ImmediatePacer {
    fn pace(&mut self, _interval: Duration, _cancel: &CancelToken) {}
}

// ============================================================================
// Scheduler
// ============================================================================

#[derive(Debug)]
struct RunStatus {
    state: SchedulerState,
    completed: u64,
    error: Option<SchedulerError>,
}

/// One call to `start` and everything the worker reports back
struct ActiveRun {
    token: CancelToken,
    status: Arc<Mutex<RunStatus>>,
    handle: Option<JoinHandle<()>>,
}

/// Runs an engine on a background thread
pub struct TickScheduler<G, L, P = WallClockPacer>
where
    G: GarageOps + 'static,
    L: Ledger + 'static,
    P: Pacer,
{
    engine: Arc<Mutex<Engine<G, L>>>,
    pacer: P,
    run: Option<ActiveRun>,
}

impl<G, L> TickScheduler<G, L, WallClockPacer>
where
    G: GarageOps + 'static,
    L: Ledger + 'static,
{
    pub fn new(engine: Engine<G, L>) -> Self {
        Self::with_pacer(engine, WallClockPacer)
    }
}

impl<G, L, P> TickScheduler<G, L, P>
where
    G: GarageOps + 'static,
    L: Ledger + 'static,
    P: Pacer,
{
    pub fn with_pacer(engine: Engine<G, L>, pacer: P) -> Self {
        Self::from_shared(Arc::new(Mutex::new(engine)), pacer)
    }

    /// Drive an engine that other threads also hold
    pub fn from_shared(engine: Arc<Mutex<Engine<G, L>>>, pacer: P) -> Self {
        Self {
            engine,
            pacer,
            run: None,
        }
    }

    /// Shared handle to the engine, e.g. for taking snapshots while running
    pub fn engine(&self) -> Arc<Mutex<Engine<G, L>>> {
        Arc::clone(&self.engine)
    }

    /// Start a run of `total_steps` steps, `interval` apart
    ///
    /// A run already in progress is cancelled and joined first, so only one
    /// worker ever drives the engine. Zero steps stops at once.
    pub fn start(&mut self, total_steps: u64, interval: Duration) -> Result<(), SchedulerError> {
        self.start_with_token(total_steps, interval, CancelToken::new())
    }

    /// Start a run that stops when `token` is cancelled
    ///
    /// Lets code created before the run (a listener, another thread) hold the
    /// token that stops it.
    pub fn start_with_token(
        &mut self,
        total_steps: u64,
        interval: Duration,
        token: CancelToken,
    ) -> Result<(), SchedulerError> {
        self.shutdown_worker();

        let status = Arc::new(Mutex::new(RunStatus {
            state: SchedulerState::Running,
            completed: 0,
            error: None,
        }));

        if total_steps == 0 {
            status.lock().state = SchedulerState::Stopped;
            self.run = Some(ActiveRun {
                token,
                status,
                handle: None,
            });
            return Ok(());
        }

        let worker = Worker {
            engine: Arc::clone(&self.engine),
            pacer: self.pacer.clone(),
            token: token.clone(),
            status: Arc::clone(&status),
            total_steps,
            interval,
        };

        let handle = thread::Builder::new()
            .name("tick-scheduler".to_string())
            .spawn(move || worker.run())
            .map_err(|e| SchedulerError::Spawn(e.to_string()))?;

        info!(total_steps, interval_ms = interval.as_millis() as u64, "scheduler started");

        self.run = Some(ActiveRun {
            token,
            status,
            handle: Some(handle),
        });
        Ok(())
    }

    /// Start with the default 1 ms pause between steps
    pub fn start_default(&mut self, total_steps: u64) -> Result<(), SchedulerError> {
        self.start(total_steps, DEFAULT_STEP_INTERVAL)
    }

    /// Request cancellation; no new step starts once this returns
    ///
    /// A step already executing completes. No-op when not running.
    pub fn cancel(&self) {
        if let Some(run) = &self.run {
            run.token.cancel();
            let mut status = run.status.lock();
            if status.state == SchedulerState::Running {
                status.state = SchedulerState::Stopped;
                debug!(completed = status.completed, "scheduler cancelled");
            }
        }
    }

    /// Token that cancels the current run, if any
    pub fn cancel_token(&self) -> Option<CancelToken> {
        self.run.as_ref().map(|run| run.token.clone())
    }

    /// Block until the current run's worker has exited
    ///
    /// Returns the error that stopped the run, if one did.
    pub fn wait(&mut self) -> Result<(), SchedulerError> {
        let Some(run) = self.run.as_mut() else {
            return Ok(());
        };

        if let Some(handle) = run.handle.take() {
            if handle.join().is_err() {
                let mut status = run.status.lock();
                status.state = SchedulerState::Stopped;
                status.error.get_or_insert(SchedulerError::WorkerPanicked);
            }
        }

        match run.status.lock().error.clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    pub fn state(&self) -> SchedulerState {
        let Some(run) = &self.run else {
            return SchedulerState::Idle;
        };

        let state = run.status.lock().state;
        let worker_gone = run
            .handle
            .as_ref()
            .map_or(true, |handle| handle.is_finished());

        // a worker that died outside a step never reports back
        if state == SchedulerState::Running && worker_gone {
            SchedulerState::Stopped
        } else {
            state
        }
    }

    /// Steps completed by the current run
    pub fn completed_steps(&self) -> u64 {
        self.run
            .as_ref()
            .map_or(0, |run| run.status.lock().completed)
    }

    /// Error that stopped the current run
    pub fn last_error(&self) -> Option<SchedulerError> {
        self.run
            .as_ref()
            .and_then(|run| run.status.lock().error.clone())
    }

    fn shutdown_worker(&mut self) {
        if let Some(mut run) = self.run.take() {
            run.token.cancel();
            if let Some(handle) = run.handle.take() {
                if handle.join().is_err() {
                    warn!("previous scheduler worker panicked");
                }
            }
        }
    }
}

impl<G, L, P> Drop for TickScheduler<G, L, P>
where
    G: GarageOps + 'static,
    L: Ledger + 'static,
    P: Pacer,
{
    fn drop(&mut self) {
        self.shutdown_worker();
    }
}

impl<G, L, P> std::fmt::Debug for TickScheduler<G, L, P>
where
    G: GarageOps + 'static,
    L: Ledger + 'static,
    P: Pacer,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TickScheduler")
            .field("state", &self.state())
            .field("completed_steps", &self.completed_steps())
            .finish()
    }
}

// ============================================================================
// Worker
// ============================================================================

struct Worker<G: GarageOps, L: Ledger, P: Pacer> {
    engine: Arc<Mutex<Engine<G, L>>>,
    pacer: P,
    token: CancelToken,
    status: Arc<Mutex<RunStatus>>,
    total_steps: u64,
    interval: Duration,
}

impl<G: GarageOps, L: Ledger, P: Pacer> Worker<G, L, P> {
    fn run(mut self) {
        while !self.token.is_cancelled() {
            let mut engine = self.engine.lock();

            // cancelled while waiting for the lock
            if self.token.is_cancelled() {
                break;
            }

            let step = match panic::catch_unwind(AssertUnwindSafe(|| engine.tick())) {
                Ok(Ok(_)) => Ok(()),
                Ok(Err(err)) => {
                    error!(error = %err, "scheduler stopped by failed step");
                    Err(SchedulerError::from(err))
                }
                Err(payload) => {
                    error!(panic = panic_message(payload.as_ref()), "simulation step panicked");
                    Err(SchedulerError::WorkerPanicked)
                }
            };

            if let Err(err) = step {
                self.status.lock().error = Some(err);
                break;
            }

            // counted under the engine lock so the tick and the count agree
            let completed = {
                let mut status = self.status.lock();
                status.completed += 1;
                status.completed
            };
            drop(engine);

            if completed >= self.total_steps {
                break;
            }

            self.pacer.pace(self.interval, &self.token);
        }

        let mut status = self.status.lock();
        status.state = SchedulerState::Stopped;
        info!(completed = status.completed, "scheduler stopped");
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "non-string panic payload"
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_clones_share_flag() {
        let token = CancelToken::new();
        let other = token.clone();
        assert!(!other.is_cancelled());

        token.cancel();
        assert!(other.is_cancelled());
    }

    #[test]
    fn test_wait_timeout_returns_early_when_cancelled() {
        let token = CancelToken::new();
        token.cancel();

        let started = Instant::now();
        assert!(token.wait_timeout(Duration::from_secs(10)));
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn test_wait_timeout_expires() {
        let token = CancelToken::new();
        assert!(!token.wait_timeout(Duration::from_millis(5)));
    }

    #[test]
    fn test_cancel_wakes_sleeping_waiter() {
        let token = CancelToken::new();
        let waiter = token.clone();

        let handle = thread::spawn(move || {
            let started = Instant::now();
            let cancelled = waiter.wait_timeout(Duration::from_secs(30));
            (cancelled, started.elapsed())
        });

        thread::sleep(Duration::from_millis(20));
        token.cancel();

        let (cancelled, elapsed) = handle.join().unwrap();
        assert!(cancelled);
        assert!(elapsed < Duration::from_secs(5));
    }
}
