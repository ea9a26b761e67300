//! Scheduler tests
//!
//! The scheduler drives the engine from a worker thread; these tests check
//! step counts, cancellation (from outside and from a listener), restart and
//! failure reporting.

use parking_simulator_core_rs::garage::ParkingGarage;
use parking_simulator_core_rs::ledger::{Finances, PricingConfig};
use parking_simulator_core_rs::scheduler::{
    CancelToken, ImmediatePacer, Pacer, SchedulerError, SchedulerState, TickScheduler,
};
use parking_simulator_core_rs::{Engine, SimulationConfig};
use std::thread;
use std::time::{Duration, Instant};

// ============================================================================
// Test Helpers
// ============================================================================

fn engine() -> Engine<ParkingGarage, Finances> {
    Engine::new(
        SimulationConfig::default(),
        ParkingGarage::new(2, 3, 10),
        Finances::new(PricingConfig::default()),
    )
    .unwrap()
}

fn engine_tick<P: Pacer>(scheduler: &TickScheduler<ParkingGarage, Finances, P>) -> u64 {
    scheduler.engine().lock().current_tick()
}

/// Poll until `condition` holds or a generous deadline passes
fn wait_until(condition: impl Fn() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(10);
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(1));
    }
    false
}

// ============================================================================
// Runs to Completion
// ============================================================================

#[test]
fn test_new_scheduler_is_idle() {
    let scheduler = TickScheduler::new(engine());
    assert_eq!(scheduler.state(), SchedulerState::Idle);
    assert_eq!(scheduler.completed_steps(), 0);
    assert!(scheduler.last_error().is_none());
    assert!(scheduler.cancel_token().is_none());
}

#[test]
fn test_runs_requested_number_of_steps() {
    let mut scheduler = TickScheduler::with_pacer(engine(), ImmediatePacer);

    scheduler.start(100, Duration::ZERO).unwrap();
    scheduler.wait().unwrap();

    assert_eq!(scheduler.state(), SchedulerState::Stopped);
    assert_eq!(scheduler.completed_steps(), 100);
    assert_eq!(engine_tick(&scheduler), 100);
}

#[test]
fn test_default_pacing_completes() {
    let mut scheduler = TickScheduler::new(engine());

    scheduler.start_default(20).unwrap();
    scheduler.wait().unwrap();

    assert_eq!(scheduler.completed_steps(), 20);
    assert_eq!(scheduler.state(), SchedulerState::Stopped);
}

#[test]
fn test_zero_steps_stops_immediately() {
    let mut scheduler = TickScheduler::with_pacer(engine(), ImmediatePacer);

    scheduler.start(0, Duration::ZERO).unwrap();

    assert_eq!(scheduler.state(), SchedulerState::Stopped);
    scheduler.wait().unwrap();
    assert_eq!(engine_tick(&scheduler), 0);
}

#[test]
fn test_channel_receives_every_step() {
    let mut engine = engine();
    let rx = engine.subscribe_channel();
    let mut scheduler = TickScheduler::with_pacer(engine, ImmediatePacer);

    scheduler.start(50, Duration::ZERO).unwrap();
    scheduler.wait().unwrap();

    let ticks: Vec<u64> = rx.try_iter().map(|result| result.tick).collect();
    assert_eq!(ticks, (1..=50).collect::<Vec<u64>>());
}

// ============================================================================
// Cancellation
// ============================================================================

#[test]
fn test_listener_cancel_stops_after_current_step() {
    let token = CancelToken::new();
    let mut engine = engine();
    let stop = token.clone();
    engine.subscribe(Box::new(move |tick: u64| {
        if tick == 5 {
            stop.cancel();
        }
    }));

    let mut scheduler = TickScheduler::with_pacer(engine, ImmediatePacer);
    scheduler
        .start_with_token(1_000, Duration::ZERO, token)
        .unwrap();
    scheduler.wait().unwrap();

    assert_eq!(scheduler.completed_steps(), 5);
    assert_eq!(engine_tick(&scheduler), 5);
    assert_eq!(scheduler.state(), SchedulerState::Stopped);
}

#[test]
fn test_cancel_wakes_sleeping_worker() {
    let mut scheduler = TickScheduler::new(engine());

    // one step, then a minute-long pause
    scheduler.start(1_000, Duration::from_secs(60)).unwrap();
    assert!(wait_until(|| scheduler.completed_steps() >= 1));

    let cancelled_at = Instant::now();
    scheduler.cancel();
    assert_eq!(scheduler.state(), SchedulerState::Stopped);
    scheduler.wait().unwrap();

    assert!(cancelled_at.elapsed() < Duration::from_secs(5));
    assert_eq!(scheduler.completed_steps(), 1);
}

#[test]
fn test_cancel_when_idle_is_noop() {
    let scheduler = TickScheduler::new(engine());
    scheduler.cancel();
    assert_eq!(scheduler.state(), SchedulerState::Idle);
}

#[test]
fn test_no_steps_after_cancel_returns() {
    let mut scheduler = TickScheduler::new(engine());
    scheduler.start(1_000_000, Duration::from_millis(1)).unwrap();
    assert!(wait_until(|| scheduler.completed_steps() >= 3));

    scheduler.cancel();
    scheduler.wait().unwrap();
    let completed = scheduler.completed_steps();

    thread::sleep(Duration::from_millis(20));
    assert_eq!(scheduler.completed_steps(), completed);
    assert_eq!(engine_tick(&scheduler), completed);
}

#[test]
fn test_outside_cancel_freezes_run() {
    let mut scheduler = TickScheduler::new(engine());
    scheduler.start(100, Duration::from_millis(2)).unwrap();
    assert!(wait_until(|| scheduler.completed_steps() >= 5));

    // holding the engine lock, no step is half done
    let (tick, completed) = {
        let engine = scheduler.engine();
        let engine = engine.lock();
        scheduler.cancel();
        (engine.current_tick(), scheduler.completed_steps())
    };
    assert_eq!(scheduler.state(), SchedulerState::Stopped);
    assert_eq!(tick, completed);

    // far longer than the remaining steps would take
    thread::sleep(Duration::from_millis(500));
    scheduler.wait().unwrap();

    assert_eq!(engine_tick(&scheduler), tick);
    assert_eq!(scheduler.completed_steps(), completed);
    assert!(completed < 100);
}

#[test]
fn test_cancel_while_worker_waits_for_lock() {
    let mut scheduler = TickScheduler::with_pacer(engine(), ImmediatePacer);
    let engine = scheduler.engine();

    let (tick, completed) = {
        // the worker blocks on this lock before its first or next step
        let guard = engine.lock();
        scheduler.start(1_000_000, Duration::ZERO).unwrap();
        thread::sleep(Duration::from_millis(50));
        scheduler.cancel();
        assert_eq!(scheduler.state(), SchedulerState::Stopped);
        (guard.current_tick(), scheduler.completed_steps())
    };

    thread::sleep(Duration::from_millis(100));
    scheduler.wait().unwrap();

    assert_eq!(engine.lock().current_tick(), tick);
    assert_eq!(scheduler.completed_steps(), completed);
    assert_eq!(completed, 0);
}

// ============================================================================
// Restart
// ============================================================================

#[test]
fn test_restart_after_stop_continues_engine() {
    let mut scheduler = TickScheduler::with_pacer(engine(), ImmediatePacer);

    scheduler.start(10, Duration::ZERO).unwrap();
    scheduler.wait().unwrap();
    scheduler.start(20, Duration::ZERO).unwrap();
    scheduler.wait().unwrap();

    assert_eq!(scheduler.completed_steps(), 20);
    assert_eq!(engine_tick(&scheduler), 30);
}

#[test]
fn test_start_while_running_replaces_run() {
    let mut scheduler = TickScheduler::new(engine());
    scheduler.start(1_000_000, Duration::from_millis(5)).unwrap();
    assert!(wait_until(|| scheduler.completed_steps() >= 1));

    scheduler.start(5, Duration::ZERO).unwrap();
    scheduler.wait().unwrap();

    assert_eq!(scheduler.completed_steps(), 5);
    assert_eq!(scheduler.state(), SchedulerState::Stopped);
    assert!(engine_tick(&scheduler) >= 6);
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn test_panicking_listener_stops_run() {
    let mut engine = engine();
    engine.subscribe(Box::new(|tick: u64| {
        if tick == 3 {
            panic!("listener failure at tick {}", tick);
        }
    }));

    let mut scheduler = TickScheduler::with_pacer(engine, ImmediatePacer);
    scheduler.start(100, Duration::ZERO).unwrap();

    assert_eq!(scheduler.wait(), Err(SchedulerError::WorkerPanicked));
    assert_eq!(scheduler.last_error(), Some(SchedulerError::WorkerPanicked));
    assert_eq!(scheduler.state(), SchedulerState::Stopped);
    assert_eq!(scheduler.completed_steps(), 2);
    assert_eq!(engine_tick(&scheduler), 3);

    // the engine stays usable for the next run
    scheduler.start(10, Duration::ZERO).unwrap();
    scheduler.wait().unwrap();
    assert!(scheduler.last_error().is_none());
    assert_eq!(scheduler.completed_steps(), 10);
    assert_eq!(engine_tick(&scheduler), 13);
}
