//! Engine snapshot tests
//!
//! A snapshot is an owned, serializable copy: later ticks never change it and
//! it round-trips through JSON unchanged.

use parking_simulator_core_rs::garage::ParkingGarage;
use parking_simulator_core_rs::ledger::{Finances, PricingConfig};
use parking_simulator_core_rs::{config_fingerprint, Engine, EngineSnapshot, SimulationConfig};

fn run_engine(config: SimulationConfig, ticks: usize) -> Engine<ParkingGarage, Finances> {
    let mut engine = Engine::new(
        config,
        ParkingGarage::new(1, 2, 10),
        Finances::new(PricingConfig::default()),
    )
    .unwrap();
    for _ in 0..ticks {
        engine.tick().unwrap();
    }
    engine
}

#[test]
fn test_snapshot_reflects_engine() {
    let engine = run_engine(SimulationConfig::default(), 500);
    let snapshot = engine.snapshot().unwrap();

    assert_eq!(snapshot.clock.tick, 500);
    assert_eq!(snapshot.capacity, 20);
    assert_eq!(snapshot.entrance_queue, engine.entrance_queue().snapshot());
    assert_eq!(snapshot.payment_queue.len(), engine.payment_queue().size());
    assert_eq!(snapshot.exit_queue.len(), engine.exit_queue().size());
    assert_eq!(&snapshot.totals, engine.totals());
    assert_eq!(snapshot.cars_in_system(), engine.cars_in_system());
    assert!(snapshot.validate().is_ok());
}

#[test]
fn test_snapshot_detached_from_later_ticks() {
    let mut engine = run_engine(SimulationConfig::default(), 100);
    let snapshot = engine.snapshot().unwrap();
    let copy = snapshot.clone();

    for _ in 0..100 {
        engine.tick().unwrap();
    }

    assert_eq!(snapshot, copy);
    assert_eq!(snapshot.clock.tick, 100);
}

#[test]
fn test_snapshot_carries_config_fingerprint() {
    let config = SimulationConfig {
        rng_seed: 99,
        ..Default::default()
    };
    let engine = run_engine(config.clone(), 10);
    let snapshot = engine.snapshot().unwrap();

    assert_eq!(snapshot.config_hash, config_fingerprint(&config).unwrap());
    assert_ne!(
        snapshot.config_hash,
        config_fingerprint(&SimulationConfig::default()).unwrap()
    );
}

#[test]
fn test_same_seed_same_snapshot() {
    let a = run_engine(SimulationConfig::default(), 2_000).snapshot().unwrap();
    let b = run_engine(SimulationConfig::default(), 2_000).snapshot().unwrap();

    assert_eq!(a, b);
}

#[test]
fn test_snapshot_json_round_trip() {
    let snapshot = run_engine(SimulationConfig::default(), 300).snapshot().unwrap();

    let json = snapshot.to_json().unwrap();
    let restored = EngineSnapshot::from_json(&json).unwrap();

    assert_eq!(restored, snapshot);
}

#[test]
fn test_malformed_json_rejected() {
    assert!(EngineSnapshot::from_json("{\"clock\": 3}").is_err());
}
