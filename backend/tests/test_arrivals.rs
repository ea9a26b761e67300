//! Arrival generation tests
//!
//! Counts follow the weekly rhythm and the long-run mean matches the
//! configured hourly rate.

use parking_simulator_core_rs::arrivals::{sample_arrival_count, ArrivalGenerator};
use parking_simulator_core_rs::core::time::TICKS_PER_DAY;
use parking_simulator_core_rs::{CarKind, ClockSnapshot, RngManager, RoundingMode, SimulationConfig};

// ============================================================================
// Test Helpers
// ============================================================================

/// Any of the 7200 weekday minutes
fn weekday_clock(i: u64) -> ClockSnapshot {
    ClockSnapshot::at(i % (5 * TICKS_PER_DAY))
}

/// Any of the 2880 weekend minutes
fn weekend_clock(i: u64) -> ClockSnapshot {
    ClockSnapshot::at(5 * TICKS_PER_DAY + i % (2 * TICKS_PER_DAY))
}

fn mean_count(config: &SimulationConfig, clock: fn(u64) -> ClockSnapshot, n: u64) -> f64 {
    let mut rng = RngManager::new(config.rng_seed);
    let total: u64 = (0..n)
        .map(|i| u64::from(sample_arrival_count(&clock(i), config, &mut rng)))
        .sum();
    total as f64 / n as f64
}

// ============================================================================
// Rate Tests
// ============================================================================

#[test]
fn test_weekday_mean_matches_rate() {
    let config = SimulationConfig::default();
    let expected = 50.0 / 60.0;

    let mean = mean_count(&config, weekday_clock, 10_000);

    assert!(
        (mean - expected).abs() < expected * 0.05,
        "weekday mean {} not within 5% of {}",
        mean,
        expected
    );
}

#[test]
fn test_weekend_mean_matches_rate() {
    let config = SimulationConfig::default();
    let expected = 90.0 / 60.0;

    let mean = mean_count(&config, weekend_clock, 10_000);

    assert!(
        (mean - expected).abs() < expected * 0.05,
        "weekend mean {} not within 5% of {}",
        mean,
        expected
    );
}

#[test]
fn test_nearest_rounding_overshoots_low_rates() {
    let config = SimulationConfig {
        arrival_rounding: RoundingMode::Nearest,
        ..Default::default()
    };

    let mean = mean_count(&config, weekday_clock, 2_000);

    // 0.83 per minute rounds to one car almost every minute
    assert!(mean > 0.95, "mean was {}", mean);
}

#[test]
fn test_counts_never_negative_at_zero_rate() {
    let config = SimulationConfig {
        weekday_arrivals: 0.0,
        weekend_arrivals: 0.0,
        ..Default::default()
    };

    assert_eq!(mean_count(&config, weekday_clock, 1_000), 0.0);
    assert_eq!(mean_count(&config, weekend_clock, 1_000), 0.0);
}

// ============================================================================
// Generator Tests
// ============================================================================

#[test]
fn test_same_seed_same_arrivals() {
    let config = SimulationConfig::default();
    let mut gen_a = ArrivalGenerator::new();
    let mut gen_b = ArrivalGenerator::new();
    let mut rng_a = RngManager::new(42);
    let mut rng_b = RngManager::new(42);

    for tick in 0..3_000 {
        let clock = ClockSnapshot::at(tick);
        assert_eq!(
            gen_a.generate(&clock, &config, &mut rng_a),
            gen_b.generate(&clock, &config, &mut rng_b)
        );
    }
    assert_eq!(gen_a.generated_count(), gen_b.generated_count());
}

#[test]
fn test_arrivals_stamped_with_tick_and_unique_ids() {
    let config = SimulationConfig::default();
    let mut generator = ArrivalGenerator::new();
    let mut rng = RngManager::new(7);
    let mut ids = std::collections::HashSet::new();

    for tick in 0..500 {
        for car in generator.generate(&ClockSnapshot::at(tick), &config, &mut rng) {
            assert_eq!(car.entry_tick(), tick);
            assert!(car.location().is_none());
            assert!(!car.is_paying());
            assert!(ids.insert(car.id().to_string()), "duplicate id {}", car.id());
        }
    }
    assert_eq!(ids.len() as u64, generator.generated_count());
}

#[test]
fn test_subscriber_share_respected() {
    let config = SimulationConfig {
        weekday_arrivals: 600.0,
        subscriber_share: 0.25,
        ..Default::default()
    };
    let mut generator = ArrivalGenerator::new();
    let mut rng = RngManager::new(11);

    let mut subscribers = 0usize;
    let mut total = 0usize;
    for tick in 0..1_000 {
        for car in generator.generate(&ClockSnapshot::at(tick), &config, &mut rng) {
            total += 1;
            if car.kind() == CarKind::Subscriber {
                subscribers += 1;
            }
        }
    }

    let share = subscribers as f64 / total as f64;
    assert!((share - 0.25).abs() < 0.03, "share was {}", share);
}
