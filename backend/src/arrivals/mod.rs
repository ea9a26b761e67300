//! Arrival generation module for deterministic car creation.
//!
//! Every tick the generator samples how many cars arrive and which kind each
//! one is. All generation is deterministic given the RNG seed.
//!
//! # Key Principles
//!
//! 1. **Determinism**: Same seed + same clock + same config → same arrivals
//! 2. **Weekly rhythm**: Weekday and weekend hourly means differ
//! 3. **Normal per-minute counts**: The per-minute count is drawn from a
//!    normal distribution with a standard deviation of 10% of the mean
//! 4. **Dwell time is not set here**: It only starts once a place is assigned
//!
//! # Example
//!
//! ```
//! use parking_simulator_core_rs::arrivals::ArrivalGenerator;
//! use parking_simulator_core_rs::rng::RngManager;
//! use parking_simulator_core_rs::{SimClock, SimulationConfig};
//!
//! let mut generator = ArrivalGenerator::new();
//! let mut rng = RngManager::new(42);
//! let clock = SimClock::new();
//!
//! let cars = generator.generate(&clock.current(), &SimulationConfig::default(), &mut rng);
//! for car in &cars {
//!     assert_eq!(car.entry_tick(), 0);
//!     assert_eq!(car.minutes_left(), 0);
//! }
//! ```

use crate::core::time::{ClockSnapshot, TICKS_PER_HOUR};
use crate::models::{Car, CarKind};
use crate::orchestrator::{RoundingMode, SimulationConfig};
use crate::rng::RngManager;

/// Share of the mean used as the standard deviation of the arrival count
const ARRIVAL_STD_DEV_FRACTION: f64 = 0.1;

/// Generator for car arrivals.
#[derive(Debug, Clone)]
pub struct ArrivalGenerator {
    /// Next car ID counter
    next_car_id: u64,
}

impl Default for ArrivalGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl ArrivalGenerator {
    pub fn new() -> Self {
        Self { next_car_id: 1 }
    }

    /// Cars arriving during the tick described by `clock`.
    ///
    /// Draws the count first, then one kind per car, from `rng`.
    pub fn generate(
        &mut self,
        clock: &ClockSnapshot,
        config: &SimulationConfig,
        rng: &mut RngManager,
    ) -> Vec<Car> {
        let count = sample_arrival_count(clock, config, rng);

        let mut cars = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let kind = if rng.chance(config.subscriber_share) {
                CarKind::Subscriber
            } else {
                CarKind::Standard
            };

            let car_id = format!("car_{:08}", self.next_car_id);
            self.next_car_id += 1;

            cars.push(Car::new(car_id, kind, clock.tick));
        }

        cars
    }

    /// Number of cars generated so far
    pub fn generated_count(&self) -> u64 {
        self.next_car_id.saturating_sub(1)
    }
}

/// Hourly arrival mean in effect at `clock`
pub fn hourly_mean(clock: &ClockSnapshot, config: &SimulationConfig) -> f64 {
    if clock.is_weekend() {
        config.weekend_arrivals
    } else {
        config.weekday_arrivals
    }
}

/// Sample the number of cars arriving in one tick.
pub fn sample_arrival_count(
    clock: &ClockSnapshot,
    config: &SimulationConfig,
    rng: &mut RngManager,
) -> u32 {
    let per_tick_mean = hourly_mean(clock, config) / TICKS_PER_HOUR as f64;
    let std_dev = per_tick_mean * ARRIVAL_STD_DEV_FRACTION;

    let sample = rng.normal(per_tick_mean, std_dev).max(0.0);

    let count = match config.arrival_rounding {
        RoundingMode::Nearest => sample.round(),
        RoundingMode::Stochastic => {
            let whole = sample.floor();
            if rng.chance(sample - whole) {
                whole + 1.0
            } else {
                whole
            }
        }
    };

    count as u32
}
