//! Time management for the simulation
//!
//! The simulation operates in discrete ticks. One tick is one simulated
//! minute, 1440 ticks form a day and seven days form a week. Day 0 is a
//! Monday; days 5 and 6 are the weekend.

use serde::{Deserialize, Serialize};

/// Simulated minutes in one day
pub const TICKS_PER_DAY: u64 = 1440;

/// Simulated minutes in one hour
pub const TICKS_PER_HOUR: u64 = 60;

/// Days in one week
pub const DAYS_PER_WEEK: u64 = 7;

/// Simulated clock owned by the engine
///
/// Only the tick counter is stored; every other field is derived from it.
///
/// # Example
/// ```
/// use parking_simulator_core_rs::SimClock;
///
/// let mut clock = SimClock::new();
/// assert_eq!(clock.current().tick, 0);
///
/// clock.advance();
/// assert_eq!(clock.current().tick, 1);
/// assert_eq!(clock.current().minute_of_day, 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimClock {
    /// Total ticks elapsed since simulation start
    tick: u64,
}

/// Immutable view of the clock at one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockSnapshot {
    /// Total ticks elapsed since simulation start
    pub tick: u64,
    /// Minute within the current day (0..1440)
    pub minute_of_day: u64,
    /// Hour within the current day (0..24)
    pub hour_of_day: u64,
    /// Day of the week (0 = Monday .. 6 = Sunday)
    pub day_of_week: u64,
    /// Days elapsed since simulation start
    pub day: u64,
}

impl ClockSnapshot {
    /// Build the snapshot for an arbitrary tick
    ///
    /// # Example
    /// ```
    /// use parking_simulator_core_rs::ClockSnapshot;
    ///
    /// let saturday_noon = ClockSnapshot::at(5 * 1440 + 12 * 60);
    /// assert_eq!(saturday_noon.day_of_week, 5);
    /// assert_eq!(saturday_noon.hour_of_day, 12);
    /// assert!(saturday_noon.is_weekend());
    /// ```
    pub fn at(tick: u64) -> Self {
        let day = tick / TICKS_PER_DAY;
        let minute_of_day = tick % TICKS_PER_DAY;
        Self {
            tick,
            minute_of_day,
            hour_of_day: minute_of_day / TICKS_PER_HOUR,
            day_of_week: day % DAYS_PER_WEEK,
            day,
        }
    }

    /// Saturday or Sunday
    pub fn is_weekend(&self) -> bool {
        self.day_of_week >= 5
    }
}

impl SimClock {
    /// Create a clock at tick 0
    pub fn new() -> Self {
        Self { tick: 0 }
    }

    /// Advance time by one tick
    ///
    /// # Example
    /// ```
    /// use parking_simulator_core_rs::SimClock;
    ///
    /// let mut clock = SimClock::new();
    /// for _ in 0..1440 {
    ///     clock.advance();
    /// }
    /// assert_eq!(clock.current().day, 1);
    /// assert_eq!(clock.current().minute_of_day, 0);
    /// ```
    pub fn advance(&mut self) {
        self.tick += 1;
    }

    /// Snapshot of the current time
    pub fn current(&self) -> ClockSnapshot {
        ClockSnapshot::at(self.tick)
    }

    /// Get the current tick (total ticks since start)
    pub fn tick(&self) -> u64 {
        self.tick
    }
}
