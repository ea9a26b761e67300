//! Car model
//!
//! Represents one visitor moving through the garage.
//! Each car has:
//! - A deterministic identifier assigned by the arrival generator
//! - A kind (standard or subscriber) that decides how it settles
//! - The tick at which it arrived
//! - Remaining dwell minutes, set at the entrance and counted down by the garage
//! - A payment-in-progress flag
//! - The location it was parked at, once the garage assigns one

use crate::garage::Location;
use serde::{Deserialize, Serialize};

/// How a car settles its visit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CarKind {
    /// Pays per visit at the payment stage before exiting
    Standard,

    /// Flat-rate pass holder; settled on departure without queueing to pay
    Subscriber,
}

/// A car in the simulation
///
/// # Example
/// ```
/// use parking_simulator_core_rs::{Car, CarKind};
///
/// let car = Car::new("car_00000001".to_string(), CarKind::Standard, 10);
/// assert_eq!(car.entry_tick(), 10);
/// assert_eq!(car.minutes_left(), 0);
/// assert!(!car.is_paying());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Car {
    id: String,
    kind: CarKind,
    entry_tick: u64,
    minutes_left: u32,
    is_paying: bool,
    location: Option<Location>,
}

impl Car {
    /// Create a car that has just arrived at `entry_tick`
    pub fn new(id: String, kind: CarKind, entry_tick: u64) -> Self {
        Self {
            id,
            kind,
            entry_tick,
            minutes_left: 0,
            is_paying: false,
            location: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> CarKind {
        self.kind
    }

    pub fn is_subscriber(&self) -> bool {
        self.kind == CarKind::Subscriber
    }

    pub fn entry_tick(&self) -> u64 {
        self.entry_tick
    }

    pub fn minutes_left(&self) -> u32 {
        self.minutes_left
    }

    /// Set the remaining dwell time
    pub fn set_minutes_left(&mut self, minutes: u32) {
        self.minutes_left = minutes;
    }

    /// Count one minute of dwell down, saturating at zero
    pub fn tick_down(&mut self) {
        self.minutes_left = self.minutes_left.saturating_sub(1);
    }

    pub fn is_paying(&self) -> bool {
        self.is_paying
    }

    /// Mark the car as leaving its space and settling
    pub fn begin_payment(&mut self) {
        self.is_paying = true;
    }

    pub fn location(&self) -> Option<Location> {
        self.location
    }

    /// Record the location the garage assigned
    pub fn park_at(&mut self, location: Location) {
        self.location = Some(location);
    }

    /// Ticks elapsed between arrival and `tick`
    pub fn duration_until(&self, tick: u64) -> u64 {
        tick.saturating_sub(self.entry_tick)
    }
}
