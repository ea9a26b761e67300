//! Garage collaborator
//!
//! The engine never inspects the garage's spatial layout. It only needs to
//! find a free place, park a car, count dwell time down, learn which cars are
//! done, and free their places. `GarageOps` is that contract;
//! [`ParkingGarage`] is the grid implementation shipped with the crate.

mod grid;

pub use grid::{GarageConfig, ParkingGarage};

use crate::models::Car;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single parking place
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Location {
    pub floor: usize,
    pub row: usize,
    pub place: usize,
}

impl Location {
    pub fn new(floor: usize, row: usize, place: usize) -> Self {
        Self { floor, row, place }
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "F{}R{}P{}", self.floor, self.row, self.place)
    }
}

/// Errors reported by a garage
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GarageError {
    #[error("Location {0} is outside the garage")]
    OutOfBounds(Location),

    #[error("Location {0} is already occupied")]
    Occupied(Location),

    #[error("Location {0} is reserved")]
    Reserved(Location),

    #[error("Location {0} holds no car")]
    Vacant(Location),
}

/// Operations the engine needs from a garage
///
/// # Contract
///
/// - `advance_occupants` is called exactly once per tick and counts every
///   parked car's remaining minutes down by one.
/// - `next_leaving_car` returns, one per call, every car whose remaining
///   minutes reached zero, each car at most once. The car stays in its
///   place; the engine frees it with `release` after settlement.
/// - `release` returns the car that was parked at the location.
///
/// # Example
///
/// ```rust
/// use parking_simulator_core_rs::garage::{GarageOps, ParkingGarage};
/// use parking_simulator_core_rs::{Car, CarKind};
///
/// let mut garage = ParkingGarage::new(1, 1, 2);
/// let location = garage.first_free_location().unwrap();
///
/// let mut car = Car::new("car_1".to_string(), CarKind::Standard, 0);
/// car.set_minutes_left(1);
/// garage.assign(location, car).unwrap();
///
/// garage.advance_occupants();
/// let leaving = garage.next_leaving_car().unwrap();
/// assert_eq!(leaving.id(), "car_1");
/// assert!(garage.next_leaving_car().is_none());
///
/// let released = garage.release(location).unwrap();
/// assert_eq!(released.id(), "car_1");
/// ```
pub trait GarageOps: Send {
    /// First place a new car may park in, if any
    fn first_free_location(&self) -> Option<Location>;

    /// Park `car` at `location`
    fn assign(&mut self, location: Location, car: Car) -> Result<(), GarageError>;

    /// One tick of dwell-time countdown for every parked car
    fn advance_occupants(&mut self);

    /// Next car whose dwell time is over and that has not been reported yet
    fn next_leaving_car(&mut self) -> Option<Car>;

    /// Remove and return the car parked at `location`
    fn release(&mut self, location: Location) -> Result<Car, GarageError>;

    /// Number of places currently holding a car
    fn occupied_count(&self) -> usize;

    /// Total number of places
    fn capacity(&self) -> usize;
}
