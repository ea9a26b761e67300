//! Grid garage: floors × rows × places
//!
//! Places are scanned floor by floor, row by row, place by place. Reserved
//! places are never handed out as free.

use super::{GarageError, GarageOps, Location};
use crate::models::Car;
use serde::{Deserialize, Serialize};

/// Garage dimensions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GarageConfig {
    pub floors: usize,
    pub rows: usize,
    pub places: usize,
}

impl Default for GarageConfig {
    fn default() -> Self {
        Self {
            floors: 3,
            rows: 6,
            places: 30,
        }
    }
}

impl GarageConfig {
    pub fn capacity(&self) -> usize {
        self.floors * self.rows * self.places
    }
}

#[derive(Debug, Clone, Default)]
struct Slot {
    car: Option<Car>,
    reserved: bool,
}

/// Reference garage implementation
///
/// # Example
///
/// ```rust
/// use parking_simulator_core_rs::garage::{GarageOps, Location, ParkingGarage};
///
/// let mut garage = ParkingGarage::new(2, 2, 2);
/// assert_eq!(garage.capacity(), 8);
///
/// garage.reserve(Location::new(0, 0, 0)).unwrap();
/// assert_eq!(garage.first_free_location(), Some(Location::new(0, 0, 1)));
/// assert_eq!(garage.free_count(), 7);
/// ```
#[derive(Debug, Clone)]
pub struct ParkingGarage {
    floors: usize,
    rows: usize,
    places: usize,
    slots: Vec<Slot>,
    occupied: usize,
}

impl ParkingGarage {
    pub fn new(floors: usize, rows: usize, places: usize) -> Self {
        Self {
            floors,
            rows,
            places,
            slots: vec![Slot::default(); floors * rows * places],
            occupied: 0,
        }
    }

    pub fn from_config(config: &GarageConfig) -> Self {
        Self::new(config.floors, config.rows, config.places)
    }

    pub fn floors(&self) -> usize {
        self.floors
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn places(&self) -> usize {
        self.places
    }

    fn index(&self, location: Location) -> Result<usize, GarageError> {
        if location.floor >= self.floors || location.row >= self.rows || location.place >= self.places
        {
            return Err(GarageError::OutOfBounds(location));
        }
        Ok((location.floor * self.rows + location.row) * self.places + location.place)
    }

    fn location_of(&self, index: usize) -> Location {
        let per_floor = self.rows * self.places;
        Location {
            floor: index / per_floor,
            row: (index % per_floor) / self.places,
            place: index % self.places,
        }
    }

    /// Car parked at `location`, if any
    pub fn car_at(&self, location: Location) -> Result<Option<&Car>, GarageError> {
        let idx = self.index(location)?;
        Ok(self.slots[idx].car.as_ref())
    }

    /// Keep a place out of the free-location search
    pub fn reserve(&mut self, location: Location) -> Result<(), GarageError> {
        let idx = self.index(location)?;
        self.slots[idx].reserved = true;
        Ok(())
    }

    pub fn unreserve(&mut self, location: Location) -> Result<(), GarageError> {
        let idx = self.index(location)?;
        self.slots[idx].reserved = false;
        Ok(())
    }

    pub fn is_reserved(&self, location: Location) -> Result<bool, GarageError> {
        let idx = self.index(location)?;
        Ok(self.slots[idx].reserved)
    }

    /// Places a new car could park in right now
    pub fn free_count(&self) -> usize {
        self.slots
            .iter()
            .filter(|slot| slot.car.is_none() && !slot.reserved)
            .count()
    }

    /// Parked cars in scan order
    pub fn parked_cars(&self) -> impl Iterator<Item = &Car> {
        self.slots.iter().filter_map(|slot| slot.car.as_ref())
    }
}

impl GarageOps for ParkingGarage {
    fn first_free_location(&self) -> Option<Location> {
        self.slots
            .iter()
            .position(|slot| slot.car.is_none() && !slot.reserved)
            .map(|idx| self.location_of(idx))
    }

    fn assign(&mut self, location: Location, mut car: Car) -> Result<(), GarageError> {
        let idx = self.index(location)?;
        let slot = &mut self.slots[idx];
        if slot.car.is_some() {
            return Err(GarageError::Occupied(location));
        }
        if slot.reserved {
            return Err(GarageError::Reserved(location));
        }

        car.park_at(location);
        slot.car = Some(car);
        self.occupied += 1;
        Ok(())
    }

    fn advance_occupants(&mut self) {
        for car in self.slots.iter_mut().filter_map(|slot| slot.car.as_mut()) {
            car.tick_down();
        }
    }

    fn next_leaving_car(&mut self) -> Option<Car> {
        let car = self
            .slots
            .iter_mut()
            .filter_map(|slot| slot.car.as_mut())
            .find(|car| car.minutes_left() == 0 && !car.is_paying())?;

        // paying flag doubles as "already reported"
        car.begin_payment();
        Some(car.clone())
    }

    fn release(&mut self, location: Location) -> Result<Car, GarageError> {
        let idx = self.index(location)?;
        let car = self.slots[idx]
            .car
            .take()
            .ok_or(GarageError::Vacant(location))?;
        self.occupied -= 1;
        Ok(car)
    }

    fn occupied_count(&self) -> usize {
        self.occupied
    }

    fn capacity(&self) -> usize {
        self.slots.len()
    }
}
