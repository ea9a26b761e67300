//! Orchestrator Engine
//!
//! Per-tick routine moving cars through the garage:
//!
//! ```text
//! For each tick t:
//! 1. Advance the clock
//! 2. Generate arrivals onto the entrance queue
//! 3. Entrance: up to `entrance_speed` cars take a free place (or are turned away)
//! 4. Garage advances every occupant's dwell time
//! 5. Leaving cars: subscribers settle and go to the exit queue,
//!    standard cars join the payment queue
//! 6. Payment: up to `payment_speed` cars settle and go to the exit queue
//! 7. Exit: up to `exit_speed` cars leave the system
//! 8. Notify subscribers
//! ```
//!
//! # Example
//!
//! ```rust
//! use parking_simulator_core_rs::garage::ParkingGarage;
//! use parking_simulator_core_rs::ledger::{Finances, PricingConfig};
//! use parking_simulator_core_rs::{Engine, SimulationConfig};
//!
//! let mut engine = Engine::new(
//!     SimulationConfig::default(),
//!     ParkingGarage::new(3, 6, 30),
//!     Finances::new(PricingConfig::default()),
//! )
//! .unwrap();
//!
//! for _ in 0..60 {
//!     let result = engine.tick().unwrap();
//!     assert!(result.entered <= 3);
//! }
//! assert_eq!(engine.current_tick(), 60);
//! ```

use crate::arrivals::ArrivalGenerator;
use crate::core::time::{ClockSnapshot, SimClock};
use crate::events::{EventNotifier, ListenerId, TickListener};
use crate::garage::{GarageError, GarageOps, Location};
use crate::ledger::{Ledger, PaymentKind};
use crate::models::{Car, CarKind, Event, EventLog, FlowQueue};
use crate::orchestrator::config::{EntranceFullPolicy, SimulationConfig};
use crate::rng::RngManager;
use serde::{Deserialize, Serialize};
use std::sync::mpsc::Receiver;
use thiserror::Error;
use tracing::{debug, info};

// ============================================================================
// Results and Errors
// ============================================================================

/// Result of a single tick
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickResult {
    /// Tick number (the clock value this step ran at)
    pub tick: u64,

    pub day_of_week: u64,

    pub minute_of_day: u64,

    /// Cars generated this tick
    pub arrivals: usize,

    /// Cars that took a place this tick
    pub entered: usize,

    /// Cars dropped at the entrance because the garage was full
    pub turned_away: usize,

    /// Entrance stopped with a car held at the front of the queue
    pub entrance_blocked: bool,

    /// Cars whose dwell time ended this tick
    pub leaving: usize,

    pub settled_standard: usize,

    pub settled_subscriber: usize,

    /// Cars that left through the exit this tick
    pub departed: usize,

    /// Revenue settled this tick (cents)
    pub revenue_cents: i64,

    /// Occupied places after the tick
    pub occupied: usize,

    pub capacity: usize,

    pub entrance_queue_len: usize,

    pub payment_queue_len: usize,

    pub exit_queue_len: usize,
}

/// Running totals since the engine was created
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunTotals {
    pub ticks: u64,
    pub arrivals: u64,
    pub entered: u64,
    pub turned_away: u64,
    pub settled_standard: u64,
    pub settled_subscriber: u64,
    pub departed: u64,
    pub revenue_cents: i64,
}

impl RunTotals {
    fn add(&mut self, result: &TickResult) {
        self.ticks += 1;
        self.arrivals += result.arrivals as u64;
        self.entered += result.entered as u64;
        self.turned_away += result.turned_away as u64;
        self.settled_standard += result.settled_standard as u64;
        self.settled_subscriber += result.settled_subscriber as u64;
        self.departed += result.departed as u64;
        self.revenue_cents += result.revenue_cents;
    }
}

/// Simulation error types
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimulationError {
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Garage contract violation: {0}")]
    Garage(#[from] GarageError),

    #[error("Car {0} was reported leaving without a location")]
    UnassignedCar(String),

    #[error("Released car {found} at {location}, expected {expected}")]
    CarMismatch {
        location: Location,
        expected: String,
        found: String,
    },

    #[error("Car {0} appears in more than one queue")]
    DuplicateCar(String),

    #[error("Inconsistent state: {0}")]
    InconsistentState(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

// ============================================================================
// Engine
// ============================================================================

/// Simulation engine owning the clock, the three queues and the RNG
///
/// # Determinism
///
/// All randomness is via `rng_manager` with seeded xorshift64*.
/// Same seed + same config + same garage = identical tick results.
pub struct Engine<G: GarageOps, L: Ledger> {
    config: SimulationConfig,

    clock: SimClock,

    rng_manager: RngManager,

    arrival_generator: ArrivalGenerator,

    garage: G,

    ledger: L,

    entrance_queue: FlowQueue<Car>,

    /// Standard cars done parking, still holding their place until they pay
    payment_queue: FlowQueue<Car>,

    exit_queue: FlowQueue<Car>,

    notifier: EventNotifier,

    event_log: EventLog,

    totals: RunTotals,
}

impl<G: GarageOps, L: Ledger> Engine<G, L> {
    /// Create a new engine at tick 0 with empty queues
    ///
    /// # Returns
    ///
    /// * `Ok(Engine)` - Successfully initialized engine
    /// * `Err(SimulationError::InvalidConfig)` - Configuration validation failed
    pub fn new(config: SimulationConfig, garage: G, ledger: L) -> Result<Self, SimulationError> {
        config.validate()?;

        info!(
            seed = config.rng_seed,
            capacity = garage.capacity(),
            "simulation engine created"
        );

        Ok(Self {
            rng_manager: RngManager::new(config.rng_seed),
            config,
            clock: SimClock::new(),
            arrival_generator: ArrivalGenerator::new(),
            garage,
            ledger,
            entrance_queue: FlowQueue::new(),
            payment_queue: FlowQueue::new(),
            exit_queue: FlowQueue::new(),
            notifier: EventNotifier::new(),
            event_log: EventLog::new(),
            totals: RunTotals::default(),
        })
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn current_tick(&self) -> u64 {
        self.clock.tick()
    }

    pub fn clock(&self) -> ClockSnapshot {
        self.clock.current()
    }

    pub fn garage(&self) -> &G {
        &self.garage
    }

    /// Mutable garage access, e.g. for reserving places between ticks
    pub fn garage_mut(&mut self) -> &mut G {
        &mut self.garage
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn entrance_queue(&self) -> &FlowQueue<Car> {
        &self.entrance_queue
    }

    pub fn payment_queue(&self) -> &FlowQueue<Car> {
        &self.payment_queue
    }

    pub fn exit_queue(&self) -> &FlowQueue<Car> {
        &self.exit_queue
    }

    pub fn event_log(&self) -> &EventLog {
        &self.event_log
    }

    pub fn totals(&self) -> &RunTotals {
        &self.totals
    }

    pub(crate) fn rng_state(&self) -> u64 {
        self.rng_manager.get_state()
    }

    /// Cars currently inside the system
    ///
    /// Cars in the payment queue still hold their place, so they are counted
    /// through the garage.
    pub fn cars_in_system(&self) -> usize {
        self.entrance_queue.size() + self.garage.occupied_count() + self.exit_queue.size()
    }

    /// Put a car on the entrance queue outside of arrival generation
    pub fn enqueue_arrival(&mut self, car: Car) {
        self.entrance_queue.enqueue(car);
    }

    // ========================================================================
    // Subscriptions
    // ========================================================================

    pub fn subscribe(&mut self, listener: Box<dyn TickListener>) -> ListenerId {
        self.notifier.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.notifier.unsubscribe(id)
    }

    pub fn subscribe_channel(&mut self) -> Receiver<TickResult> {
        self.notifier.subscribe_channel()
    }

    // ========================================================================
    // Tick Loop Implementation
    // ========================================================================

    /// Execute one simulation tick
    ///
    /// # Returns
    ///
    /// * `Ok(TickResult)` - Tick executed successfully
    /// * `Err(SimulationError)` - The garage broke its contract; engine and
    ///   garage state no longer agree
    pub fn tick(&mut self) -> Result<TickResult, SimulationError> {
        // STEP 1: ADVANCE TIME
        self.clock.advance();
        let now = self.clock.current();

        let mut result = TickResult {
            tick: now.tick,
            day_of_week: now.day_of_week,
            minute_of_day: now.minute_of_day,
            ..Default::default()
        };

        // STEP 2: ARRIVALS
        self.generate_arrivals(&now, &mut result);

        // STEP 3: ENTRANCE
        self.advance_entrance_queue(now.tick, &mut result)?;

        // STEP 4: GARAGE
        self.garage.advance_occupants();

        // STEP 5-6: LEAVING CARS AND PAYMENT
        self.advance_payment_queue(now.tick, &mut result)?;

        // STEP 7: EXIT
        self.let_cars_exit(now.tick, &mut result);

        result.occupied = self.garage.occupied_count();
        result.capacity = self.garage.capacity();
        result.entrance_queue_len = self.entrance_queue.size();
        result.payment_queue_len = self.payment_queue.size();
        result.exit_queue_len = self.exit_queue.size();

        self.totals.add(&result);

        debug!(
            tick = result.tick,
            arrivals = result.arrivals,
            entered = result.entered,
            turned_away = result.turned_away,
            settled = result.settled_standard + result.settled_subscriber,
            departed = result.departed,
            occupied = result.occupied,
            "tick completed"
        );

        // STEP 8: NOTIFY
        self.notifier.notify_all(&result);

        Ok(result)
    }

    fn log_event(&mut self, event: impl FnOnce() -> Event) {
        if self.config.record_events {
            self.event_log.log(event());
        }
    }

    fn generate_arrivals(&mut self, now: &ClockSnapshot, result: &mut TickResult) {
        let cars = self
            .arrival_generator
            .generate(now, &self.config, &mut self.rng_manager);
        result.arrivals = cars.len();

        for car in cars {
            self.log_event(|| Event::Arrival {
                tick: now.tick,
                car_id: car.id().to_string(),
                kind: car.kind(),
            });
            self.entrance_queue.enqueue(car);
        }
    }

    fn advance_entrance_queue(
        &mut self,
        tick: u64,
        result: &mut TickResult,
    ) -> Result<(), SimulationError> {
        for _ in 0..self.config.entrance_speed {
            let Some(mut car) = self.entrance_queue.dequeue() else {
                break;
            };

            let Some(location) = self.garage.first_free_location() else {
                match self.config.entrance_full_policy {
                    EntranceFullPolicy::Drop => {
                        debug!(tick, car_id = car.id(), "garage full, car turned away");
                        result.turned_away += 1;
                        self.log_event(|| Event::TurnedAway {
                            tick,
                            car_id: car.id().to_string(),
                        });
                        continue;
                    }
                    EntranceFullPolicy::Requeue => {
                        result.entrance_blocked = true;
                        self.log_event(|| Event::EntranceBlocked {
                            tick,
                            car_id: car.id().to_string(),
                        });
                        self.entrance_queue.requeue_front(car);
                        break;
                    }
                }
            };

            let stay_minutes = self
                .rng_manager
                .range_inclusive(self.config.min_stay_minutes, self.config.max_stay_minutes);
            car.set_minutes_left(stay_minutes);

            let car_id = car.id().to_string();
            self.garage.assign(location, car)?;
            result.entered += 1;

            self.log_event(|| Event::Parked {
                tick,
                car_id,
                location,
                stay_minutes,
            });
        }

        Ok(())
    }

    fn advance_payment_queue(
        &mut self,
        tick: u64,
        result: &mut TickResult,
    ) -> Result<(), SimulationError> {
        // Sort leaving cars: subscribers settle on the spot, standard cars queue to pay
        while let Some(mut car) = self.garage.next_leaving_car() {
            car.begin_payment();
            result.leaving += 1;

            match car.kind() {
                CarKind::Subscriber => {
                    let car = self.settle(car, tick, result)?;
                    self.exit_queue.enqueue(car);
                }
                CarKind::Standard => {
                    self.log_event(|| Event::QueuedPayment {
                        tick,
                        car_id: car.id().to_string(),
                    });
                    self.payment_queue.enqueue(car);
                }
            }
        }

        for _ in 0..self.config.payment_speed {
            let Some(car) = self.payment_queue.dequeue() else {
                break;
            };
            let car = self.settle(car, tick, result)?;
            self.exit_queue.enqueue(car);
        }

        Ok(())
    }

    /// Record the payment and free the car's place
    ///
    /// Returns the car as released by the garage.
    fn settle(
        &mut self,
        car: Car,
        tick: u64,
        result: &mut TickResult,
    ) -> Result<Car, SimulationError> {
        let location = car
            .location()
            .ok_or_else(|| SimulationError::UnassignedCar(car.id().to_string()))?;
        let duration_ticks = car.duration_until(tick);
        let kind = PaymentKind::from(car.kind());

        let amount_cents = self.ledger.record_payment(duration_ticks, tick, kind);

        let mut released = self.garage.release(location)?;
        if released.id() != car.id() {
            return Err(SimulationError::CarMismatch {
                location,
                expected: car.id().to_string(),
                found: released.id().to_string(),
            });
        }
        released.begin_payment();

        match kind {
            PaymentKind::Standard => result.settled_standard += 1,
            PaymentKind::Subscriber => result.settled_subscriber += 1,
        }
        result.revenue_cents += amount_cents;

        self.log_event(|| Event::Settled {
            tick,
            car_id: car.id().to_string(),
            kind: car.kind(),
            duration_ticks,
            amount_cents,
        });

        Ok(released)
    }

    fn let_cars_exit(&mut self, tick: u64, result: &mut TickResult) {
        for _ in 0..self.config.exit_speed {
            let Some(car) = self.exit_queue.dequeue() else {
                break;
            };
            result.departed += 1;
            self.log_event(|| Event::Departed {
                tick,
                car_id: car.id().to_string(),
            });
        }
    }
}

// Manual Debug implementation (listeners don't implement Debug)
impl<G: GarageOps, L: Ledger> std::fmt::Debug for Engine<G, L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("current_tick", &self.current_tick())
            .field("entrance_queue", &self.entrance_queue.size())
            .field("payment_queue", &self.payment_queue.size())
            .field("exit_queue", &self.exit_queue.size())
            .field("occupied", &self.garage.occupied_count())
            .field("notifier", &self.notifier)
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
