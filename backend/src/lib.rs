//! Parking Simulator Core - Rust Engine
//!
//! Tick-based parking garage simulator with deterministic execution.
//!
//! # Architecture
//!
//! - **core**: Simulation clock (one tick = one minute)
//! - **models**: Domain types (Car, FlowQueue, Event)
//! - **arrivals**: Weekly-rhythm arrival generation
//! - **garage**: Garage contract and the reference floor/row/place grid
//! - **ledger**: Payment recording and revenue aggregation
//! - **orchestrator**: Per-tick routine and engine configuration
//! - **events**: Tick subscriptions (listeners and channels)
//! - **scheduler**: Background worker that drives the engine
//! - **stats**: Time series aggregated from tick results
//! - **rng**: Deterministic random number generation
//!
//! # Critical Invariants
//!
//! 1. All money values are i64 (cents)
//! 2. All randomness is deterministic (seeded RNG)
//! 3. A car is in exactly one stage at a time
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
//! let result = engine.tick().unwrap();
//! assert_eq!(result.tick, 1);
//! assert_eq!(result.capacity, 540);
//! ```

// Module declarations
pub mod arrivals;
pub mod core;
pub mod events;
pub mod garage;
pub mod ledger;
pub mod models;
pub mod orchestrator;
pub mod rng;
pub mod scheduler;
pub mod stats;

// Re-exports for convenience
pub use core::time::{ClockSnapshot, SimClock};
pub use garage::{GarageConfig, GarageError, GarageOps, Location, ParkingGarage};
pub use ledger::{Finances, Ledger, PaymentKind, PricingConfig};
pub use models::{
    car::{Car, CarKind},
    event::{Event, EventLog},
    queue::FlowQueue,
};
pub use orchestrator::{
    config_fingerprint, Engine, EngineSnapshot, EntranceFullPolicy, RoundingMode, RunTotals,
    ScenarioConfig, SimulationConfig, SimulationError, TickResult,
};
pub use rng::RngManager;
pub use scheduler::{
    CancelToken, ImmediatePacer, Pacer, SchedulerError, SchedulerState, TickScheduler,
    WallClockPacer,
};
pub use stats::TimeSeries;

/// Engine over the reference garage and ledger
pub type ReferenceEngine = Engine<ParkingGarage, Finances>;

impl ReferenceEngine {
    /// Build an engine from a full scenario
    ///
    /// # Example
    ///
    /// ```rust
    /// use parking_simulator_core_rs::{GarageOps, ReferenceEngine, ScenarioConfig};
    ///
    /// let engine = ReferenceEngine::from_scenario(ScenarioConfig::default()).unwrap();
    /// assert_eq!(engine.garage().capacity(), 540);
    /// ```
    pub fn from_scenario(scenario: ScenarioConfig) -> Result<Self, SimulationError> {
        scenario.validate()?;
        Engine::new(
            scenario.simulation,
            ParkingGarage::from_config(&scenario.garage),
            Finances::new(scenario.pricing),
        )
    }
}
