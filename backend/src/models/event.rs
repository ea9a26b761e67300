//! Event logging for per-car lifecycle tracing.
//!
//! Events capture every stage change a car goes through. The engine only
//! records them when `SimulationConfig::record_events` is enabled; they are
//! used for debugging and for verifying stage ordering in tests.
//!
//! # Event Types
//!
//! - **Arrival**: car generated and placed on the entrance queue
//! - **Parked**: car assigned to a garage place
//! - **TurnedAway**: car dropped at the entrance because the garage was full
//! - **EntranceBlocked**: car returned to the front of the entrance queue
//! - **QueuedPayment**: standard car finished its stay and waits to pay
//! - **Settled**: payment recorded with the ledger and place released
//! - **Departed**: car left through the exit
//!
//! # Example
//!
//! ```rust
//! use parking_simulator_core_rs::{CarKind, Event};
//!
//! let event = Event::Arrival {
//!     tick: 10,
//!     car_id: "car_00000042".to_string(),
//!     kind: CarKind::Standard,
//! };
//!
//! assert_eq!(event.tick(), 10);
//! assert_eq!(event.event_type(), "Arrival");
//! ```

use crate::garage::Location;
use crate::models::car::CarKind;
use serde::{Deserialize, Serialize};

/// Simulation event capturing a car's stage change.
///
/// Events are logged in the order they occur within a tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    Arrival {
        tick: u64,
        car_id: String,
        kind: CarKind,
    },

    Parked {
        tick: u64,
        car_id: String,
        location: Location,
        stay_minutes: u32,
    },

    /// Garage full, car dropped from the simulation
    TurnedAway { tick: u64, car_id: String },

    /// Garage full, car kept at the front of the entrance queue
    EntranceBlocked { tick: u64, car_id: String },

    QueuedPayment { tick: u64, car_id: String },

    Settled {
        tick: u64,
        car_id: String,
        kind: CarKind,
        duration_ticks: u64,
        amount_cents: i64,
    },

    Departed { tick: u64, car_id: String },
}

impl Event {
    /// Get the tick number when this event occurred
    pub fn tick(&self) -> u64 {
        match self {
            Event::Arrival { tick, .. } => *tick,
            Event::Parked { tick, .. } => *tick,
            Event::TurnedAway { tick, .. } => *tick,
            Event::EntranceBlocked { tick, .. } => *tick,
            Event::QueuedPayment { tick, .. } => *tick,
            Event::Settled { tick, .. } => *tick,
            Event::Departed { tick, .. } => *tick,
        }
    }

    /// Get a short description of the event type
    pub fn event_type(&self) -> &'static str {
        match self {
            Event::Arrival { .. } => "Arrival",
            Event::Parked { .. } => "Parked",
            Event::TurnedAway { .. } => "TurnedAway",
            Event::EntranceBlocked { .. } => "EntranceBlocked",
            Event::QueuedPayment { .. } => "QueuedPayment",
            Event::Settled { .. } => "Settled",
            Event::Departed { .. } => "Departed",
        }
    }

    /// Car the event refers to
    pub fn car_id(&self) -> &str {
        match self {
            Event::Arrival { car_id, .. }
            | Event::Parked { car_id, .. }
            | Event::TurnedAway { car_id, .. }
            | Event::EntranceBlocked { car_id, .. }
            | Event::QueuedPayment { car_id, .. }
            | Event::Settled { car_id, .. }
            | Event::Departed { car_id, .. } => car_id,
        }
    }
}

/// Event log for storing and querying simulation events.
///
/// This is a simple wrapper around Vec<Event> with convenience methods.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    /// Create a new empty event log
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Add an event to the log
    pub fn log(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Get events for a specific tick
    pub fn events_at_tick(&self, tick: u64) -> Vec<&Event> {
        self.events.iter().filter(|e| e.tick() == tick).collect()
    }

    /// Get events of a specific type
    pub fn events_of_type(&self, event_type: &str) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| e.event_type() == event_type)
            .collect()
    }

    /// Full history of one car, in order
    pub fn events_for_car(&self, car_id: &str) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| e.car_id() == car_id)
            .collect()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
