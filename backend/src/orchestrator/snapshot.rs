//! Snapshot - point-in-time view of the engine
//!
//! External readers (views, the CLI, tests) never hold live handles into the
//! engine's queues. They take an owned snapshot, which may be stale as soon as
//! the next tick runs.
//!
//! # Critical Invariants
//!
//! - **Queue Integrity**: No car appears in more than one queue
//! - **Config Matching**: The fingerprint identifies the configuration the
//!   snapshot was taken under

use crate::core::time::ClockSnapshot;
use crate::garage::GarageOps;
use crate::ledger::Ledger;
use crate::models::Car;
use crate::orchestrator::config::config_fingerprint;
use crate::orchestrator::engine::{Engine, RunTotals, SimulationError};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Owned copy of the engine's observable state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineSnapshot {
    pub clock: ClockSnapshot,

    /// SHA256 hash of the engine's config
    pub config_hash: String,

    /// RNG state at time of snapshot
    pub rng_state: u64,

    /// Entrance queue, front first
    pub entrance_queue: Vec<Car>,

    /// Payment queue, front first
    pub payment_queue: Vec<Car>,

    /// Exit queue, front first
    pub exit_queue: Vec<Car>,

    pub occupied: usize,

    pub capacity: usize,

    pub totals: RunTotals,
}

impl<G: GarageOps, L: Ledger> Engine<G, L> {
    /// Take a snapshot of the current state
    pub fn snapshot(&self) -> Result<EngineSnapshot, SimulationError> {
        Ok(EngineSnapshot {
            clock: self.clock(),
            config_hash: config_fingerprint(self.config())?,
            rng_state: self.rng_state(),
            entrance_queue: self.entrance_queue().snapshot(),
            payment_queue: self.payment_queue().snapshot(),
            exit_queue: self.exit_queue().snapshot(),
            occupied: self.garage().occupied_count(),
            capacity: self.garage().capacity(),
            totals: self.totals().clone(),
        })
    }
}

impl EngineSnapshot {
    /// Check that no car is queued twice
    pub fn validate(&self) -> Result<(), SimulationError> {
        let mut seen = HashSet::new();
        for car in self
            .entrance_queue
            .iter()
            .chain(&self.payment_queue)
            .chain(&self.exit_queue)
        {
            if !seen.insert(car.id()) {
                return Err(SimulationError::DuplicateCar(car.id().to_string()));
            }
        }

        if self.payment_queue.len() > self.occupied {
            return Err(SimulationError::InconsistentState(format!(
                "{} cars waiting to pay but only {} places occupied",
                self.payment_queue.len(),
                self.occupied
            )));
        }

        Ok(())
    }

    /// Cars in the system (payment-queue cars still hold a place)
    pub fn cars_in_system(&self) -> usize {
        self.entrance_queue.len() + self.occupied + self.exit_queue.len()
    }

    pub fn to_json(&self) -> Result<String, SimulationError> {
        serde_json::to_string(self).map_err(|e| SimulationError::Serialization(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, SimulationError> {
        serde_json::from_str(json).map_err(|e| SimulationError::Serialization(e.to_string()))
    }
}
