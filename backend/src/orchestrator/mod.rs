//! Orchestrator - per-tick simulation routine
//!
//! See `engine.rs` for the tick loop and `config.rs` for its parameters.

pub mod config;
pub mod engine;
pub mod snapshot;

// Re-export main types for convenience
pub use config::{
    config_fingerprint, EntranceFullPolicy, RoundingMode, ScenarioConfig, SimulationConfig,
};
pub use engine::{Engine, RunTotals, SimulationError, TickResult};
pub use snapshot::EngineSnapshot;
