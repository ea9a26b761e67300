//! Simulation configuration
//!
//! All parameters are fixed for the lifetime of an engine. Every field has a
//! default, so a JSON scenario file only needs to name what it overrides.

use crate::garage::GarageConfig;
use crate::ledger::PricingConfig;
use crate::orchestrator::SimulationError;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// How a sampled (fractional) arrival count becomes a whole number of cars
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundingMode {
    /// Round half away from zero
    ///
    /// This was the default before `Stochastic` replaced it. With the
    /// default rates this almost always yields exactly one car per
    /// minute, so the long-run mean is biased upwards.
    Nearest,

    /// Round up with probability equal to the fractional part
    ///
    /// Unbiased: the long-run mean equals the configured per-minute rate.
    Stochastic,
}

/// What happens to a car at the head of the entrance queue when the garage
/// has no free place
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntranceFullPolicy {
    /// Car gives up and leaves the simulation
    Drop,

    /// Car stays at the front of the entrance queue; entry stops for the tick
    Requeue,
}

/// Engine parameters
///
/// # Example
///
/// ```rust
/// use parking_simulator_core_rs::SimulationConfig;
///
/// let config = SimulationConfig {
///     entrance_speed: 1,
///     rng_seed: 42,
///     ..Default::default()
/// };
/// assert!(config.validate().is_ok());
/// assert_eq!(config.weekday_arrivals, 50.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Mean arriving cars per hour, Monday to Friday
    pub weekday_arrivals: f64,

    /// Mean arriving cars per hour, Saturday and Sunday
    pub weekend_arrivals: f64,

    /// Cars that can enter per tick
    pub entrance_speed: usize,

    /// Cars that can pay per tick
    pub payment_speed: usize,

    /// Cars that can leave per tick
    pub exit_speed: usize,

    /// Shortest stay in minutes (inclusive)
    pub min_stay_minutes: u32,

    /// Longest stay in minutes (inclusive)
    pub max_stay_minutes: u32,

    /// Probability that an arriving car is a subscriber
    pub subscriber_share: f64,

    /// RNG seed for deterministic simulation
    pub rng_seed: u64,

    pub arrival_rounding: RoundingMode,

    pub entrance_full_policy: EntranceFullPolicy,

    /// Keep a per-car event log in the engine
    pub record_events: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            weekday_arrivals: 50.0,
            weekend_arrivals: 90.0,
            entrance_speed: 3,
            payment_speed: 10,
            exit_speed: 9,
            min_stay_minutes: 15,
            max_stay_minutes: 615,
            subscriber_share: 0.5,
            rng_seed: 12345,
            arrival_rounding: RoundingMode::Stochastic,
            entrance_full_policy: EntranceFullPolicy::Drop,
            record_events: false,
        }
    }
}

impl SimulationConfig {
    /// Check every invariant the engine relies on
    pub fn validate(&self) -> Result<(), SimulationError> {
        for (name, rate) in [
            ("weekday_arrivals", self.weekday_arrivals),
            ("weekend_arrivals", self.weekend_arrivals),
        ] {
            if !rate.is_finite() || rate < 0.0 {
                return Err(SimulationError::InvalidConfig(format!(
                    "{} must be a finite non-negative number, got {}",
                    name, rate
                )));
            }
        }

        for (name, speed) in [
            ("entrance_speed", self.entrance_speed),
            ("payment_speed", self.payment_speed),
            ("exit_speed", self.exit_speed),
        ] {
            if speed == 0 {
                return Err(SimulationError::InvalidConfig(format!(
                    "{} must be > 0",
                    name
                )));
            }
        }

        if self.min_stay_minutes == 0 {
            return Err(SimulationError::InvalidConfig(
                "min_stay_minutes must be > 0".to_string(),
            ));
        }

        if self.min_stay_minutes > self.max_stay_minutes {
            return Err(SimulationError::InvalidConfig(format!(
                "min_stay_minutes ({}) exceeds max_stay_minutes ({})",
                self.min_stay_minutes, self.max_stay_minutes
            )));
        }

        if !(0.0..=1.0).contains(&self.subscriber_share) {
            return Err(SimulationError::InvalidConfig(format!(
                "subscriber_share must be within [0, 1], got {}",
                self.subscriber_share
            )));
        }

        Ok(())
    }
}

/// Everything needed to build a runnable simulation
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    pub simulation: SimulationConfig,
    pub garage: GarageConfig,
    pub pricing: PricingConfig,
}

impl ScenarioConfig {
    pub fn validate(&self) -> Result<(), SimulationError> {
        self.simulation.validate()?;

        if self.garage.capacity() == 0 {
            return Err(SimulationError::InvalidConfig(
                "garage must have at least one place".to_string(),
            ));
        }

        if self.pricing.standard_hourly_rate_cents < 0 || self.pricing.subscriber_visit_fee_cents < 0
        {
            return Err(SimulationError::InvalidConfig(
                "prices must be non-negative".to_string(),
            ));
        }

        Ok(())
    }

    pub fn from_json(json: &str) -> Result<Self, SimulationError> {
        serde_json::from_str(json).map_err(|e| SimulationError::Serialization(e.to_string()))
    }
}

/// SHA-256 fingerprint of a configuration
///
/// Object keys are sorted before hashing so the digest does not depend on
/// field declaration order.
pub fn config_fingerprint<T: Serialize>(config: &T) -> Result<String, SimulationError> {
    let value = serde_json::to_value(config).map_err(|e| {
        SimulationError::Serialization(format!("Config serialization failed: {}", e))
    })?;

    fn canonicalize(value: serde_json::Value) -> serde_json::Value {
        match value {
            serde_json::Value::Object(map) => {
                let mut entries: Vec<_> = map.into_iter().collect();
                entries.sort_by(|a, b| a.0.cmp(&b.0));
                serde_json::Value::Object(
                    entries
                        .into_iter()
                        .map(|(k, v)| (k, canonicalize(v)))
                        .collect(),
                )
            }
            serde_json::Value::Array(items) => {
                serde_json::Value::Array(items.into_iter().map(canonicalize).collect())
            }
            other => other,
        }
    }

    let json = serde_json::to_string(&canonicalize(value)).map_err(|e| {
        SimulationError::Serialization(format!("Config serialization failed: {}", e))
    })?;

    let mut hasher = Sha256::new();
    hasher.update(json.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}
