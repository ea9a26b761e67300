//! Ledger collaborator
//!
//! The engine settles a visit by telling the ledger how long the car stayed,
//! when it paid and which tariff applies. What the ledger does with that is
//! its own business; [`Finances`] is the bookkeeping implementation shipped
//! with the crate.
//!
//! CRITICAL: All money values are i64 (cents)

mod finances;

pub use finances::{Finances, Payment, PricingConfig};

use crate::models::CarKind;
use serde::{Deserialize, Serialize};

/// Tariff a payment is recorded under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentKind {
    Standard,
    Subscriber,
}

impl From<CarKind> for PaymentKind {
    fn from(kind: CarKind) -> Self {
        match kind {
            CarKind::Standard => PaymentKind::Standard,
            CarKind::Subscriber => PaymentKind::Subscriber,
        }
    }
}

/// Records settled visits
pub trait Ledger: Send {
    /// Record one settled visit and return the amount charged (cents)
    fn record_payment(&mut self, duration_ticks: u64, settled_at_tick: u64, kind: PaymentKind)
        -> i64;
}
