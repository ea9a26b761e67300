//! Finances: payment bookkeeping and revenue aggregation
//!
//! Standard visits pay per started hour (at least one hour). Subscriber
//! visits pay the flat per-visit fee, which defaults to zero because the
//! subscription itself is settled outside the simulation.

use super::{Ledger, PaymentKind};
use crate::core::time::{TICKS_PER_DAY, TICKS_PER_HOUR};
use serde::{Deserialize, Serialize};

/// Tariffs (cents)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    /// Price per started hour for standard visits
    pub standard_hourly_rate_cents: i64,

    /// Flat price per subscriber visit
    pub subscriber_visit_fee_cents: i64,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            standard_hourly_rate_cents: 250,
            subscriber_visit_fee_cents: 0,
        }
    }
}

/// One recorded payment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    /// Sequential identifier in settlement order (`pay_00000001`, ...)
    pub id: String,
    pub duration_ticks: u64,
    pub settled_at_tick: u64,
    pub kind: PaymentKind,
    pub amount_cents: i64,
}

/// Reference ledger
///
/// # Example
/// ```
/// use parking_simulator_core_rs::ledger::{Finances, Ledger, PaymentKind, PricingConfig};
///
/// let mut finances = Finances::new(PricingConfig::default());
///
/// // 61 minutes = two started hours
/// let charged = finances.record_payment(61, 100, PaymentKind::Standard);
/// assert_eq!(charged, 500);
/// assert_eq!(finances.total_revenue(), 500);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Finances {
    pricing: PricingConfig,
    payments: Vec<Payment>,
}

impl Finances {
    pub fn new(pricing: PricingConfig) -> Self {
        Self {
            pricing,
            payments: Vec::new(),
        }
    }

    pub fn pricing(&self) -> &PricingConfig {
        &self.pricing
    }

    /// Price of a visit under the configured tariffs
    pub fn price(&self, duration_ticks: u64, kind: PaymentKind) -> i64 {
        match kind {
            PaymentKind::Standard => {
                let hours = duration_ticks.div_ceil(TICKS_PER_HOUR).max(1);
                hours as i64 * self.pricing.standard_hourly_rate_cents
            }
            PaymentKind::Subscriber => self.pricing.subscriber_visit_fee_cents,
        }
    }

    /// All payments in settlement order
    pub fn payments(&self) -> &[Payment] {
        &self.payments
    }

    pub fn total_revenue(&self) -> i64 {
        self.payments.iter().map(|p| p.amount_cents).sum()
    }

    pub fn revenue_by_kind(&self, kind: PaymentKind) -> i64 {
        self.payments
            .iter()
            .filter(|p| p.kind == kind)
            .map(|p| p.amount_cents)
            .sum()
    }

    /// Revenue settled during simulated day `day` (0-indexed)
    pub fn revenue_for_day(&self, day: u64) -> i64 {
        self.payments
            .iter()
            .filter(|p| p.settled_at_tick / TICKS_PER_DAY == day)
            .map(|p| p.amount_cents)
            .sum()
    }

    pub fn count_by_kind(&self, kind: PaymentKind) -> usize {
        self.payments.iter().filter(|p| p.kind == kind).count()
    }
}

impl Ledger for Finances {
    fn record_payment(
        &mut self,
        duration_ticks: u64,
        settled_at_tick: u64,
        kind: PaymentKind,
    ) -> i64 {
        let amount_cents = self.price(duration_ticks, kind);
        let id = format!("pay_{:08}", self.payments.len() + 1);
        self.payments.push(Payment {
            id,
            duration_ticks,
            settled_at_tick,
            kind,
            amount_cents,
        });
        amount_cents
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_charged_per_started_hour() {
        let finances = Finances::new(PricingConfig::default());
        assert_eq!(finances.price(0, PaymentKind::Standard), 250);
        assert_eq!(finances.price(60, PaymentKind::Standard), 250);
        assert_eq!(finances.price(61, PaymentKind::Standard), 500);
        assert_eq!(finances.price(615, PaymentKind::Standard), 11 * 250);
    }

    #[test]
    fn test_subscriber_pays_flat_fee() {
        let finances = Finances::new(PricingConfig {
            standard_hourly_rate_cents: 250,
            subscriber_visit_fee_cents: 75,
        });
        assert_eq!(finances.price(1, PaymentKind::Subscriber), 75);
        assert_eq!(finances.price(600, PaymentKind::Subscriber), 75);
    }

    #[test]
    fn test_payment_ids_are_unique() {
        let mut finances = Finances::new(PricingConfig::default());
        finances.record_payment(10, 20, PaymentKind::Standard);
        finances.record_payment(10, 20, PaymentKind::Standard);
        let payments = finances.payments();
        assert_ne!(payments[0].id, payments[1].id);
    }

    #[test]
    fn test_payment_ids_follow_settlement_order() {
        let record = || {
            let mut finances = Finances::new(PricingConfig::default());
            finances.record_payment(30, 40, PaymentKind::Standard);
            finances.record_payment(5, 41, PaymentKind::Subscriber);
            finances
        };

        let (a, b) = (record(), record());
        let ids: Vec<&str> = a.payments().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["pay_00000001", "pay_00000002"]);
        assert_eq!(a.payments(), b.payments());
    }
}
