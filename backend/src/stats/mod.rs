//! Time series aggregated from tick results
//!
//! Fed from a channel subscription (or directly with `record`), a
//! [`TimeSeries`] keeps one sample per tick plus per-day revenue, which is
//! what occupancy and revenue charts plot.

use crate::core::time::TICKS_PER_DAY;
use crate::orchestrator::TickResult;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::mpsc::Receiver;

/// One tick's observable values
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub tick: u64,
    pub occupied: usize,
    /// Occupied share of capacity in [0, 1]
    pub occupancy: f64,
    pub entrance_queue_len: usize,
    pub payment_queue_len: usize,
    pub exit_queue_len: usize,
    pub revenue_cents: i64,
}

impl From<&TickResult> for Sample {
    fn from(result: &TickResult) -> Self {
        let occupancy = if result.capacity == 0 {
            0.0
        } else {
            result.occupied as f64 / result.capacity as f64
        };

        Self {
            tick: result.tick,
            occupied: result.occupied,
            occupancy,
            entrance_queue_len: result.entrance_queue_len,
            payment_queue_len: result.payment_queue_len,
            exit_queue_len: result.exit_queue_len,
            revenue_cents: result.revenue_cents,
        }
    }
}

/// Per-tick samples and per-day revenue
///
/// # Example
///
/// ```rust
/// use parking_simulator_core_rs::{TickResult, TimeSeries};
///
/// let mut series = TimeSeries::new();
/// series.record(&TickResult { tick: 1, occupied: 5, capacity: 10, revenue_cents: 250, ..Default::default() });
/// series.record(&TickResult { tick: 2, occupied: 7, capacity: 10, ..Default::default() });
///
/// assert_eq!(series.len(), 2);
/// assert_eq!(series.peak_occupied(), 7);
/// assert_eq!(series.total_revenue(), 250);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimeSeries {
    samples: Vec<Sample>,
    daily_revenue: BTreeMap<u64, i64>,
    turned_away: u64,
}

impl TimeSeries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, result: &TickResult) {
        self.samples.push(Sample::from(result));
        let day = result.tick / TICKS_PER_DAY;
        *self.daily_revenue.entry(day).or_insert(0) += result.revenue_cents;
        self.turned_away += result.turned_away as u64;
    }

    /// Record every result already waiting on `rx` without blocking
    ///
    /// Returns the number of results taken.
    pub fn drain(&mut self, rx: &Receiver<TickResult>) -> usize {
        let mut taken = 0;
        while let Ok(result) = rx.try_recv() {
            self.record(&result);
            taken += 1;
        }
        taken
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Revenue per simulated day, keyed by day index
    pub fn daily_revenue(&self) -> &BTreeMap<u64, i64> {
        &self.daily_revenue
    }

    pub fn total_revenue(&self) -> i64 {
        self.daily_revenue.values().sum()
    }

    pub fn turned_away(&self) -> u64 {
        self.turned_away
    }

    pub fn peak_occupied(&self) -> usize {
        self.samples.iter().map(|s| s.occupied).max().unwrap_or(0)
    }

    pub fn mean_occupancy(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        self.samples.iter().map(|s| s.occupancy).sum::<f64>() / self.samples.len() as f64
    }

    pub fn peak_entrance_queue(&self) -> usize {
        self.samples
            .iter()
            .map(|s| s.entrance_queue_len)
            .max()
            .unwrap_or(0)
    }
}
