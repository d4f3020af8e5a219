use std::fmt;

use core_sim::Stock;
use rust_decimal::Decimal;

use crate::metrics::LatencyPercentiles;

/// Where the scheduler loop currently is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SchedulerPhase {
    #[default]
    Idle,
    Fetching,
    Processing,
    Persisting,
    Notifying,
    Sleeping,
    Cancelled,
}

impl SchedulerPhase {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Fetching => "fetching",
            Self::Processing => "processing",
            Self::Persisting => "persisting",
            Self::Notifying => "notifying",
            Self::Sleeping => "sleeping",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for SchedulerPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickOutcome {
    pub tick: u64,
    pub updated: usize,
    pub notified: bool,
}

/// A freshly saved stock and the price its last save replaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceUpdate {
    pub stock: Stock,
    pub previous_price: Option<Decimal>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchedulerReport {
    pub ticks: u64,
    pub failed_ticks: u64,
    /// Percentiles over the most recent ticks; `None` before the first tick.
    pub tick_latency: Option<LatencyPercentiles>,
}
