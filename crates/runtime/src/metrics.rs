use std::collections::VecDeque;

/// Most recent tick latencies kept for percentile reporting.
pub const TICK_LATENCY_WINDOW: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatencyPercentiles {
    pub count: usize,
    pub p50_micros: u64,
    pub p90_micros: u64,
    pub p95_micros: u64,
    pub p99_micros: u64,
    pub max_micros: u64,
}

/// Wall time spent per scheduler tick, fetch through notify, over the last
/// `TICK_LATENCY_WINDOW` ticks.
#[derive(Debug, Default, Clone)]
pub struct TickLatencyMetrics {
    latencies_micros: VecDeque<u64>,
}

impl TickLatencyMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_latency_micros(&mut self, latency_micros: u64) {
        if self.latencies_micros.len() == TICK_LATENCY_WINDOW {
            self.latencies_micros.pop_front();
        }
        self.latencies_micros.push_back(latency_micros);
    }

    pub fn percentiles(&self) -> Option<LatencyPercentiles> {
        if self.latencies_micros.is_empty() {
            return None;
        }

        let mut sorted: Vec<u64> = self.latencies_micros.iter().copied().collect();
        sorted.sort_unstable();
        let count = sorted.len();

        Some(LatencyPercentiles {
            count,
            p50_micros: percentile_nearest_rank(&sorted, 50),
            p90_micros: percentile_nearest_rank(&sorted, 90),
            p95_micros: percentile_nearest_rank(&sorted, 95),
            p99_micros: percentile_nearest_rank(&sorted, 99),
            max_micros: sorted[count - 1],
        })
    }
}

fn percentile_nearest_rank(sorted: &[u64], percentile: usize) -> u64 {
    let count = sorted.len();
    let rank = (percentile * count).div_ceil(100);
    sorted[rank.saturating_sub(1)]
}

#[cfg(test)]
mod tests {
    use super::{TickLatencyMetrics, TICK_LATENCY_WINDOW};

    #[test]
    fn no_samples_means_no_report() {
        assert!(TickLatencyMetrics::new().percentiles().is_none());
    }

    #[test]
    fn tick_latency_percentiles_use_nearest_rank() {
        let mut metrics = TickLatencyMetrics::new();
        for latency in [40, 10, 30, 20, 900] {
            metrics.record_latency_micros(latency);
        }

        let report = metrics.percentiles().unwrap();

        assert_eq!(report.count, 5);
        assert_eq!(report.p50_micros, 30);
        assert_eq!(report.p90_micros, 900);
        assert_eq!(report.max_micros, 900);
    }

    #[test]
    fn only_the_latest_window_is_kept() {
        let mut metrics = TickLatencyMetrics::new();
        for latency in 0..(TICK_LATENCY_WINDOW as u64 + 10) {
            metrics.record_latency_micros(latency);
        }

        let report = metrics.percentiles().unwrap();

        assert_eq!(report.count, TICK_LATENCY_WINDOW);
        assert_eq!(report.p50_micros, 521);
        assert_eq!(report.max_micros, TICK_LATENCY_WINDOW as u64 + 9);
    }
}
