use std::time::Duration;

use core_sim::SimulationEngine;
use rand::rngs::StdRng;
use rand::Rng;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::events::{PriceUpdate, SchedulerPhase, SchedulerReport, TickOutcome};
use crate::metrics::TickLatencyMetrics;
use crate::notifier::PriceNotifier;
use crate::store::{StockStore, StoreError};

pub const DEFAULT_MIN_SLEEP: Duration = Duration::from_secs(1);
pub const DEFAULT_MAX_SLEEP: Duration = Duration::from_secs(360);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerConfig {
    min_sleep: Duration,
    max_sleep: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SchedulerConfigError {
    #[error("minimum sleep between ticks must be at least one second")]
    MinSleepTooShort,
    #[error("minimum sleep {min:?} exceeds maximum sleep {max:?}")]
    InvertedSleepRange { min: Duration, max: Duration },
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            min_sleep: DEFAULT_MIN_SLEEP,
            max_sleep: DEFAULT_MAX_SLEEP,
        }
    }
}

impl SchedulerConfig {
    pub fn new(min_sleep: Duration, max_sleep: Duration) -> Result<Self, SchedulerConfigError> {
        if min_sleep < Duration::from_secs(1) {
            return Err(SchedulerConfigError::MinSleepTooShort);
        }
        if min_sleep > max_sleep {
            return Err(SchedulerConfigError::InvertedSleepRange {
                min: min_sleep,
                max: max_sleep,
            });
        }

        Ok(Self {
            min_sleep,
            max_sleep,
        })
    }

    pub fn min_sleep(&self) -> Duration {
        self.min_sleep
    }

    pub fn max_sleep(&self) -> Duration {
        self.max_sleep
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TickError {
    #[error("failed to fetch stocks: {0}")]
    Fetch(#[source] StoreError),
    #[error("failed to persist stocks: {0}")]
    Persist(#[source] StoreError),
}

/// Background loop applying the simulation engine to every stored stock.
///
/// Each tick fetches all stocks, steps each one through the engine, saves the
/// batch in one call and hands it to the notifier. Ticks are separated by a
/// random whole-second sleep within the configured range. Shutdown is only
/// observed between ticks and while sleeping.
pub struct SimulationScheduler<S, N, R = StdRng> {
    store: S,
    notifier: N,
    engine: SimulationEngine<R>,
    config: SchedulerConfig,
    phase: watch::Sender<SchedulerPhase>,
    metrics: TickLatencyMetrics,
    report: SchedulerReport,
}

impl<S, N, R> SimulationScheduler<S, N, R>
where
    S: StockStore,
    N: PriceNotifier,
    R: Rng + Send,
{
    pub fn new(store: S, notifier: N, engine: SimulationEngine<R>, config: SchedulerConfig) -> Self {
        let (phase, _) = watch::channel(SchedulerPhase::Idle);
        Self {
            store,
            notifier,
            engine,
            config,
            phase,
            metrics: TickLatencyMetrics::new(),
            report: SchedulerReport::default(),
        }
    }

    pub fn subscribe_phase(&self) -> watch::Receiver<SchedulerPhase> {
        self.phase.subscribe()
    }

    pub fn report(&self) -> SchedulerReport {
        SchedulerReport {
            tick_latency: self.metrics.percentiles(),
            ..self.report
        }
    }

    /// Runs a single fetch, update, persist and notify cycle.
    pub async fn tick(&mut self) -> Result<TickOutcome, TickError> {
        self.report.ticks += 1;
        let tick = self.report.ticks;

        self.set_phase(SchedulerPhase::Fetching);
        let mut stocks = self.store.fetch_all().await.map_err(TickError::Fetch)?;

        self.set_phase(SchedulerPhase::Processing);
        for stock in &mut stocks {
            self.engine.step(stock);
        }

        self.set_phase(SchedulerPhase::Persisting);
        self.store
            .save_all(&stocks)
            .await
            .map_err(TickError::Persist)?;

        self.set_phase(SchedulerPhase::Notifying);
        let mut updates = Vec::with_capacity(stocks.len());
        for stock in stocks {
            let previous_price = match self.store.previous_price(stock.id).await {
                Ok(price) => price,
                Err(err) => {
                    warn!(tick, stock = %stock.id, error = %err, "failed to look up previous price");
                    None
                }
            };
            updates.push(PriceUpdate {
                stock,
                previous_price,
            });
        }
        let notified = match self.notifier.notify(&updates).await {
            Ok(()) => true,
            Err(err) => {
                warn!(tick, error = %err, "failed to notify price subscribers");
                false
            }
        };

        Ok(TickOutcome {
            tick,
            updated: updates.len(),
            notified,
        })
    }

    /// Draws the pause before the next tick.
    pub fn next_sleep(&mut self) -> Duration {
        let min = self.config.min_sleep.as_secs();
        let max = self.config.max_sleep.as_secs();
        Duration::from_secs(self.engine.rng_mut().gen_range(min..=max))
    }

    /// Loops until `shutdown` carries `true` or its sender is dropped.
    ///
    /// The returned report carries latency percentiles for the most recent
    /// ticks.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) -> SchedulerReport {
        info!(
            min_sleep_secs = self.config.min_sleep.as_secs(),
            max_sleep_secs = self.config.max_sleep.as_secs(),
            "stock simulation started"
        );

        while !shutdown_signalled(&mut shutdown) {
            let started = Instant::now();
            match self.tick().await {
                Ok(outcome) => info!(
                    tick = outcome.tick,
                    stocks = outcome.updated,
                    notified = outcome.notified,
                    "stock prices updated"
                ),
                Err(err) => {
                    self.report.failed_ticks += 1;
                    error!(tick = self.report.ticks, error = %err, "stock simulation tick failed");
                }
            }
            let elapsed_micros = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
            self.metrics.record_latency_micros(elapsed_micros);

            let pause = self.next_sleep();
            debug!(sleep_secs = pause.as_secs(), "waiting for next tick");
            self.set_phase(SchedulerPhase::Sleeping);
            tokio::select! {
                _ = tokio::time::sleep(pause) => {}
                _ = shutdown_requested(&mut shutdown) => break,
            }
            self.set_phase(SchedulerPhase::Idle);
        }

        self.set_phase(SchedulerPhase::Cancelled);
        let report = self.report();
        match report.tick_latency {
            Some(latency) => info!(
                ticks = report.ticks,
                failed_ticks = report.failed_ticks,
                p50_micros = latency.p50_micros,
                p99_micros = latency.p99_micros,
                max_micros = latency.max_micros,
                "stock simulation stopped"
            ),
            None => info!(ticks = report.ticks, "stock simulation stopped"),
        }
        report
    }

    fn set_phase(&self, phase: SchedulerPhase) {
        self.phase.send_replace(phase);
    }
}

/// True once shutdown was requested or the sender is gone.
fn shutdown_signalled(shutdown: &mut watch::Receiver<bool>) -> bool {
    let requested = *shutdown.borrow_and_update();
    requested || shutdown.has_changed().is_err()
}

async fn shutdown_requested(shutdown: &mut watch::Receiver<bool>) {
    loop {
        if *shutdown.borrow_and_update() {
            return;
        }
        if shutdown.changed().await.is_err() {
            return;
        }
    }
}
