pub mod events;
pub mod logging;
pub mod metrics;
pub mod notifier;
pub mod scheduler;
pub mod store;

pub use events::{PriceUpdate, SchedulerPhase, SchedulerReport, TickOutcome};
pub use metrics::LatencyPercentiles;
pub use notifier::{NoopNotifier, NotifyError, PriceNotifier};
pub use scheduler::{SchedulerConfig, SchedulerConfigError, SimulationScheduler, TickError};
pub use store::{InMemoryStockStore, PricePoint, StockStore, StoreError};
