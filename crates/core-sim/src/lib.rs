mod config;
mod engine;
mod stock;
pub mod transitions;

pub use config::{ChangeRange, SimConfig, SimConfigError};
pub use engine::SimulationEngine;
pub use stock::{Stock, StockError, StockId, StockState};
