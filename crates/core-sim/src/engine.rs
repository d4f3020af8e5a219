use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use time::OffsetDateTime;

use crate::config::SimConfig;
use crate::stock::Stock;
use crate::transitions::{next_price, next_state, signed_change};

/// Drives one stock at a time through the state and price tables.
///
/// The engine owns its random source and nothing else; a stock's update
/// depends only on that stock and the draws taken for it.
#[derive(Debug, Clone)]
pub struct SimulationEngine<R = StdRng> {
    rng: R,
    config: SimConfig,
}

impl SimulationEngine<StdRng> {
    pub fn from_seed(seed: u64, config: SimConfig) -> Self {
        Self::new(StdRng::seed_from_u64(seed), config)
    }

    pub fn from_entropy(config: SimConfig) -> Self {
        Self::new(StdRng::from_entropy(), config)
    }
}

impl<R: Rng> SimulationEngine<R> {
    pub fn new(rng: R, config: SimConfig) -> Self {
        Self { rng, config }
    }

    pub fn rng_mut(&mut self) -> &mut R {
        &mut self.rng
    }

    pub fn update_state(&mut self, stock: &mut Stock) {
        let draw = self.rng.gen::<f64>();
        stock.state = next_state(stock.state, draw, self.config.trend_persistence);
    }

    pub fn update_price(&mut self, stock: &mut Stock) {
        self.update_price_at(stock, OffsetDateTime::now_utc());
    }

    pub fn update_price_at(&mut self, stock: &mut Stock, now: OffsetDateTime) {
        // Both draws are taken for every state to keep the draw sequence
        // independent of which states the stocks happen to be in.
        let magnitude_draw = self.rng.gen::<f64>();
        let sign_draw = self.rng.gen::<f64>();

        let change = signed_change(stock.state, magnitude_draw, sign_draw, &self.config);
        stock.price = next_price(stock.price, stock.initial_price(), change, &self.config);
        stock.updated_at = now;
    }

    /// One simulation tick for `stock`: the new state decides this tick's move.
    pub fn step(&mut self, stock: &mut Stock) {
        self.update_state(stock);
        self.update_price(stock);
    }
}
