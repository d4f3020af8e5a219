use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;

/// Uniform range of fractional price moves, e.g. `0.003` for 0.3%.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChangeRange {
    pub min: Decimal,
    pub max: Decimal,
}

impl ChangeRange {
    pub const fn new(min: Decimal, max: Decimal) -> Self {
        Self { min, max }
    }

    /// Maps a draw in `[0, 1)` linearly onto `[min, max]`.
    pub fn sample(&self, draw: f64) -> Decimal {
        let unit = Decimal::from_f64(draw.clamp(0.0, 1.0)).unwrap_or(Decimal::ZERO);
        self.min + unit * (self.max - self.min)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimConfig {
    /// `K` in the drift band `[initial / K, initial * K]`.
    pub deviation_factor: Decimal,
    pub price_floor: Decimal,
    /// Probability that a trending stock keeps its trend for another tick.
    pub trend_persistence: f64,
    pub stable_change: ChangeRange,
    pub trend_change: ChangeRange,
    pub volatile_change: ChangeRange,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            deviation_factor: Decimal::TWO,
            price_floor: Decimal::new(1, 2),
            trend_persistence: 0.7,
            stable_change: ChangeRange::new(Decimal::new(5, 4), Decimal::new(3, 3)),
            trend_change: ChangeRange::new(Decimal::new(3, 3), Decimal::new(15, 3)),
            volatile_change: ChangeRange::new(Decimal::new(2, 2), Decimal::new(5, 2)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum SimConfigError {
    #[error("deviation factor must be greater than 1, got {0}")]
    InvalidDeviationFactor(Decimal),
    #[error("price floor must be positive, got {0}")]
    InvalidPriceFloor(Decimal),
    #[error("trend persistence must be a probability, got {0}")]
    InvalidTrendPersistence(f64),
    #[error("change range [{min}, {max}] must be non-negative and ordered")]
    InvalidChangeRange { min: Decimal, max: Decimal },
}

impl SimConfig {
    pub fn with_deviation_factor(mut self, deviation_factor: Decimal) -> Result<Self, SimConfigError> {
        self.deviation_factor = deviation_factor;
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), SimConfigError> {
        if self.deviation_factor <= Decimal::ONE {
            return Err(SimConfigError::InvalidDeviationFactor(self.deviation_factor));
        }
        if self.price_floor <= Decimal::ZERO {
            return Err(SimConfigError::InvalidPriceFloor(self.price_floor));
        }
        if !self.trend_persistence.is_finite() || !(0.0..=1.0).contains(&self.trend_persistence) {
            return Err(SimConfigError::InvalidTrendPersistence(self.trend_persistence));
        }
        for range in [self.stable_change, self.trend_change, self.volatile_change] {
            if range.min < Decimal::ZERO || range.min > range.max {
                return Err(SimConfigError::InvalidChangeRange {
                    min: range.min,
                    max: range.max,
                });
            }
        }

        Ok(())
    }

    /// Lower and upper bound a stock anchored at `initial_price` may reach.
    pub fn drift_band(&self, initial_price: Decimal) -> (Decimal, Decimal) {
        let lower = initial_price
            .checked_div(self.deviation_factor)
            .unwrap_or(Decimal::ZERO);
        let upper = initial_price
            .checked_mul(self.deviation_factor)
            .unwrap_or(Decimal::MAX);
        (lower, upper)
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::{ChangeRange, SimConfig, SimConfigError};

    #[test]
    fn defaults_match_observed_simulation() {
        let config = SimConfig::default();

        assert_eq!(config.deviation_factor, dec!(2));
        assert_eq!(config.price_floor, dec!(0.01));
        assert_eq!(config.trend_persistence, 0.7);
        assert_eq!(config.stable_change, ChangeRange::new(dec!(0.0005), dec!(0.003)));
        assert_eq!(config.trend_change, ChangeRange::new(dec!(0.003), dec!(0.015)));
        assert_eq!(config.volatile_change, ChangeRange::new(dec!(0.02), dec!(0.05)));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn drift_band_scales_initial_price() {
        let (lower, upper) = SimConfig::default().drift_band(dec!(100));

        assert_eq!(lower, dec!(50));
        assert_eq!(upper, dec!(200));
    }

    #[test]
    fn rejects_deviation_factor_at_or_below_one() {
        assert_eq!(
            SimConfig::default().with_deviation_factor(dec!(1)),
            Err(SimConfigError::InvalidDeviationFactor(dec!(1)))
        );
        assert!(SimConfig::default().with_deviation_factor(dec!(3.5)).is_ok());
    }

    #[test]
    fn rejects_inverted_change_range() {
        let config = SimConfig {
            volatile_change: ChangeRange::new(dec!(0.05), dec!(0.02)),
            ..SimConfig::default()
        };

        assert!(matches!(
            config.validate(),
            Err(SimConfigError::InvalidChangeRange { .. })
        ));
    }

    #[test]
    fn sample_maps_draw_endpoints_onto_range() {
        let range = ChangeRange::new(dec!(0.02), dec!(0.05));

        assert_eq!(range.sample(0.0), dec!(0.02));
        assert_eq!(range.sample(1.0), dec!(0.05));
        assert_eq!(range.sample(0.5), dec!(0.035));
    }
}
