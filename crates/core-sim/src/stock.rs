use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StockId(Uuid);

impl StockId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for StockId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for StockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Market behaviour of a stock; selects the distribution of the next price move.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockState {
    #[default]
    Stable,
    Rising,
    Falling,
    Volatile,
}

impl StockState {
    pub const ALL: [Self; 4] = [Self::Stable, Self::Rising, Self::Falling, Self::Volatile];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Stable => "stable",
            Self::Rising => "rising",
            Self::Falling => "falling",
            Self::Volatile => "volatile",
        }
    }

    /// The only states a single transition may move to from `self`.
    pub fn successors(self) -> [Self; 2] {
        match self {
            Self::Stable | Self::Volatile => [Self::Rising, Self::Falling],
            Self::Rising => [Self::Rising, Self::Stable],
            Self::Falling => [Self::Falling, Self::Stable],
        }
    }
}

impl fmt::Display for StockState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum StockError {
    #[error("initial price must be positive, got {0}")]
    NonPositivePrice(Decimal),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stock {
    pub id: StockId,
    pub symbol: String,
    pub title: String,
    pub price: Decimal,
    initial_price: Decimal,
    pub state: StockState,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Stock {
    /// Creates a stock whose current price starts at `initial_price`.
    ///
    /// The initial price anchors the drift band for the lifetime of the stock,
    /// so it has to be strictly positive.
    pub fn new(
        symbol: impl Into<String>,
        title: impl Into<String>,
        initial_price: Decimal,
        state: StockState,
    ) -> Result<Self, StockError> {
        if initial_price <= Decimal::ZERO {
            return Err(StockError::NonPositivePrice(initial_price));
        }

        let now = OffsetDateTime::now_utc();
        Ok(Self {
            id: StockId::new(),
            symbol: symbol.into(),
            title: title.into(),
            price: initial_price,
            initial_price,
            state,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn initial_price(&self) -> Decimal {
        self.initial_price
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::{Stock, StockError, StockState};

    #[test]
    fn new_stock_starts_at_initial_price() {
        let stock = Stock::new("ACME", "Acme Corp", dec!(42.5), StockState::default()).unwrap();

        assert_eq!(stock.price, dec!(42.5));
        assert_eq!(stock.initial_price(), dec!(42.5));
        assert_eq!(stock.state, StockState::Stable);
        assert_eq!(stock.created_at, stock.updated_at);
    }

    #[test]
    fn rejects_non_positive_initial_price() {
        assert_eq!(
            Stock::new("ZERO", "Zero", dec!(0), StockState::Stable),
            Err(StockError::NonPositivePrice(dec!(0)))
        );
        assert!(Stock::new("NEG", "Negative", dec!(-1), StockState::Rising).is_err());
    }

    #[test]
    fn volatile_is_never_a_successor() {
        for state in StockState::ALL {
            assert!(!state.successors().contains(&StockState::Volatile));
        }
    }

    #[test]
    fn serializes_state_in_snake_case_and_price_as_string() {
        let stock = Stock::new("ACME", "Acme Corp", dec!(10.25), StockState::Volatile).unwrap();

        let json = serde_json::to_value(&stock).unwrap();

        assert_eq!(json["state"], "volatile");
        assert_eq!(json["price"], "10.25");
        assert_eq!(json["initial_price"], "10.25");
    }
}
