//! Pure transition tables of the price simulation.
//!
//! Every function here takes its random draws as explicit arguments in
//! `[0, 1)`, so the tables can be exercised without any random source.

use rust_decimal::Decimal;

use crate::config::SimConfig;
use crate::stock::StockState;

/// Prices are kept to this many fractional digits.
pub const PRICE_SCALE: u32 = 6;

const COIN_FLIP: f64 = 0.5;

pub fn next_state(state: StockState, draw: f64, trend_persistence: f64) -> StockState {
    match state {
        StockState::Stable | StockState::Volatile => {
            if draw < COIN_FLIP {
                StockState::Rising
            } else {
                StockState::Falling
            }
        }
        StockState::Rising => {
            if draw < trend_persistence {
                StockState::Rising
            } else {
                StockState::Stable
            }
        }
        StockState::Falling => {
            if draw < trend_persistence {
                StockState::Falling
            } else {
                StockState::Stable
            }
        }
    }
}

/// Fractional price move for one tick in `state`.
///
/// Stable moves are never negative. `sign_draw` only matters for Volatile.
pub fn signed_change(
    state: StockState,
    magnitude_draw: f64,
    sign_draw: f64,
    config: &SimConfig,
) -> Decimal {
    match state {
        StockState::Stable => config.stable_change.sample(magnitude_draw),
        StockState::Rising => config.trend_change.sample(magnitude_draw),
        StockState::Falling => -config.trend_change.sample(magnitude_draw),
        StockState::Volatile => {
            let magnitude = config.volatile_change.sample(magnitude_draw);
            if sign_draw < COIN_FLIP {
                magnitude
            } else {
                -magnitude
            }
        }
    }
}

/// Applies `change` to `price`, reflecting off the drift band of `initial_price`.
///
/// A move that would leave the band is replaced by the same magnitude in the
/// opposite direction. The result is then clamped into the band and floored
/// at `config.price_floor`, in that order.
pub fn next_price(
    price: Decimal,
    initial_price: Decimal,
    change: Decimal,
    config: &SimConfig,
) -> Decimal {
    let (lower, upper) = config.drift_band(initial_price);
    let magnitude = change.abs();

    let mut candidate = scale(price, Decimal::ONE + change);
    if candidate > upper {
        candidate = scale(price, Decimal::ONE - magnitude);
    } else if candidate < lower {
        candidate = scale(price, Decimal::ONE + magnitude);
    }

    candidate
        .round_dp(PRICE_SCALE)
        .max(lower)
        .min(upper)
        .max(config.price_floor)
}

fn scale(price: Decimal, factor: Decimal) -> Decimal {
    price.checked_mul(factor).unwrap_or(price)
}
