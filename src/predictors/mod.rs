//! Heuristic predictors.
//!
//! Each predictor is a pure function of the candle series and the shared
//! indicator bundle, producing one next-period price estimate. Predictors
//! never fail: outputs are floored at [`PRICE_FLOOR`] and every internal
//! degenerate case falls back to a small drift on the last close.
//!
//! # Families
//!
//! - **Close-driven** (work on any series): trend regression,
//!   moving-average alignment, momentum/RSI, Bollinger mean reversion.
//! - **OHLCV-driven** (need real bar data): support/resistance,
//!   volume-price confirmation, volatility breakout, multi-timeframe
//!   alignment.

/// Generate `with_defaults()` -> `Self::default()` for multiple predictor types.
macro_rules! impl_with_defaults {
  ($($predictor:ty),* $(,)?) => {
    $(impl $predictor {
      pub fn with_defaults() -> Self { Self::default() }
    })*
  };
}

pub mod flow;
pub mod levels;
pub mod oscillator;
pub mod trend;

pub use flow::*;
pub use levels::*;
pub use oscillator::*;
pub use trend::*;

/// Predictors never emit a price below this floor.
pub const PRICE_FLOOR: f64 = 0.01;

/// Apply the output floor.
#[inline]
pub(crate) fn floor_price(price: f64) -> f64 {
    price.max(PRICE_FLOOR)
}

/// Insufficient-data fallback: a small drift on the last close.
#[inline]
pub(crate) fn drift_fallback(last_close: f64, drift: f64) -> f64 {
    last_close * (1.0 + drift)
}

/// Fractional change from `then` to `now`, 0 when the base is zero.
#[inline]
pub(crate) fn fractional_change(now: f64, then: f64) -> f64 {
    if then == 0.0 {
        0.0
    } else {
        (now - then) / then
    }
}

/// Mean of the trailing `count` values (or all of them when fewer exist).
#[inline]
pub(crate) fn tail_mean(values: &[f64], count: usize) -> f64 {
    let start = values.len().saturating_sub(count);
    let tail = &values[start..];
    if tail.is_empty() {
        0.0
    } else {
        tail.iter().sum::<f64>() / tail.len() as f64
    }
}

/// Short-horizon trend: the 3-period fractional change, degrading to the
/// net 2-period change when fewer than 3 closes are available.
#[inline]
pub(crate) fn recent_trend(closes: &[f64]) -> f64 {
    let n = closes.len();
    if n >= 3 {
        fractional_change(closes[n - 1], closes[n - 3])
    } else if n == 2 {
        fractional_change(closes[1], closes[0])
    } else {
        0.0
    }
}
