//! Flow-driven predictors: volume confirmation of price moves, and
//! ATR-based breakout extension.

use std::collections::HashMap;

use crate::indicators::IndicatorSet;
use crate::params::{get_factor, get_period, get_ratio, ParamMeta, ParameterizedPredictor};
use crate::{methods, CandleSeries, Driver, ForecastError, MethodId, Predictor, Period, Ratio, Result};

use super::{drift_fallback, floor_price, fractional_change, tail_mean};

impl_with_defaults!(VolumePriceConfirmation, VolatilityBreakout);

// ============================================================
// VOLUME-PRICE CONFIRMATION
// ============================================================

/// Compares the current volume against the recent positive-volume average:
/// a volume spike confirms the latest move, dried-up volume leans toward
/// the short moving average, anything else continues the move weakly.
#[derive(Debug, Clone)]
pub struct VolumePriceConfirmation {
    /// Trailing candles considered for the volume baseline.
    pub lookback: Period,
    /// Volume ratio above which a move counts as confirmed.
    pub spike_ratio: f64,
    /// Volume ratio below which the market counts as dried up.
    pub dry_ratio: f64,
    /// Minimum fractional move that a spike can confirm.
    pub significant_change: f64,
    /// Continuation applied to a confirmed move.
    pub strong_continuation: Ratio,
    /// Continuation applied to an unconfirmed move.
    pub weak_continuation: Ratio,
    /// Pull toward the short moving average on dried-up volume.
    pub reversion_pull: Ratio,
    /// Drift used when too few candles carry volume.
    pub fallback_drift: f64,
}

impl Default for VolumePriceConfirmation {
    fn default() -> Self {
        Self {
            lookback: Period::new_const(5),
            spike_ratio: 1.5,
            dry_ratio: 0.5,
            significant_change: 0.01,
            strong_continuation: Ratio::new_const(0.5),
            weak_continuation: Ratio::new_const(0.2),
            reversion_pull: Ratio::new_const(0.3),
            fallback_drift: 0.001,
        }
    }
}

impl Predictor for VolumePriceConfirmation {
    fn id(&self) -> MethodId {
        MethodId(methods::VOLUME_PRICE)
    }

    fn min_window(&self) -> usize {
        3
    }

    fn driver(&self) -> Driver {
        Driver::Ohlcv
    }

    fn evaluate(&self, series: &CandleSeries, indicators: &IndicatorSet) -> f64 {
        let candles = series.candles();
        let closes = &indicators.closes;
        let n = closes.len();
        let current = &candles[n - 1];

        let start = n.saturating_sub(self.lookback.get());
        let recent_volumes: Vec<f64> = candles[start..]
            .iter()
            .filter(|c| c.volume > 0)
            .map(|c| c.volume as f64)
            .collect();
        if recent_volumes.len() < 2 {
            return floor_price(drift_fallback(current.close, self.fallback_drift));
        }

        let avg_volume = recent_volumes.iter().sum::<f64>() / recent_volumes.len() as f64;
        let volume_ratio = if avg_volume > 0.0 {
            current.volume as f64 / avg_volume
        } else {
            1.0
        };
        let price_change = fractional_change(current.close, closes[n - 2]);

        let prediction = if volume_ratio > self.spike_ratio
            && price_change.abs() > self.significant_change
        {
            current.close * (1.0 + price_change * self.strong_continuation.get())
        } else if volume_ratio < self.dry_ratio {
            let sma_short = tail_mean(closes, self.lookback.get());
            current.close + (sma_short - current.close) * self.reversion_pull.get()
        } else {
            current.close * (1.0 + price_change * self.weak_continuation.get())
        };
        floor_price(prediction)
    }

    fn validate_config(&self) -> Result<()> {
        if self.dry_ratio >= self.spike_ratio {
            return Err(ForecastError::InvalidConfig(format!(
                "dry_ratio ({}) must be below spike_ratio ({})",
                self.dry_ratio, self.spike_ratio
            )));
        }
        Ok(())
    }
}

// ============================================================
// VOLATILITY BREAKOUT
// ============================================================

/// An ATR spike extends the current candle's direction by half an ATR;
/// quiet volatility pulls the close toward the 10-period mean instead.
#[derive(Debug, Clone)]
pub struct VolatilityBreakout {
    /// ATR ratio over its recent average that counts as a breakout.
    pub breakout_ratio: f64,
    /// ATR fraction by which a breakout extends the move.
    pub atr_extension: Ratio,
    /// Pull toward the mean in a quiet regime.
    pub reversion_pull: Ratio,
    /// Trailing ATR values averaged for the baseline.
    pub atr_lookback: Period,
    /// Closes averaged for the quiet-regime mean.
    pub mean_period: Period,
}

impl Default for VolatilityBreakout {
    fn default() -> Self {
        Self {
            breakout_ratio: 1.5,
            atr_extension: Ratio::new_const(0.5),
            reversion_pull: Ratio::new_const(0.2),
            atr_lookback: Period::new_const(5),
            mean_period: Period::new_const(10),
        }
    }
}

impl Predictor for VolatilityBreakout {
    fn id(&self) -> MethodId {
        MethodId(methods::VOLATILITY_BREAKOUT)
    }

    fn min_window(&self) -> usize {
        10
    }

    fn driver(&self) -> Driver {
        Driver::Ohlcv
    }

    fn evaluate(&self, series: &CandleSeries, indicators: &IndicatorSet) -> f64 {
        let candles = series.candles();
        let closes = &indicators.closes;
        let current = &candles[candles.len() - 1];

        let current_atr = indicators.last_atr();
        let avg_atr = tail_mean(&indicators.atr, self.atr_lookback.get());

        let prediction = if current_atr > avg_atr * self.breakout_ratio {
            // Breakout: extend in the direction of the current body.
            if current.close > current.open {
                current.close + current_atr * self.atr_extension.get()
            } else {
                current.close - current_atr * self.atr_extension.get()
            }
        } else {
            let mean = tail_mean(closes, self.mean_period.get());
            current.close + (mean - current.close) * self.reversion_pull.get()
        };
        floor_price(prediction)
    }
}

// ============================================================
// PARAMETER METADATA
// ============================================================

static VOLUME_PRICE_CONFIRMATION_PARAMS: &[ParamMeta] = &[
    ParamMeta::period("lookback", 5.0, (3.0, 10.0, 1.0), "Volume baseline window"),
    ParamMeta::factor("spike_ratio", 1.5, (1.2, 3.0, 0.1), "Volume spike threshold"),
    ParamMeta::factor("dry_ratio", 0.5, (0.2, 0.8, 0.1), "Dried-up volume threshold"),
    ParamMeta::ratio(
        "strong_continuation",
        0.5,
        (0.2, 0.8, 0.1),
        "Continuation on a confirmed move",
    ),
    ParamMeta::ratio(
        "reversion_pull",
        0.3,
        (0.1, 0.6, 0.1),
        "Pull toward the short SMA on dried-up volume",
    ),
];

static VOLATILITY_BREAKOUT_PARAMS: &[ParamMeta] = &[
    ParamMeta::factor("breakout_ratio", 1.5, (1.2, 2.5, 0.1), "ATR spike threshold"),
    ParamMeta::ratio(
        "atr_extension",
        0.5,
        (0.2, 1.0, 0.1),
        "ATR fraction extending a breakout",
    ),
    ParamMeta::ratio(
        "reversion_pull",
        0.2,
        (0.1, 0.5, 0.1),
        "Pull toward the mean in a quiet regime",
    ),
];

impl ParameterizedPredictor for VolumePriceConfirmation {
    fn param_meta() -> &'static [ParamMeta] {
        VOLUME_PRICE_CONFIRMATION_PARAMS
    }

    fn with_params(params: &HashMap<&str, f64>) -> Result<Self> {
        let predictor = Self {
            lookback: get_period(params, "lookback", 5)?,
            spike_ratio: get_factor(params, "spike_ratio", 1.5)?,
            dry_ratio: get_factor(params, "dry_ratio", 0.5)?,
            strong_continuation: get_ratio(params, "strong_continuation", 0.5)?,
            reversion_pull: get_ratio(params, "reversion_pull", 0.3)?,
            ..Self::default()
        };
        predictor.validate_config()?;
        Ok(predictor)
    }

    fn method_str() -> &'static str {
        methods::VOLUME_PRICE
    }
}

impl ParameterizedPredictor for VolatilityBreakout {
    fn param_meta() -> &'static [ParamMeta] {
        VOLATILITY_BREAKOUT_PARAMS
    }

    fn with_params(params: &HashMap<&str, f64>) -> Result<Self> {
        Ok(Self {
            breakout_ratio: get_factor(params, "breakout_ratio", 1.5)?,
            atr_extension: get_ratio(params, "atr_extension", 0.5)?,
            reversion_pull: get_ratio(params, "reversion_pull", 0.2)?,
            ..Self::default()
        })
    }

    fn method_str() -> &'static str {
        methods::VOLATILITY_BREAKOUT
    }
}

// ============================================================
// TESTS
// ============================================================
