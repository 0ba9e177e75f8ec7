//! Engine configuration.
//!
//! Every global knob — indicator periods, weight tables, bound constants —
//! lives here as data passed into the engine, so the computation itself has
//! no hidden tunables. Defaults reproduce the reference heuristics exactly.

use crate::{ForecastError, Period, Result};

/// Periods for the shared indicator bundle.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct IndicatorConfig {
    pub rsi_period: Period,
    pub bollinger_period: Period,
    /// Band half-width in sample standard deviations.
    pub bollinger_width: f64,
    pub macd_fast: Period,
    pub macd_slow: Period,
    pub macd_signal: Period,
    pub atr_period: Period,
    pub stochastic_k: Period,
    pub stochastic_d: Period,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            rsi_period: Period::new_const(14),
            bollinger_period: Period::new_const(20),
            bollinger_width: 2.0,
            macd_fast: Period::new_const(12),
            macd_slow: Period::new_const(26),
            macd_signal: Period::new_const(9),
            atr_period: Period::new_const(14),
            stochastic_k: Period::new_const(14),
            stochastic_d: Period::new_const(3),
        }
    }
}

impl IndicatorConfig {
    pub fn validate(&self) -> Result<()> {
        if self.macd_fast.get() >= self.macd_slow.get() {
            return Err(ForecastError::InvalidConfig(format!(
                "macd_fast ({}) must be shorter than macd_slow ({})",
                self.macd_fast.get(),
                self.macd_slow.get()
            )));
        }
        if !(self.bollinger_width.is_finite() && self.bollinger_width > 0.0) {
            return Err(ForecastError::InvalidValue(
                "bollinger_width must be a positive finite number",
            ));
        }
        Ok(())
    }
}

/// Base weights for the close-only predictor family. Must sum to 1 before
/// the policy's adjustments.
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
pub struct CloseWeights {
    pub linear: f64,
    pub moving_average: f64,
    pub momentum: f64,
    pub bollinger: f64,
}

impl CloseWeights {
    #[inline]
    pub fn sum(&self) -> f64 {
        self.linear + self.moving_average + self.momentum + self.bollinger
    }
}

/// Base weights for the OHLCV-aware predictor family.
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
pub struct OhlcvWeights {
    pub support_resistance: f64,
    pub volume_price: f64,
    pub volatility_breakout: f64,
    pub multi_timeframe: f64,
}

impl OhlcvWeights {
    #[inline]
    pub fn sum(&self) -> f64 {
        self.support_resistance + self.volume_price + self.volatility_breakout
            + self.multi_timeframe
    }
}

/// The weight policy's tables and regime thresholds.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct WeightConfig {
    // Close-only family.
    pub close_base: CloseWeights,
    /// Replaces `close_base` when the window is below `tiny_window`.
    pub close_tiny: CloseWeights,
    /// Replaces `close_base` when the window is below `short_window`.
    pub close_short: CloseWeights,
    /// Replaces `close_base` when the window is below `medium_window`.
    pub close_medium: CloseWeights,
    pub tiny_window: usize,
    pub short_window: usize,
    pub medium_window: usize,
    /// Return-stdev level above which the volatility regime kicks in.
    pub high_volatility: f64,
    /// Multiplier applied to the momentum weight in a high-volatility regime.
    pub momentum_damp: f64,
    /// Multiplier applied to the mean-reversion weight in that regime.
    pub reversion_boost: f64,

    // OHLCV family.
    pub ohlcv_base: OhlcvWeights,
    /// Weight the volume-price method collapses to when no volume exists;
    /// the freed mass is redistributed 50/25/25 to the other three methods.
    pub no_volume_residual: f64,
    /// Window below which support/resistance and multi-timeframe weights
    /// are overridden (simpler trend logic dominates short windows).
    pub ohlcv_short_window: usize,
    pub short_support_resistance: f64,
    pub short_multi_timeframe: f64,
    /// Window above which the level- and volatility-aware methods firm up.
    pub ohlcv_long_window: usize,
    pub long_support_resistance: f64,
    pub long_volatility_breakout: f64,
}

impl Default for WeightConfig {
    fn default() -> Self {
        Self {
            close_base: CloseWeights {
                linear: 0.25,
                moving_average: 0.30,
                momentum: 0.25,
                bollinger: 0.20,
            },
            close_tiny: CloseWeights {
                linear: 0.6,
                moving_average: 0.4,
                momentum: 0.0,
                bollinger: 0.0,
            },
            close_short: CloseWeights {
                linear: 0.4,
                moving_average: 0.4,
                momentum: 0.2,
                bollinger: 0.0,
            },
            close_medium: CloseWeights {
                linear: 0.3,
                moving_average: 0.35,
                momentum: 0.25,
                bollinger: 0.1,
            },
            tiny_window: 5,
            short_window: 10,
            medium_window: 20,
            high_volatility: 0.05,
            momentum_damp: 0.7,
            reversion_boost: 1.3,
            ohlcv_base: OhlcvWeights {
                support_resistance: 0.30,
                volume_price: 0.25,
                volatility_breakout: 0.25,
                multi_timeframe: 0.20,
            },
            no_volume_residual: 0.05,
            ohlcv_short_window: 10,
            short_support_resistance: 0.20,
            short_multi_timeframe: 0.40,
            ohlcv_long_window: 20,
            long_support_resistance: 0.35,
            long_volatility_breakout: 0.30,
        }
    }
}

impl WeightConfig {
    pub fn validate(&self) -> Result<()> {
        let tables = [
            ("close_base", self.close_base.sum()),
            ("close_tiny", self.close_tiny.sum()),
            ("close_short", self.close_short.sum()),
            ("close_medium", self.close_medium.sum()),
            ("ohlcv_base", self.ohlcv_base.sum()),
        ];
        for (name, sum) in tables {
            if !sum.is_finite() || sum <= 0.0 {
                return Err(ForecastError::InvalidConfig(format!(
                    "weight table {name} must have a positive finite sum, got {sum}"
                )));
            }
        }
        if !(self.tiny_window <= self.short_window && self.short_window <= self.medium_window) {
            return Err(ForecastError::InvalidConfig(format!(
                "window thresholds must be ordered: {} <= {} <= {}",
                self.tiny_window, self.short_window, self.medium_window
            )));
        }
        for (name, value) in [
            ("high_volatility", self.high_volatility),
            ("momentum_damp", self.momentum_damp),
            ("reversion_boost", self.reversion_boost),
            ("no_volume_residual", self.no_volume_residual),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ForecastError::InvalidConfig(format!(
                    "{name} must be a non-negative finite number, got {value}"
                )));
            }
        }
        if self.no_volume_residual > self.ohlcv_base.volume_price {
            return Err(ForecastError::InvalidConfig(format!(
                "no_volume_residual ({}) cannot exceed the volume_price base weight ({})",
                self.no_volume_residual, self.ohlcv_base.volume_price
            )));
        }
        Ok(())
    }
}

/// Constants for the final volatility clamp around the last close.
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
pub struct BoundsConfig {
    /// Hard cap on the allowed single-step fractional move.
    pub max_change_cap: f64,
    /// Multiplier on ATR/price for the OHLCV path.
    pub atr_factor: f64,
    /// Multiplier on the return stdev for the close-only path.
    pub stdev_factor: f64,
}

impl Default for BoundsConfig {
    fn default() -> Self {
        Self {
            max_change_cap: 0.15,
            atr_factor: 2.0,
            stdev_factor: 3.0,
        }
    }
}

impl BoundsConfig {
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("max_change_cap", self.max_change_cap),
            ("atr_factor", self.atr_factor),
            ("stdev_factor", self.stdev_factor),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ForecastError::InvalidConfig(format!(
                    "{name} must be a positive finite number, got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// Top-level engine configuration.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct EngineConfig {
    pub indicators: IndicatorConfig,
    pub weights: WeightConfig,
    pub bounds: BoundsConfig,
    /// Fractional drift applied to the last close for every
    /// insufficient-data fallback: `last * (1 + fallback_drift)`.
    pub fallback_drift: f64,
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        self.indicators.validate()?;
        self.weights.validate()?;
        self.bounds.validate()?;
        if !self.fallback_drift.is_finite() || self.fallback_drift <= -1.0 {
            return Err(ForecastError::InvalidValue(
                "fallback_drift must be finite and greater than -1",
            ));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            indicators: IndicatorConfig::default(),
            weights: WeightConfig::default(),
            bounds: BoundsConfig::default(),
            fallback_drift: 0.001,
        }
    }
}
