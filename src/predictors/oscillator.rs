//! Oscillator-driven predictors: momentum with an RSI overlay, and
//! Bollinger-band mean reversion.

use std::collections::HashMap;

use crate::indicators::IndicatorSet;
use crate::params::{get_factor, get_ratio, ParamMeta, ParameterizedPredictor};
use crate::{methods, CandleSeries, Driver, ForecastError, MethodId, Predictor, Ratio, Result};

use super::{drift_fallback, floor_price, fractional_change};

impl_with_defaults!(MomentumRsi, BollingerReversion);

// ============================================================
// MOMENTUM + RSI
// ============================================================

/// Averages the 3- and 5-period momentum and nudges the result when RSI
/// signals an overbought or oversold market.
#[derive(Debug, Clone)]
pub struct MomentumRsi {
    /// RSI above this pushes the prediction down.
    pub overbought: f64,
    /// RSI below this pushes the prediction up.
    pub oversold: f64,
    /// Fixed fractional adjustment applied at the RSI extremes.
    pub rsi_shift: f64,
    /// Dampening applied to the averaged momentum.
    pub momentum_scale: Ratio,
}

impl Default for MomentumRsi {
    fn default() -> Self {
        Self {
            overbought: 70.0,
            oversold: 30.0,
            rsi_shift: 0.02,
            momentum_scale: Ratio::new_const(0.7),
        }
    }
}

impl Predictor for MomentumRsi {
    fn id(&self) -> MethodId {
        MethodId(methods::MOMENTUM)
    }

    fn min_window(&self) -> usize {
        5
    }

    fn driver(&self) -> Driver {
        Driver::Close
    }

    fn evaluate(&self, _series: &CandleSeries, indicators: &IndicatorSet) -> f64 {
        let closes = &indicators.closes;
        let n = closes.len();
        let current = closes[n - 1];

        let momentum_3 = if n >= 4 {
            fractional_change(current, closes[n - 4])
        } else {
            0.0
        };
        let momentum_5 = if n >= 6 {
            fractional_change(current, closes[n - 6])
        } else {
            0.0
        };

        let rsi = indicators.last_rsi();
        let rsi_factor = if rsi > self.overbought {
            -self.rsi_shift
        } else if rsi < self.oversold {
            self.rsi_shift
        } else {
            0.0
        };

        let momentum_avg = (momentum_3 + momentum_5) / 2.0;
        let predicted_change = momentum_avg * self.momentum_scale.get() + rsi_factor;
        floor_price(current * (1.0 + predicted_change))
    }

    fn validate_config(&self) -> Result<()> {
        if self.oversold >= self.overbought {
            return Err(ForecastError::InvalidConfig(format!(
                "oversold ({}) must be below overbought ({})",
                self.oversold, self.overbought
            )));
        }
        if !(0.0..=100.0).contains(&self.overbought) || !(0.0..=100.0).contains(&self.oversold) {
            return Err(ForecastError::InvalidValue(
                "RSI thresholds must lie in [0, 100]",
            ));
        }
        Ok(())
    }
}

// ============================================================
// BOLLINGER MEAN REVERSION
// ============================================================

/// Position within the Bollinger envelope: prices near either band revert
/// toward the middle, prices mid-band continue the short-term trend.
#[derive(Debug, Clone)]
pub struct BollingerReversion {
    /// Band position above which the price counts as stretched high.
    pub upper_edge: Ratio,
    /// Band position below which the price counts as stretched low.
    pub lower_edge: Ratio,
    /// Pull toward the middle band at the stretches.
    pub reversion_pull: Ratio,
    /// Scale on the 3-period trend in the middle of the envelope.
    pub trend_scale: Ratio,
    /// Drift used when the envelope has collapsed to zero width.
    pub fallback_drift: f64,
}

impl Default for BollingerReversion {
    fn default() -> Self {
        Self {
            upper_edge: Ratio::new_const(0.8),
            lower_edge: Ratio::new_const(0.2),
            reversion_pull: Ratio::new_const(0.3),
            trend_scale: Ratio::new_const(0.5),
            fallback_drift: 0.001,
        }
    }
}

impl Predictor for BollingerReversion {
    fn id(&self) -> MethodId {
        MethodId(methods::BOLLINGER)
    }

    fn min_window(&self) -> usize {
        10
    }

    fn driver(&self) -> Driver {
        Driver::Close
    }

    fn evaluate(&self, _series: &CandleSeries, indicators: &IndicatorSet) -> f64 {
        let closes = &indicators.closes;
        let n = closes.len();
        let current = closes[n - 1];

        let upper = indicators.bollinger.upper[n - 1];
        let lower = indicators.bollinger.lower[n - 1];
        let middle = indicators.bollinger.middle[n - 1];

        let band_width = upper - lower;
        if band_width == 0.0 {
            return floor_price(drift_fallback(current, self.fallback_drift));
        }

        let position = (current - lower) / band_width;
        let prediction = if position > self.upper_edge.get() || position < self.lower_edge.get() {
            current + (middle - current) * self.reversion_pull.get()
        } else {
            let recent_trend = if n >= 3 {
                fractional_change(current, closes[n - 3])
            } else {
                0.0
            };
            current * (1.0 + recent_trend * self.trend_scale.get())
        };
        floor_price(prediction)
    }

    fn validate_config(&self) -> Result<()> {
        if self.lower_edge.get() >= self.upper_edge.get() {
            return Err(ForecastError::InvalidConfig(format!(
                "lower_edge ({}) must be below upper_edge ({})",
                self.lower_edge.get(),
                self.upper_edge.get()
            )));
        }
        Ok(())
    }
}

// ============================================================
// PARAMETER METADATA
// ============================================================

static MOMENTUM_RSI_PARAMS: &[ParamMeta] = &[
    ParamMeta::factor("overbought", 70.0, (60.0, 85.0, 5.0), "RSI overbought threshold"),
    ParamMeta::factor("oversold", 30.0, (15.0, 40.0, 5.0), "RSI oversold threshold"),
    ParamMeta::factor(
        "rsi_shift",
        0.02,
        (0.005, 0.05, 0.005),
        "Fractional shift applied at RSI extremes",
    ),
    ParamMeta::ratio(
        "momentum_scale",
        0.7,
        (0.4, 1.0, 0.1),
        "Dampening on the averaged momentum",
    ),
];

static BOLLINGER_REVERSION_PARAMS: &[ParamMeta] = &[
    ParamMeta::ratio("upper_edge", 0.8, (0.6, 0.95, 0.05), "Upper band-position edge"),
    ParamMeta::ratio("lower_edge", 0.2, (0.05, 0.4, 0.05), "Lower band-position edge"),
    ParamMeta::ratio(
        "reversion_pull",
        0.3,
        (0.1, 0.6, 0.1),
        "Pull toward the middle band at the stretches",
    ),
    ParamMeta::ratio(
        "trend_scale",
        0.5,
        (0.2, 0.8, 0.1),
        "Scale on the short trend inside the envelope",
    ),
];

impl ParameterizedPredictor for MomentumRsi {
    fn param_meta() -> &'static [ParamMeta] {
        MOMENTUM_RSI_PARAMS
    }

    fn with_params(params: &HashMap<&str, f64>) -> Result<Self> {
        let predictor = Self {
            overbought: get_factor(params, "overbought", 70.0)?,
            oversold: get_factor(params, "oversold", 30.0)?,
            rsi_shift: get_factor(params, "rsi_shift", 0.02)?,
            momentum_scale: get_ratio(params, "momentum_scale", 0.7)?,
        };
        predictor.validate_config()?;
        Ok(predictor)
    }

    fn method_str() -> &'static str {
        methods::MOMENTUM
    }
}

impl ParameterizedPredictor for BollingerReversion {
    fn param_meta() -> &'static [ParamMeta] {
        BOLLINGER_REVERSION_PARAMS
    }

    fn with_params(params: &HashMap<&str, f64>) -> Result<Self> {
        let predictor = Self {
            upper_edge: get_ratio(params, "upper_edge", 0.8)?,
            lower_edge: get_ratio(params, "lower_edge", 0.2)?,
            reversion_pull: get_ratio(params, "reversion_pull", 0.3)?,
            trend_scale: get_ratio(params, "trend_scale", 0.5)?,
            ..Self::default()
        };
        predictor.validate_config()?;
        Ok(predictor)
    }

    fn method_str() -> &'static str {
        methods::BOLLINGER
    }
}

// ============================================================
// TESTS
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IndicatorConfig;
    use crate::indicators::IndicatorSet;
    use crate::{CandleSeries, Predictor};

    fn eval(predictor: &impl Predictor, closes: &[f64]) -> f64 {
        let series = CandleSeries::from_closes(closes).unwrap();
        let ind = IndicatorSet::compute(&series, &IndicatorConfig::default());
        predictor.evaluate(&series, &ind)
    }

    #[test]
    fn test_momentum_continues_rise() {
        let closes: Vec<f64> = (0..10).map(|i| 100.0 + 2.0 * i as f64).collect();
        let current = closes[closes.len() - 1];
        let prediction = eval(&MomentumRsi::with_defaults(), &closes);
        assert!(prediction > current);
    }

    #[test]
    fn test_momentum_overbought_drags_prediction() {
        // 20 strictly rising closes: RSI pins at 100, triggering the
        // overbought shift of -0.02 on top of the dampened momentum.
        let closes: Vec<f64> = (0..20).map(|i| 100.0 + i as f64).collect();
        let current = closes[closes.len() - 1];
        let prediction = eval(&MomentumRsi::with_defaults(), &closes);

        let m3 = (current - closes[16]) / closes[16];
        let m5 = (current - closes[14]) / closes[14];
        let expected = current * (1.0 + (m3 + m5) / 2.0 * 0.7 - 0.02);
        assert!((prediction - expected).abs() < 1e-9);
    }

    #[test]
    fn test_momentum_rejects_crossed_thresholds() {
        let mut predictor = MomentumRsi::with_defaults();
        predictor.oversold = 80.0;
        assert!(predictor.validate_config().is_err());
    }

    #[test]
    fn test_bollinger_zero_width_falls_back() {
        let closes = vec![100.0; 12];
        let prediction = eval(&BollingerReversion::with_defaults(), &closes);
        assert!((prediction - 100.1).abs() < 1e-9);
    }

    #[test]
    fn test_bollinger_stretch_reverts_toward_middle() {
        // Flat series with a sharp final spike: position > 0.8.
        let mut closes = vec![100.0; 20];
        closes.push(106.0);
        let series = CandleSeries::from_closes(&closes).unwrap();
        let ind = IndicatorSet::compute(&series, &IndicatorConfig::default());
        let n = closes.len();
        let position = (closes[n - 1] - ind.bollinger.lower[n - 1])
            / (ind.bollinger.upper[n - 1] - ind.bollinger.lower[n - 1]);
        assert!(position > 0.8);

        let prediction = BollingerReversion::with_defaults().evaluate(&series, &ind);
        assert!(prediction < 106.0);
        let expected = 106.0 + (ind.bollinger.middle[n - 1] - 106.0) * 0.3;
        assert!((prediction - expected).abs() < 1e-9);
    }

    #[test]
    fn test_bollinger_mid_band_continues_trend() {
        // Gentle drift keeps the close inside the envelope.
        let closes: Vec<f64> = (0..15).map(|i| 100.0 + 0.1 * i as f64).collect();
        let series = CandleSeries::from_closes(&closes).unwrap();
        let ind = IndicatorSet::compute(&series, &IndicatorConfig::default());
        let n = closes.len();
        let current = closes[n - 1];

        let position = (current - ind.bollinger.lower[n - 1])
            / (ind.bollinger.upper[n - 1] - ind.bollinger.lower[n - 1]);
        assert!(position <= 0.8 && position >= 0.2);

        let trend = (current - closes[n - 3]) / closes[n - 3];
        let expected = current * (1.0 + trend * 0.5);
        let prediction = BollingerReversion::with_defaults().evaluate(&series, &ind);
        assert!((prediction - expected).abs() < 1e-9);
    }
}
