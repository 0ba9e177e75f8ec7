//! Trend-following predictors: least-squares regression, moving-average
//! alignment, and multi-timeframe trend agreement.

use std::collections::HashMap;

use crate::indicators::{self, IndicatorSet};
use crate::params::{get_period, get_ratio, ParamMeta, ParameterizedPredictor};
use crate::{methods, CandleSeries, Driver, MethodId, Period, Predictor, Ratio, Result};

use super::{floor_price, fractional_change};

impl_with_defaults!(TrendRegression, MovingAverageAlignment, MultiTimeframeAlignment);

// ============================================================
// LEAST-SQUARES HELPERS
// ============================================================

/// Ordinary least-squares fit of `values` against their indices.
/// Returns `(slope, intercept)`; a degenerate x-spread yields slope 0.
pub(crate) fn least_squares(values: &[f64]) -> (f64, f64) {
    let n = values.len() as f64;
    let x_mean = (values.len() as f64 - 1.0) / 2.0;
    let y_mean = values.iter().sum::<f64>() / n;

    let mut numerator = 0.0;
    let mut denominator = 0.0;
    for (i, &y) in values.iter().enumerate() {
        let dx = i as f64 - x_mean;
        numerator += dx * (y - y_mean);
        denominator += dx * dx;
    }

    let slope = if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    };
    (slope, y_mean - slope * x_mean)
}

/// Coefficient of determination for the fitted line, clamped into [0, 1].
/// A flat series (zero total variance) yields 0.
pub(crate) fn r_squared(values: &[f64], slope: f64, intercept: f64) -> f64 {
    let n = values.len() as f64;
    let y_mean = values.iter().sum::<f64>() / n;

    let ss_tot: f64 = values.iter().map(|y| (y - y_mean).powi(2)).sum();
    let ss_res: f64 = values
        .iter()
        .enumerate()
        .map(|(i, y)| (y - (slope * i as f64 + intercept)).powi(2))
        .sum();

    if ss_tot == 0.0 {
        return 0.0;
    }
    (1.0 - ss_res / ss_tot).clamp(0.0, 1.0)
}

/// Trend strength diagnostic: R² of the least-squares fit, 0.5 when the
/// window is too short to fit anything meaningful.
pub(crate) fn trend_strength(closes: &[f64]) -> f64 {
    if closes.len() < 3 {
        return 0.5;
    }
    let (slope, intercept) = least_squares(closes);
    r_squared(closes, slope, intercept)
}

// ============================================================
// TREND REGRESSION
// ============================================================

/// Least-squares trend extrapolation, confidence-scaled by R² so weak
/// trends regress toward the last close.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrendRegression;

impl Predictor for TrendRegression {
    fn id(&self) -> MethodId {
        MethodId(methods::LINEAR)
    }

    fn min_window(&self) -> usize {
        2
    }

    fn driver(&self) -> Driver {
        Driver::Close
    }

    fn evaluate(&self, _series: &CandleSeries, indicators: &IndicatorSet) -> f64 {
        let closes = &indicators.closes;
        let n = closes.len();

        let (slope, intercept) = least_squares(closes);
        let extrapolated = slope * n as f64 + intercept;
        let confidence = r_squared(closes, slope, intercept);

        let last = closes[n - 1];
        floor_price(last + (extrapolated - last) * confidence)
    }
}

// ============================================================
// MOVING-AVERAGE ALIGNMENT
// ============================================================

/// Compares three SMAs; a strict monotonic ordering pulls the close toward
/// the fastest average, otherwise the three blend by fixed weights.
#[derive(Debug, Clone)]
pub struct MovingAverageAlignment {
    pub fast: Period,
    pub mid: Period,
    pub slow: Period,
    /// Pull toward the fast SMA when the averages are strictly ordered.
    pub alignment_pull: Ratio,
    pub blend_fast: f64,
    pub blend_mid: f64,
    pub blend_slow: f64,
}

impl Default for MovingAverageAlignment {
    fn default() -> Self {
        Self {
            fast: Period::new_const(5),
            mid: Period::new_const(10),
            slow: Period::new_const(20),
            alignment_pull: Ratio::new_const(0.5),
            blend_fast: 0.5,
            blend_mid: 0.3,
            blend_slow: 0.2,
        }
    }
}

impl Predictor for MovingAverageAlignment {
    fn id(&self) -> MethodId {
        MethodId(methods::MOVING_AVERAGE)
    }

    fn min_window(&self) -> usize {
        3
    }

    fn driver(&self) -> Driver {
        Driver::Close
    }

    fn evaluate(&self, _series: &CandleSeries, indicators: &IndicatorSet) -> f64 {
        let closes = &indicators.closes;
        let n = closes.len();
        let current = closes[n - 1];

        let last_sma = |period: usize| -> f64 {
            let clipped = period.min(n);
            indicators::sma(closes, clipped)[n - 1]
        };
        let sma_fast = last_sma(self.fast.get());
        let sma_mid = last_sma(self.mid.get());
        let sma_slow = last_sma(self.slow.get());

        let ordered_up = sma_fast > sma_mid && sma_mid > sma_slow;
        let ordered_down = sma_fast < sma_mid && sma_mid < sma_slow;

        let prediction = if ordered_up || ordered_down {
            current + (sma_fast - current) * self.alignment_pull.get()
        } else {
            sma_fast * self.blend_fast + sma_mid * self.blend_mid + sma_slow * self.blend_slow
        };
        floor_price(prediction)
    }

    fn validate_config(&self) -> crate::Result<()> {
        if self.fast.get() >= self.mid.get() || self.mid.get() >= self.slow.get() {
            return Err(crate::ForecastError::InvalidConfig(format!(
                "moving-average periods must be strictly increasing: {} < {} < {}",
                self.fast.get(),
                self.mid.get(),
                self.slow.get()
            )));
        }
        let blend = self.blend_fast + self.blend_mid + self.blend_slow;
        if (blend - 1.0).abs() > 1e-9 {
            return Err(crate::ForecastError::InvalidConfig(format!(
                "moving-average blend weights must sum to 1, got {blend}"
            )));
        }
        Ok(())
    }
}

// ============================================================
// MULTI-TIMEFRAME ALIGNMENT
// ============================================================

/// Combines 3-period, 7-period and whole-window trends; agreement across
/// all three earns a high-confidence combined move, disagreement falls back
/// to a low-confidence blend of the shorter horizons.
#[derive(Debug, Clone)]
pub struct MultiTimeframeAlignment {
    pub short_span: Period,
    pub medium_span: Period,
    pub aligned_confidence: Ratio,
    pub mixed_confidence: Ratio,
}

/// Horizon blend when all three trends agree.
const ALIGNED_BLEND: (f64, f64, f64) = (0.5, 0.3, 0.2);
/// Short/medium blend when signals are mixed.
const MIXED_BLEND: (f64, f64) = (0.6, 0.4);

impl Default for MultiTimeframeAlignment {
    fn default() -> Self {
        Self {
            short_span: Period::new_const(3),
            medium_span: Period::new_const(7),
            aligned_confidence: Ratio::new_const(0.7),
            mixed_confidence: Ratio::new_const(0.3),
        }
    }
}

impl Predictor for MultiTimeframeAlignment {
    fn id(&self) -> MethodId {
        MethodId(methods::MULTI_TIMEFRAME)
    }

    fn min_window(&self) -> usize {
        5
    }

    fn driver(&self) -> Driver {
        Driver::Ohlcv
    }

    fn evaluate(&self, _series: &CandleSeries, indicators: &IndicatorSet) -> f64 {
        let closes = &indicators.closes;
        let n = closes.len();
        let current = closes[n - 1];

        let span_trend = |span: usize| -> f64 {
            if n >= span {
                fractional_change(current, closes[n - span])
            } else {
                0.0
            }
        };
        let short = span_trend(self.short_span.get());
        let medium = span_trend(self.medium_span.get());
        let long = fractional_change(current, closes[0]);

        let aligned = (short > 0.0 && medium > 0.0 && long > 0.0)
            || (short < 0.0 && medium < 0.0 && long < 0.0);

        let (confidence, combined) = if aligned {
            let (ws, wm, wl) = ALIGNED_BLEND;
            (
                self.aligned_confidence.get(),
                short * ws + medium * wm + long * wl,
            )
        } else {
            let (ws, wm) = MIXED_BLEND;
            (self.mixed_confidence.get(), short * ws + medium * wm)
        };

        floor_price(current * (1.0 + combined * confidence))
    }

    fn validate_config(&self) -> crate::Result<()> {
        if self.short_span.get() >= self.medium_span.get() {
            return Err(crate::ForecastError::InvalidConfig(format!(
                "short_span ({}) must be shorter than medium_span ({})",
                self.short_span.get(),
                self.medium_span.get()
            )));
        }
        Ok(())
    }
}

// ============================================================
// PARAMETER METADATA
// ============================================================

static MOVING_AVERAGE_ALIGNMENT_PARAMS: &[ParamMeta] = &[
    ParamMeta::period("fast", 5.0, (3.0, 8.0, 1.0), "Fast SMA period"),
    ParamMeta::period("mid", 10.0, (8.0, 15.0, 1.0), "Mid SMA period"),
    ParamMeta::period("slow", 20.0, (15.0, 30.0, 5.0), "Slow SMA period"),
    ParamMeta::ratio(
        "alignment_pull",
        0.5,
        (0.2, 0.8, 0.1),
        "Pull toward the fast SMA when averages are ordered",
    ),
];

static MULTI_TIMEFRAME_ALIGNMENT_PARAMS: &[ParamMeta] = &[
    ParamMeta::period("short_span", 3.0, (2.0, 5.0, 1.0), "Short trend horizon"),
    ParamMeta::period("medium_span", 7.0, (5.0, 10.0, 1.0), "Medium trend horizon"),
    ParamMeta::ratio(
        "aligned_confidence",
        0.7,
        (0.5, 0.9, 0.1),
        "Confidence when all horizons agree",
    ),
    ParamMeta::ratio(
        "mixed_confidence",
        0.3,
        (0.1, 0.5, 0.1),
        "Confidence when horizons disagree",
    ),
];

impl ParameterizedPredictor for MovingAverageAlignment {
    fn param_meta() -> &'static [ParamMeta] {
        MOVING_AVERAGE_ALIGNMENT_PARAMS
    }

    fn with_params(params: &HashMap<&str, f64>) -> Result<Self> {
        let predictor = Self {
            fast: get_period(params, "fast", 5)?,
            mid: get_period(params, "mid", 10)?,
            slow: get_period(params, "slow", 20)?,
            alignment_pull: get_ratio(params, "alignment_pull", 0.5)?,
            ..Self::default()
        };
        predictor.validate_config()?;
        Ok(predictor)
    }

    fn method_str() -> &'static str {
        methods::MOVING_AVERAGE
    }
}

impl ParameterizedPredictor for MultiTimeframeAlignment {
    fn param_meta() -> &'static [ParamMeta] {
        MULTI_TIMEFRAME_ALIGNMENT_PARAMS
    }

    fn with_params(params: &HashMap<&str, f64>) -> Result<Self> {
        let predictor = Self {
            short_span: get_period(params, "short_span", 3)?,
            medium_span: get_period(params, "medium_span", 7)?,
            aligned_confidence: get_ratio(params, "aligned_confidence", 0.7)?,
            mixed_confidence: get_ratio(params, "mixed_confidence", 0.3)?,
        };
        predictor.validate_config()?;
        Ok(predictor)
    }

    fn method_str() -> &'static str {
        methods::MULTI_TIMEFRAME
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
    use crate::{CandleSeries, Period, Predictor};

    fn eval(predictor: &impl Predictor, closes: &[f64]) -> f64 {
        let series = CandleSeries::from_closes(closes).unwrap();
        let ind = IndicatorSet::compute(&series, &IndicatorConfig::default());
        predictor.evaluate(&series, &ind)
    }

    #[test]
    fn test_least_squares_exact_line() {
        let values = [1.0, 3.0, 5.0, 7.0];
        let (slope, intercept) = least_squares(&values);
        assert!((slope - 2.0).abs() < 1e-12);
        assert!((intercept - 1.0).abs() < 1e-12);
        assert!((r_squared(&values, slope, intercept) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_r_squared_flat_series_is_zero() {
        let values = [5.0, 5.0, 5.0];
        let (slope, intercept) = least_squares(&values);
        assert_eq!(r_squared(&values, slope, intercept), 0.0);
    }

    #[test]
    fn test_trend_regression_extends_perfect_trend() {
        // Perfect line: R^2 = 1, so the raw extrapolation survives intact.
        let prediction = eval(&TrendRegression, &[100.0, 101.0, 102.0, 103.0, 104.0]);
        assert!((prediction - 105.0).abs() < 1e-9);
    }

    #[test]
    fn test_trend_regression_downtrend_stays_positive() {
        let prediction = eval(&TrendRegression, &[5.0, 4.0, 3.0, 2.0, 1.0]);
        assert!(prediction >= super::super::PRICE_FLOOR);
        assert!(prediction < 1.0);
    }

    #[test]
    fn test_moving_average_alignment_uptrend_pulls_down_toward_fast_sma() {
        // Rising series: fast > mid > slow, fast SMA sits below the close.
        let closes: Vec<f64> = (0..25).map(|i| 100.0 + i as f64).collect();
        let prediction = eval(&MovingAverageAlignment::with_defaults(), &closes);
        let current = closes[closes.len() - 1];
        assert!(prediction < current);
        assert!(prediction > current - 2.0);
    }

    #[test]
    fn test_moving_average_alignment_mixed_uses_blend() {
        let closes = [100.0, 102.0, 99.0, 101.0, 100.0, 102.0, 99.0, 101.0];
        let detector = MovingAverageAlignment::with_defaults();
        let prediction = eval(&detector, &closes);
        // Choppy series cannot be strictly ordered, so the blend applies.
        assert!(prediction > 99.0 && prediction < 102.0);
    }

    #[test]
    fn test_moving_average_alignment_rejects_bad_periods() {
        let mut detector = MovingAverageAlignment::with_defaults();
        detector.mid = Period::new_const(30);
        assert!(detector.validate_config().is_err());
    }

    #[test]
    fn test_multi_timeframe_aligned_uptrend_predicts_higher() {
        let closes: Vec<f64> = (0..10).map(|i| 100.0 * 1.01f64.powi(i)).collect();
        let prediction = eval(&MultiTimeframeAlignment::with_defaults(), &closes);
        assert!(prediction > closes[closes.len() - 1]);
    }

    #[test]
    fn test_multi_timeframe_mixed_signals_lower_confidence() {
        // Short trend up, long trend down: confidence drops to the mixed tier.
        let closes = [110.0, 108.0, 106.0, 104.0, 102.0, 100.0, 101.0, 102.0];
        let aligned: Vec<f64> = (0..8).map(|i| 100.0 + i as f64).collect();
        let predictor = MultiTimeframeAlignment::with_defaults();
        let mixed_move = (eval(&predictor, &closes) - 102.0).abs() / 102.0;
        let aligned_move = (eval(&predictor, &aligned) - 107.0).abs() / 107.0;
        assert!(mixed_move < aligned_move);
    }

    #[test]
    fn test_moving_average_with_params() {
        let mut params = HashMap::new();
        params.insert("fast", 3.0);
        params.insert("alignment_pull", 0.6);
        let predictor = MovingAverageAlignment::with_params(&params).unwrap();
        assert_eq!(predictor.fast.get(), 3);
        assert!((predictor.alignment_pull.get() - 0.6).abs() < f64::EPSILON);
        // Defaults fill the rest.
        assert_eq!(predictor.slow.get(), 20);

        // Crossed periods are rejected at construction.
        params.insert("fast", 12.0);
        assert!(MovingAverageAlignment::with_params(&params).is_err());
    }
}
