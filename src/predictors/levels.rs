//! Support/resistance level detection and proximity-based prediction.

use std::collections::HashMap;

use crate::indicators::IndicatorSet;
use crate::params::{get_period, get_ratio, ParamMeta, ParameterizedPredictor};
use crate::{methods, CandleSeries, Driver, MethodId, Predictor, Period, Ratio, Result};

use super::{floor_price, recent_trend};

impl_with_defaults!(SupportResistance);

/// Finds nearby support and resistance levels from local extrema; prices
/// pressing a level get pulled toward the opposite one, prices between
/// levels continue the short-term trend at reduced strength.
#[derive(Debug, Clone)]
pub struct SupportResistance {
    /// Fractional distance at which a price counts as pressing a level.
    pub proximity: Ratio,
    /// Pull applied toward the opposite level.
    pub level_pull: Ratio,
    /// Scale on the short-term trend between levels.
    pub trend_scale: Ratio,
    /// Trailing candles whose extreme joins the candidate levels.
    pub lookback: Period,
}

impl Default for SupportResistance {
    fn default() -> Self {
        Self {
            proximity: Ratio::new_const(0.02),
            level_pull: Ratio::new_const(0.2),
            trend_scale: Ratio::new_const(0.3),
            lookback: Period::new_const(5),
        }
    }
}

impl SupportResistance {
    /// Local maxima of `highs` (strict against both neighbors) plus the
    /// trailing-window high, deduplicated in selection order.
    fn resistance_levels(&self, highs: &[f64]) -> Vec<f64> {
        if highs.len() < 3 {
            return Vec::new();
        }
        let mut levels = Vec::new();
        for i in 1..highs.len() - 1 {
            if highs[i] > highs[i - 1] && highs[i] > highs[i + 1] {
                push_unique(&mut levels, highs[i]);
            }
        }
        let start = highs.len().saturating_sub(self.lookback.get());
        let recent_high = highs[start..].iter().copied().fold(f64::MIN, f64::max);
        push_unique(&mut levels, recent_high);
        levels
    }

    /// Symmetric local minima of `lows` plus the trailing-window low.
    fn support_levels(&self, lows: &[f64]) -> Vec<f64> {
        if lows.len() < 3 {
            return Vec::new();
        }
        let mut levels = Vec::new();
        for i in 1..lows.len() - 1 {
            if lows[i] < lows[i - 1] && lows[i] < lows[i + 1] {
                push_unique(&mut levels, lows[i]);
            }
        }
        let start = lows.len().saturating_sub(self.lookback.get());
        let recent_low = lows[start..].iter().copied().fold(f64::MAX, f64::min);
        push_unique(&mut levels, recent_low);
        levels
    }
}

/// Append a level unless an equal one was already selected.
#[inline]
fn push_unique(levels: &mut Vec<f64>, level: f64) {
    if !levels.iter().any(|existing| *existing == level) {
        levels.push(level);
    }
}

/// Level closest to `price` by absolute distance; ties keep the earlier
/// candidate.
fn nearest_level(levels: &[f64], price: f64) -> Option<f64> {
    levels
        .iter()
        .copied()
        .min_by(|a, b| (a - price).abs().total_cmp(&(b - price).abs()))
}

impl Predictor for SupportResistance {
    fn id(&self) -> MethodId {
        MethodId(methods::SUPPORT_RESISTANCE)
    }

    fn min_window(&self) -> usize {
        5
    }

    fn driver(&self) -> Driver {
        Driver::Ohlcv
    }

    fn evaluate(&self, series: &CandleSeries, indicators: &IndicatorSet) -> f64 {
        let candles = series.candles();
        let closes = &indicators.closes;
        let current = closes[closes.len() - 1];

        let highs: Vec<f64> = candles.iter().map(|c| c.high).collect();
        let lows: Vec<f64> = candles.iter().map(|c| c.low).collect();

        let resistance = nearest_level(&self.resistance_levels(&highs), current)
            .unwrap_or(current * 1.05);
        let support =
            nearest_level(&self.support_levels(&lows), current).unwrap_or(current * 0.95);

        let proximity = self.proximity.get();
        let prediction = if current > resistance * (1.0 - proximity) {
            // Pressing resistance: pull toward support.
            current + (support - current) * self.level_pull.get()
        } else if current < support * (1.0 + proximity) {
            // Pressing support: push toward resistance.
            current + (resistance - current) * self.level_pull.get()
        } else {
            current * (1.0 + recent_trend(closes) * self.trend_scale.get())
        };
        floor_price(prediction)
    }
}

// ============================================================
// PARAMETER METADATA
// ============================================================

static SUPPORT_RESISTANCE_PARAMS: &[ParamMeta] = &[
    ParamMeta::ratio(
        "proximity",
        0.02,
        (0.005, 0.05, 0.005),
        "Fractional distance that counts as pressing a level",
    ),
    ParamMeta::ratio(
        "level_pull",
        0.2,
        (0.1, 0.5, 0.1),
        "Pull toward the opposite level",
    ),
    ParamMeta::ratio(
        "trend_scale",
        0.3,
        (0.1, 0.6, 0.1),
        "Scale on the short trend between levels",
    ),
    ParamMeta::period("lookback", 5.0, (3.0, 10.0, 1.0), "Trailing-extreme window"),
];

impl ParameterizedPredictor for SupportResistance {
    fn param_meta() -> &'static [ParamMeta] {
        SUPPORT_RESISTANCE_PARAMS
    }

    fn with_params(params: &HashMap<&str, f64>) -> Result<Self> {
        Ok(Self {
            proximity: get_ratio(params, "proximity", 0.02)?,
            level_pull: get_ratio(params, "level_pull", 0.2)?,
            trend_scale: get_ratio(params, "trend_scale", 0.3)?,
            lookback: get_period(params, "lookback", 5)?,
        })
    }

    fn method_str() -> &'static str {
        methods::SUPPORT_RESISTANCE
    }
}

// ============================================================
// TESTS
// ============================================================
