//! Context-sensitive ensemble weighting.
//!
//! The weight policy turns the series context (capability, window length,
//! realized volatility) into a normalized weight per active method. Base
//! tables come from [`WeightConfig`]; regime adjustments reshape them, and
//! a final normalization guarantees the weights sum to 1.

use std::collections::BTreeMap;

use crate::config::WeightConfig;
use crate::{methods, Capability, MethodId};

/// Compute the normalized ensemble weights for one prediction.
///
/// `custom` carries externally registered methods with their raw weights;
/// they join the builtin table before normalization, so a heavy custom
/// weight proportionally dilutes the builtins.
pub fn compute_weights(
    cfg: &WeightConfig,
    capability: Capability,
    data_points: usize,
    volatility: f64,
    custom: &[(MethodId, f64)],
) -> BTreeMap<&'static str, f64> {
    let mut weights: BTreeMap<&'static str, f64> = match capability {
        Capability::CloseOnly => close_family(cfg, data_points, volatility),
        Capability::Ohlcv { volume_available } => {
            ohlcv_family(cfg, data_points, volume_available)
        }
    };
    for (id, weight) in custom {
        weights.insert(id.0, weight.max(0.0));
    }
    normalize(&mut weights);
    weights
}

fn close_family(
    cfg: &WeightConfig,
    data_points: usize,
    volatility: f64,
) -> BTreeMap<&'static str, f64> {
    let table = if data_points < cfg.tiny_window {
        cfg.close_tiny
    } else if data_points < cfg.short_window {
        cfg.close_short
    } else if data_points < cfg.medium_window {
        cfg.close_medium
    } else {
        cfg.close_base
    };

    let mut momentum = table.momentum;
    let mut bollinger = table.bollinger;
    if volatility > cfg.high_volatility {
        // Choppy regime: trust reversion over continuation.
        momentum *= cfg.momentum_damp;
        bollinger *= cfg.reversion_boost;
    }

    BTreeMap::from([
        (methods::LINEAR, table.linear),
        (methods::MOVING_AVERAGE, table.moving_average),
        (methods::MOMENTUM, momentum),
        (methods::BOLLINGER, bollinger),
    ])
}

fn ohlcv_family(
    cfg: &WeightConfig,
    data_points: usize,
    volume_available: bool,
) -> BTreeMap<&'static str, f64> {
    let base = cfg.ohlcv_base;
    let mut support_resistance = base.support_resistance;
    let mut volume_price = base.volume_price;
    let mut volatility_breakout = base.volatility_breakout;
    let mut multi_timeframe = base.multi_timeframe;

    if !volume_available {
        // Without volume the confirmation method has nothing to read;
        // hand its mass to the price-structure methods.
        let freed = volume_price - cfg.no_volume_residual;
        volume_price = cfg.no_volume_residual;
        support_resistance += freed * 0.5;
        volatility_breakout += freed * 0.25;
        multi_timeframe += freed * 0.25;
    }

    if data_points < cfg.ohlcv_short_window {
        support_resistance = cfg.short_support_resistance;
        multi_timeframe = cfg.short_multi_timeframe;
    } else if data_points > cfg.ohlcv_long_window {
        support_resistance = cfg.long_support_resistance;
        volatility_breakout = cfg.long_volatility_breakout;
    }

    BTreeMap::from([
        (methods::SUPPORT_RESISTANCE, support_resistance),
        (methods::VOLUME_PRICE, volume_price),
        (methods::VOLATILITY_BREAKOUT, volatility_breakout),
        (methods::MULTI_TIMEFRAME, multi_timeframe),
    ])
}

/// Rescale in place so the weights sum to 1. A degenerate table (all
/// zero, or worse) collapses to equal weights.
fn normalize(weights: &mut BTreeMap<&'static str, f64>) {
    let total: f64 = weights.values().sum();
    if total > 0.0 && total.is_finite() {
        for weight in weights.values_mut() {
            *weight /= total;
        }
    } else {
        let equal = 1.0 / weights.len() as f64;
        for weight in weights.values_mut() {
            *weight = equal;
        }
    }
}
