//! Stateless technical-indicator functions over candle/price sequences.
//!
//! Every function returns a sequence exactly as long as its input. Positions
//! before an indicator's warm-up period hold a documented neutral value
//! (50 for the oscillators, the seed value for the smoothed averages), and
//! inputs shorter than the required minimum produce a constant fallback
//! sequence rather than an error.

use crate::config::IndicatorConfig;
use crate::{Candle, CandleSeries};

// ============================================================
// MOVING AVERAGES
// ============================================================

/// Simple moving average.
///
/// Inputs shorter than `period` yield a constant sequence of the last price.
/// Otherwise the leading indices average a growing window until `period`
/// values are available.
pub fn sma(prices: &[f64], period: usize) -> Vec<f64> {
    let n = prices.len();
    if n == 0 || period == 0 {
        return Vec::new();
    }
    if n < period {
        return vec![prices[n - 1]; n];
    }

    let mut out = Vec::with_capacity(n);
    for i in 0..n {
        let window = if i + 1 < period {
            &prices[..=i]
        } else {
            &prices[i + 1 - period..=i]
        };
        out.push(window.iter().sum::<f64>() / window.len() as f64);
    }
    out
}

/// Exponential moving average, seeded with the first price.
///
/// Multiplier is `2 / (period + 1)`.
pub fn ema(prices: &[f64], period: usize) -> Vec<f64> {
    if prices.is_empty() {
        return Vec::new();
    }

    let multiplier = 2.0 / (period as f64 + 1.0);
    let mut out = Vec::with_capacity(prices.len());
    out.push(prices[0]);

    for &price in &prices[1..] {
        let prev = *out.last().unwrap();
        out.push(price * multiplier + prev * (1.0 - multiplier));
    }
    out
}

// ============================================================
// OSCILLATORS
// ============================================================

/// Relative Strength Index with Wilder smoothing.
///
/// All indices below `period` hold the neutral 50. `rsi[period]` comes from
/// the simple averages of the first `period` gains/losses; later indices use
/// the Wilder recurrence. A zero average loss pins the value at 100.
/// Fewer than `period + 1` prices yield an all-50 sequence.
pub fn rsi(prices: &[f64], period: usize) -> Vec<f64> {
    let n = prices.len();
    if period == 0 || n < period + 1 {
        return vec![50.0; n];
    }

    let gains: Vec<f64> = prices.windows(2).map(|w| (w[1] - w[0]).max(0.0)).collect();
    let losses: Vec<f64> = prices.windows(2).map(|w| (w[0] - w[1]).max(0.0)).collect();

    let mut out = vec![50.0; n];
    let p = period as f64;
    let mut avg_gain = gains[..period].iter().sum::<f64>() / p;
    let mut avg_loss = losses[..period].iter().sum::<f64>() / p;
    out[period] = rsi_value(avg_gain, avg_loss);

    for i in period + 1..n {
        avg_gain = (avg_gain * (p - 1.0) + gains[i - 1]) / p;
        avg_loss = (avg_loss * (p - 1.0) + losses[i - 1]) / p;
        out[i] = rsi_value(avg_gain, avg_loss);
    }
    out
}

#[inline]
fn rsi_value(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        100.0
    } else {
        let rs = avg_gain / avg_loss;
        100.0 - 100.0 / (1.0 + rs)
    }
}

/// Stochastic oscillator output.
#[derive(Debug, Clone)]
pub struct Stochastic {
    /// %K: position of the close within the trailing high/low range, 0..=100.
    pub k: Vec<f64>,
    /// %D: simple moving average of %K (growing window before it fills).
    pub d: Vec<f64>,
}

/// Stochastic %K/%D.
///
/// Fewer than `k_period` candles, indices before the %K window fills, and
/// zero-range windows all produce the neutral 50.
pub fn stochastic(candles: &[Candle], k_period: usize, d_period: usize) -> Stochastic {
    let n = candles.len();
    if n < k_period {
        return Stochastic {
            k: vec![50.0; n],
            d: vec![50.0; n],
        };
    }

    let mut k = Vec::with_capacity(n);
    for i in 0..n {
        if i + 1 < k_period {
            k.push(50.0);
            continue;
        }
        let window = &candles[i + 1 - k_period..=i];
        let highest = window.iter().map(|c| c.high).fold(f64::MIN, f64::max);
        let lowest = window.iter().map(|c| c.low).fold(f64::MAX, f64::min);
        if highest == lowest {
            k.push(50.0);
        } else {
            k.push((candles[i].close - lowest) / (highest - lowest) * 100.0);
        }
    }

    let mut d = Vec::with_capacity(n);
    for i in 0..n {
        let window = if i + 1 < d_period {
            &k[..=i]
        } else {
            &k[i + 1 - d_period..=i]
        };
        d.push(window.iter().sum::<f64>() / window.len() as f64);
    }

    Stochastic { k, d }
}

// ============================================================
// BANDS AND CONVERGENCE
// ============================================================

/// Bollinger Bands output.
#[derive(Debug, Clone)]
pub struct BollingerBands {
    pub middle: Vec<f64>,
    pub upper: Vec<f64>,
    pub lower: Vec<f64>,
}

/// Bollinger Bands: SMA middle, `width` sample standard deviations either
/// side, both computed over the same trailing (growing) window.
pub fn bollinger(prices: &[f64], period: usize, width: f64) -> BollingerBands {
    let n = prices.len();
    let middle = sma(prices, period);
    let mut upper = Vec::with_capacity(n);
    let mut lower = Vec::with_capacity(n);

    for i in 0..n {
        let window = if i + 1 < period {
            &prices[..=i]
        } else {
            &prices[i + 1 - period..=i]
        };
        let std = sample_stddev(window);
        upper.push(middle[i] + width * std);
        lower.push(middle[i] - width * std);
    }

    BollingerBands {
        middle,
        upper,
        lower,
    }
}

/// MACD output.
#[derive(Debug, Clone)]
pub struct Macd {
    /// EMA(fast) - EMA(slow).
    pub line: Vec<f64>,
    /// EMA of the MACD line.
    pub signal: Vec<f64>,
}

/// Moving Average Convergence/Divergence.
pub fn macd(prices: &[f64], fast: usize, slow: usize, signal: usize) -> Macd {
    let ema_fast = ema(prices, fast);
    let ema_slow = ema(prices, slow);
    let line: Vec<f64> = ema_fast
        .iter()
        .zip(&ema_slow)
        .map(|(f, s)| f - s)
        .collect();
    let signal = ema(&line, signal);
    Macd { line, signal }
}

// ============================================================
// VOLATILITY
// ============================================================

/// Average True Range, smoothed as an EMA of the true-range sequence with
/// multiplier `2 / (period + 1)` seeded at the first true range.
///
/// This is deliberately an EMA of TR rather than Wilder's RMA. Fewer than
/// two candles yield an all-zero sequence.
pub fn atr(candles: &[Candle], period: usize) -> Vec<f64> {
    let n = candles.len();
    if n < 2 {
        return vec![0.0; n];
    }

    let mut true_ranges = Vec::with_capacity(n);
    true_ranges.push(candles[0].high - candles[0].low);
    for i in 1..n {
        true_ranges.push(candles[i].true_range(Some(candles[i - 1].close)));
    }

    let multiplier = 2.0 / (period as f64 + 1.0);
    let mut out = Vec::with_capacity(n);
    out.push(true_ranges[0]);
    for &tr in &true_ranges[1..] {
        let prev = *out.last().unwrap();
        out.push(tr * multiplier + prev * (1.0 - multiplier));
    }
    out
}

// ============================================================
// VOLUME
// ============================================================

/// On-Balance Volume: cumulative volume signed by the close-to-close move.
pub fn obv(candles: &[Candle]) -> Vec<f64> {
    if candles.is_empty() {
        return Vec::new();
    }

    let mut out = Vec::with_capacity(candles.len());
    out.push(0.0);
    for i in 1..candles.len() {
        let prev = *out.last().unwrap();
        let volume = candles[i].volume as f64;
        let value = if candles[i].close > candles[i - 1].close {
            prev + volume
        } else if candles[i].close < candles[i - 1].close {
            prev - volume
        } else {
            prev
        };
        out.push(value);
    }
    out
}

/// Cumulative volume-weighted average price.
///
/// A zero-volume candle does not advance the cumulative sums; its VWAP entry
/// falls back to that candle's close.
pub fn vwap(candles: &[Candle]) -> Vec<f64> {
    let mut out = Vec::with_capacity(candles.len());
    let mut cumulative_pv = 0.0;
    let mut cumulative_volume = 0.0;

    for candle in candles {
        if candle.volume > 0 {
            cumulative_pv += candle.typical_price() * candle.volume as f64;
            cumulative_volume += candle.volume as f64;
            out.push(if cumulative_volume > 0.0 {
                cumulative_pv / cumulative_volume
            } else {
                candle.close
            });
        } else {
            out.push(candle.close);
        }
    }
    out
}

// ============================================================
// STATISTICS HELPERS
// ============================================================

/// Sample standard deviation. Fewer than two values yield 0.
pub fn sample_stddev(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }
    let mean = values.iter().sum::<f64>() / n as f64;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
    variance.sqrt()
}

/// Volatility as the sample standard deviation of 1-step fractional returns.
///
/// Fewer than three prices (one usable return) fall back to 0.02.
pub fn return_volatility(prices: &[f64]) -> f64 {
    if prices.len() < 2 {
        return 0.02;
    }
    let returns: Vec<f64> = prices
        .windows(2)
        .map(|w| (w[1] - w[0]) / w[0])
        .collect();
    if returns.len() <= 1 {
        return 0.02;
    }
    sample_stddev(&returns)
}

// ============================================================
// INDICATOR SET
// ============================================================

/// All shared indicator sequences for one invocation, aligned
/// index-for-index with the candle series and computed exactly once.
#[derive(Debug, Clone)]
pub struct IndicatorSet {
    /// Close prices, cached so predictors avoid re-collecting them.
    pub closes: Vec<f64>,
    pub rsi: Vec<f64>,
    pub bollinger: BollingerBands,
    pub macd: Macd,
    pub atr: Vec<f64>,
    pub stochastic: Stochastic,
    pub obv: Vec<f64>,
    pub vwap: Vec<f64>,
}

impl IndicatorSet {
    /// Compute the full bundle for a series.
    pub fn compute(series: &CandleSeries, cfg: &IndicatorConfig) -> Self {
        let candles = series.candles();
        let closes = series.closes();

        Self {
            rsi: rsi(&closes, cfg.rsi_period.get()),
            bollinger: bollinger(&closes, cfg.bollinger_period.get(), cfg.bollinger_width),
            macd: macd(
                &closes,
                cfg.macd_fast.get(),
                cfg.macd_slow.get(),
                cfg.macd_signal.get(),
            ),
            atr: atr(candles, cfg.atr_period.get()),
            stochastic: stochastic(candles, cfg.stochastic_k.get(), cfg.stochastic_d.get()),
            obv: obv(candles),
            vwap: vwap(candles),
            closes,
        }
    }

    /// Latest ATR value, 0 when the series was too short to compute one.
    #[inline]
    pub fn last_atr(&self) -> f64 {
        self.atr.last().copied().unwrap_or(0.0)
    }

    /// Latest RSI value, neutral 50 when unavailable.
    #[inline]
    pub fn last_rsi(&self) -> f64 {
        self.rsi.last().copied().unwrap_or(50.0)
    }
}

// ============================================================
// TESTS
// ============================================================
