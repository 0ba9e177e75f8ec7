//! # Candlecast
//!
//! Bounded next-period price forecasting from OHLCV candles.
//!
//! A set of technical-indicator heuristics each produce one price estimate;
//! a context-sensitive weight policy blends them, and a volatility clamp
//! bounds the result around the last close. Close-only series run the
//! close-driven predictor family, full candle series run the OHLCV family.
//!
//! ## Quick Start
//!
//! ```rust
//! use candlecast::prelude::*;
//!
//! let engine = EngineBuilder::new()
//!     .with_all_defaults()
//!     .build()
//!     .unwrap();
//!
//! let closes = [100.0, 101.0, 102.0, 101.5, 103.0];
//! let result = engine.predict_closes(&closes).unwrap();
//! println!("next close: {}", result.formatted());
//! ```

pub mod config;
pub mod indicators;
pub mod params;
pub mod predictors;
pub mod weights;

pub mod prelude {
    pub use crate::{
        // Configuration
        config::{BoundsConfig, EngineConfig, IndicatorConfig, WeightConfig},
        // Indicators
        indicators::IndicatorSet,
        // Parameters
        params::{get_factor, get_period, get_ratio, ParamMeta, ParamType, ParameterizedPredictor},
        // Predictors
        predictors::*,
        // Parallel
        predict_parallel,
        // Weights
        weights::compute_weights,
        // Engine
        BuiltinPredictor,
        Candle,
        CandleSeries,
        Capability,
        Diagnostics,
        Driver,
        EngineBuilder,
        // Errors
        ForecastError,
        Method,
        MethodId,
        Ohlcv,
        PredictionEngine,
        PredictionResult,
        Predictor,
        Period,
        Ratio,
        Result,
        SymbolError,
        SymbolForecast,
    };
}

// ============================================================
// ERRORS
// ============================================================

pub type Result<T> = std::result::Result<T, ForecastError>;

/// Errors that can occur while building a series or an engine
#[derive(Debug, Clone, thiserror::Error)]
pub enum ForecastError {
    #[error("Invalid value: {0}")]
    InvalidValue(&'static str),

    #[error("{field} = {value} out of range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Empty input: at least one candle is required")]
    EmptyInput,

    #[error("Invalid candle at index {index}: {reason}")]
    InvalidCandle { index: usize, reason: &'static str },
}

// ============================================================
// VALIDATED TYPES
// ============================================================

/// Normalized value in range 0.0..=1.0
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Ratio(f64);

impl Ratio {
    /// Create a new Ratio, validating the value is in [0.0, 1.0]
    pub fn new(value: f64) -> Result<Self> {
        if value.is_nan() || value.is_infinite() {
            return Err(ForecastError::InvalidValue("Ratio cannot be NaN or infinite"));
        }
        if !(0.0..=1.0).contains(&value) {
            return Err(ForecastError::OutOfRange {
                field: "Ratio",
                value,
                min: 0.0,
                max: 1.0,
            });
        }
        Ok(Self(value))
    }

    /// Create a Ratio from a compile-time constant (library internal use)
    #[doc(hidden)]
    pub const fn new_const(value: f64) -> Self {
        Self(value)
    }

    #[inline]
    pub fn get(self) -> f64 {
        self.0
    }
}

impl serde::Serialize for Ratio {
    fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        self.0.serialize(s)
    }
}

impl<'de> serde::Deserialize<'de> for Ratio {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let value = f64::deserialize(d)?;
        Ratio::new(value).map_err(serde::de::Error::custom)
    }
}

/// Period (must be > 0)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Period(usize);

impl Period {
    /// Create a new Period, validating value is > 0
    pub fn new(value: usize) -> Result<Self> {
        if value == 0 {
            return Err(ForecastError::InvalidValue("Period must be > 0"));
        }
        Ok(Self(value))
    }

    #[doc(hidden)]
    pub const fn new_const(value: usize) -> Self {
        Self(value)
    }

    #[inline]
    pub fn get(self) -> usize {
        self.0
    }
}

impl serde::Serialize for Period {
    fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        self.0.serialize(s)
    }
}

impl<'de> serde::Deserialize<'de> for Period {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let value = usize::deserialize(d)?;
        Period::new(value).map_err(serde::de::Error::custom)
    }
}

// ============================================================
// METHOD IDENTIFIERS
// ============================================================

/// Canonical method name strings, stable across the public API.
pub mod methods {
    pub const LINEAR: &str = "linear";
    pub const MOVING_AVERAGE: &str = "moving_average";
    pub const MOMENTUM: &str = "momentum";
    pub const BOLLINGER: &str = "bollinger";
    pub const SUPPORT_RESISTANCE: &str = "support_resistance";
    pub const VOLUME_PRICE: &str = "volume_price";
    pub const VOLATILITY_BREAKOUT: &str = "volatility_breakout";
    pub const MULTI_TIMEFRAME: &str = "multi_timeframe";
    pub const FALLBACK: &str = "fallback";
}

/// Unique identifier for a prediction method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MethodId(pub &'static str);

impl MethodId {
    /// Returns the string identifier
    #[inline]
    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl serde::Serialize for MethodId {
    fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        self.0.serialize(s)
    }
}

// ============================================================
// CANDLE DATA
// ============================================================

/// Core OHLCV data trait for adapting external bar types
pub trait Ohlcv {
    fn open(&self) -> f64;
    fn high(&self) -> f64;
    fn low(&self) -> f64;
    fn close(&self) -> f64;

    fn volume(&self) -> u64 {
        0
    }
}

/// One candle. Volume is a count, zero when the feed carries none.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct Candle {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl<'de> serde::Deserialize<'de> for Candle {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        // Close-only feeds omit open/high/low; those collapse to the close.
        #[derive(serde::Deserialize)]
        struct Raw {
            close: f64,
            open: Option<f64>,
            high: Option<f64>,
            low: Option<f64>,
            #[serde(default)]
            volume: u64,
        }
        let raw = Raw::deserialize(d)?;
        Ok(Candle {
            open: raw.open.unwrap_or(raw.close),
            high: raw.high.unwrap_or(raw.close),
            low: raw.low.unwrap_or(raw.close),
            close: raw.close,
            volume: raw.volume,
        })
    }
}

impl Candle {
    /// Degenerate candle carrying only a close price.
    pub fn from_close(close: f64) -> Self {
        Self {
            open: close,
            high: close,
            low: close,
            close,
            volume: 0,
        }
    }

    /// (high + low + close) / 3
    #[inline]
    pub fn typical_price(&self) -> f64 {
        (self.high + self.low + self.close) / 3.0
    }

    /// True range against the previous close; without one, the plain range.
    #[inline]
    pub fn true_range(&self, prev_close: Option<f64>) -> f64 {
        let range = self.high - self.low;
        match prev_close {
            Some(prev) => range
                .max((self.high - prev).abs())
                .max((self.low - prev).abs()),
            None => range,
        }
    }

    /// Validate candle consistency
    pub fn validate(&self) -> Result<()> {
        for value in [self.open, self.high, self.low, self.close] {
            if value.is_nan() {
                return Err(ForecastError::InvalidCandle {
                    index: 0,
                    reason: "NaN in candle",
                });
            }
            if value.is_infinite() {
                return Err(ForecastError::InvalidCandle {
                    index: 0,
                    reason: "Infinite value in candle",
                });
            }
        }
        if self.high < self.low {
            return Err(ForecastError::InvalidCandle {
                index: 0,
                reason: "high < low",
            });
        }
        if self.close <= 0.0 {
            return Err(ForecastError::InvalidCandle {
                index: 0,
                reason: "non-positive close",
            });
        }
        Ok(())
    }
}

impl Ohlcv for Candle {
    fn open(&self) -> f64 {
        self.open
    }

    fn high(&self) -> f64 {
        self.high
    }

    fn low(&self) -> f64 {
        self.low
    }

    fn close(&self) -> f64 {
        self.close
    }

    fn volume(&self) -> u64 {
        self.volume
    }
}

// ============================================================
// SERIES AND CAPABILITY
// ============================================================

/// Which predictor family a series can drive
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum Driver {
    /// Close-price heuristics only
    Close,
    /// Full candle heuristics (ranges, bodies, optionally volume)
    Ohlcv,
}

/// What the input data supports
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum Capability {
    /// Only close prices are real; open/high/low collapse to the close.
    CloseOnly,
    /// Real candles, possibly without volume.
    Ohlcv { volume_available: bool },
}

impl Capability {
    #[inline]
    pub fn driver(self) -> Driver {
        match self {
            Capability::CloseOnly => Driver::Close,
            Capability::Ohlcv { .. } => Driver::Ohlcv,
        }
    }

    #[inline]
    pub fn volume_available(self) -> bool {
        matches!(self, Capability::Ohlcv { volume_available: true })
    }
}

/// A validated, non-empty candle series with its detected capability.
#[derive(Debug, Clone)]
pub struct CandleSeries {
    candles: Vec<Candle>,
    capability: Capability,
}

impl CandleSeries {
    /// Build a close-only series. Every close must be a positive finite
    /// number; the series must not be empty.
    pub fn from_closes(closes: &[f64]) -> Result<Self> {
        let candles: Vec<Candle> = closes.iter().map(|&c| Candle::from_close(c)).collect();
        Self::validated(candles, Capability::CloseOnly)
    }

    /// Build a full-candle series. Volume availability is detected: any
    /// candle with positive volume marks the whole series volume-aware.
    pub fn from_candles(candles: Vec<Candle>) -> Result<Self> {
        let volume_available = candles.iter().any(|c| c.volume > 0);
        Self::validated(candles, Capability::Ohlcv { volume_available })
    }

    /// Build a full-candle series from any [`Ohlcv`] bar type.
    pub fn from_bars<T: Ohlcv>(bars: &[T]) -> Result<Self> {
        let candles: Vec<Candle> = bars
            .iter()
            .map(|b| Candle {
                open: b.open(),
                high: b.high(),
                low: b.low(),
                close: b.close(),
                volume: b.volume(),
            })
            .collect();
        Self::from_candles(candles)
    }

    fn validated(candles: Vec<Candle>, capability: Capability) -> Result<Self> {
        if candles.is_empty() {
            return Err(ForecastError::EmptyInput);
        }
        for (i, candle) in candles.iter().enumerate() {
            candle.validate().map_err(|e| match e {
                ForecastError::InvalidCandle { reason, .. } => {
                    ForecastError::InvalidCandle { index: i, reason }
                }
                other => other,
            })?;
        }
        Ok(Self { candles, capability })
    }

    #[inline]
    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }

    /// Close prices as an owned sequence.
    pub fn closes(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.close).collect()
    }

    #[inline]
    pub fn last_close(&self) -> f64 {
        self.candles[self.candles.len() - 1].close
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.candles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    #[inline]
    pub fn capability(&self) -> Capability {
        self.capability
    }

    #[inline]
    pub fn driver(&self) -> Driver {
        self.capability.driver()
    }
}

// ============================================================
// PREDICTOR TRAIT
// ============================================================

use indicators::IndicatorSet;

/// One heuristic producing a next-period price estimate.
///
/// Implementations must be infallible over any series of at least
/// `min_window` candles; degenerate inputs fall back internally.
pub trait Predictor: Send + Sync {
    fn id(&self) -> MethodId;

    /// Minimum series length; shorter series get the drift fallback
    /// substituted for this method.
    fn min_window(&self) -> usize;

    /// Which series family this predictor needs.
    fn driver(&self) -> Driver;

    fn evaluate(&self, series: &CandleSeries, indicators: &IndicatorSet) -> f64;

    fn validate_config(&self) -> Result<()> {
        Ok(())
    }
}

// ============================================================
// BUILTIN PREDICTORS - generated via macro
// ============================================================

use predictors::*;

/// Macro to generate BuiltinPredictor enum without boilerplate
macro_rules! define_builtin_predictors {
    (
        $(
            $variant:ident($predictor:ty)
        ),* $(,)?
    ) => {
        /// All builtin predictors - fast path via enum dispatch
        #[derive(Debug, Clone)]
        pub enum BuiltinPredictor {
            $($variant($predictor)),*
        }

        impl BuiltinPredictor {
            #[inline]
            pub fn id(&self) -> MethodId {
                match self {
                    $(Self::$variant(p) => Predictor::id(p)),*
                }
            }

            #[inline]
            pub fn min_window(&self) -> usize {
                match self {
                    $(Self::$variant(p) => Predictor::min_window(p)),*
                }
            }

            #[inline]
            pub fn driver(&self) -> Driver {
                match self {
                    $(Self::$variant(p) => Predictor::driver(p)),*
                }
            }

            #[inline]
            pub fn evaluate(&self, series: &CandleSeries, indicators: &IndicatorSet) -> f64 {
                match self {
                    $(Self::$variant(p) => Predictor::evaluate(p, series, indicators)),*
                }
            }

            pub fn validate_config(&self) -> Result<()> {
                match self {
                    $(Self::$variant(p) => Predictor::validate_config(p)),*
                }
            }
        }
    };
}

define_builtin_predictors! {
    // Close-driven family
    TrendRegression(TrendRegression),
    MovingAverage(MovingAverageAlignment),
    Momentum(MomentumRsi),
    Bollinger(BollingerReversion),

    // OHLCV-driven family
    SupportResistance(SupportResistance),
    VolumePrice(VolumePriceConfirmation),
    VolatilityBreakout(VolatilityBreakout),
    MultiTimeframe(MultiTimeframeAlignment),
}

// ============================================================
// PREDICTION RESULT
// ============================================================

/// How the final prediction was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Method {
    /// Weighted blend of the active predictors
    Ensemble,
    /// Too little data: drift on the last close
    Fallback,
}

/// Context diagnostics recorded alongside each prediction.
#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct Diagnostics {
    pub data_points: usize,
    pub capability: Capability,
    pub volume_available: bool,
    /// Sample standard deviation of the 1-step fractional returns.
    pub volatility: f64,
    /// Latest ATR, 0 for series too short to compute one.
    pub atr: f64,
    /// R² of a least-squares fit over all closes.
    pub trend_strength: f64,
    /// (lowest close, highest close) over the series.
    pub price_range: (f64, f64),
    /// Allowed fractional move applied by the clamp.
    pub max_change: f64,
    pub insufficient_data: bool,
}

/// One forecast: the bounded ensemble price plus full attribution.
#[derive(Debug, Clone, serde::Serialize)]
pub struct PredictionResult {
    /// Bounded next-period price estimate.
    pub prediction: f64,
    pub method: Method,
    /// Raw per-method estimates before blending.
    pub per_method: std::collections::BTreeMap<&'static str, f64>,
    /// Normalized ensemble weights (sum to 1).
    pub weights: std::collections::BTreeMap<&'static str, f64>,
    pub diagnostics: Diagnostics,
}

impl PredictionResult {
    /// Prediction rendered to cents, the display precision of the API.
    pub fn formatted(&self) -> String {
        format!("{:.2}", self.prediction)
    }
}

// ============================================================
// PREDICTION ENGINE
// ============================================================

use config::EngineConfig;

/// Main forecasting engine
pub struct PredictionEngine {
    builtin: Vec<BuiltinPredictor>,
    custom: Vec<(Box<dyn Predictor>, Ratio)>,
    config: EngineConfig,
}

impl PredictionEngine {
    /// Forecast the next close for a validated series. Never fails: series
    /// shorter than two candles produce the drift fallback.
    pub fn predict(&self, series: &CandleSeries) -> PredictionResult {
        let n = series.len();
        let last = series.last_close();
        let capability = series.capability();

        if n < 2 {
            return self.fallback_result(series);
        }

        let ind = IndicatorSet::compute(series, &self.config.indicators);
        let volatility = indicators::return_volatility(&ind.closes);

        let mut per_method = std::collections::BTreeMap::new();
        for predictor in &self.builtin {
            if predictor.driver() != series.driver() {
                continue;
            }
            let value = if n >= predictor.min_window() {
                predictor.evaluate(series, &ind)
            } else {
                self.drift(last)
            };
            per_method.insert(predictor.id().0, self.guard(value, last));
        }

        let mut custom_weights = Vec::new();
        for (predictor, weight) in &self.custom {
            // Close-driven customs run anywhere; OHLCV customs need candles.
            if predictor.driver() == Driver::Ohlcv && series.driver() == Driver::Close {
                continue;
            }
            let value = if n >= predictor.min_window() {
                predictor.evaluate(series, &ind)
            } else {
                self.drift(last)
            };
            per_method.insert(predictor.id().0, self.guard(value, last));
            custom_weights.push((predictor.id(), weight.get()));
        }

        let weights =
            weights::compute_weights(&self.config.weights, capability, n, volatility, &custom_weights);

        let ensemble: f64 = weights
            .iter()
            .map(|(method, w)| w * per_method.get(method).copied().unwrap_or(last))
            .sum();

        let max_change = self.max_change(capability, last, &ind, volatility);
        let lower = last * (1.0 - max_change);
        let upper = last * (1.0 + max_change);
        let prediction = ensemble.clamp(lower, upper).max(predictors::PRICE_FLOOR);

        let closes = &ind.closes;
        let low = closes.iter().copied().fold(f64::MAX, f64::min);
        let high = closes.iter().copied().fold(f64::MIN, f64::max);

        PredictionResult {
            prediction,
            method: Method::Ensemble,
            per_method,
            weights,
            diagnostics: Diagnostics {
                data_points: n,
                capability,
                volume_available: capability.volume_available(),
                volatility,
                atr: ind.last_atr(),
                trend_strength: predictors::trend::trend_strength(closes),
                price_range: (low, high),
                max_change,
                insufficient_data: false,
            },
        }
    }

    /// Forecast from bare close prices.
    pub fn predict_closes(&self, closes: &[f64]) -> Result<PredictionResult> {
        let series = CandleSeries::from_closes(closes)?;
        Ok(self.predict(&series))
    }

    /// Forecast from any [`Ohlcv`] bar slice.
    pub fn predict_bars<T: Ohlcv>(&self, bars: &[T]) -> Result<PredictionResult> {
        let series = CandleSeries::from_bars(bars)?;
        Ok(self.predict(&series))
    }

    #[inline]
    fn drift(&self, last: f64) -> f64 {
        last * (1.0 + self.config.fallback_drift)
    }

    /// Replace non-finite or non-positive estimates with the drift fallback.
    fn guard(&self, value: f64, last: f64) -> f64 {
        if value.is_finite() && value > 0.0 {
            value
        } else {
            self.drift(last).max(predictors::PRICE_FLOOR)
        }
    }

    /// Allowed fractional move for the clamp: ATR-relative for candle data,
    /// return-stdev-relative for close-only data, both hard-capped.
    fn max_change(
        &self,
        capability: Capability,
        last: f64,
        ind: &IndicatorSet,
        volatility: f64,
    ) -> f64 {
        let bounds = &self.config.bounds;
        match capability {
            Capability::Ohlcv { .. } => {
                let relative_atr = if last > 0.0 { ind.last_atr() / last } else { 0.0 };
                bounds.max_change_cap.min(relative_atr * bounds.atr_factor)
            }
            Capability::CloseOnly => bounds
                .max_change_cap
                .min(volatility * bounds.stdev_factor),
        }
    }

    fn fallback_result(&self, series: &CandleSeries) -> PredictionResult {
        let last = series.last_close();
        let prediction = self.drift(last).max(predictors::PRICE_FLOOR);
        let capability = series.capability();

        let mut per_method = std::collections::BTreeMap::new();
        per_method.insert(methods::FALLBACK, prediction);
        let mut weights = std::collections::BTreeMap::new();
        weights.insert(methods::FALLBACK, 1.0);

        PredictionResult {
            prediction,
            method: Method::Fallback,
            per_method,
            weights,
            diagnostics: Diagnostics {
                data_points: series.len(),
                capability,
                volume_available: capability.volume_available(),
                volatility: 0.0,
                atr: 0.0,
                trend_strength: 0.5,
                price_range: (last, last),
                max_change: 0.0,
                insufficient_data: true,
            },
        }
    }

    fn validate(&self) -> Result<()> {
        self.config.validate()?;
        for p in &self.builtin {
            p.validate_config()?;
        }
        for (p, _) in &self.custom {
            p.validate_config()?;
        }
        Ok(())
    }
}

// ============================================================
// BUILDER
// ============================================================

/// Generate an array of `BuiltinPredictor` variants using `Default::default()` for each inner type.
macro_rules! builtin_defaults {
    ($($variant:ident),* $(,)?) => {
        [$(BuiltinPredictor::$variant(Default::default())),*]
    };
}

/// Builder for creating PredictionEngine instances
pub struct EngineBuilder {
    builtin: Vec<BuiltinPredictor>,
    custom: Vec<(Box<dyn Predictor>, Ratio)>,
    config: EngineConfig,
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self {
            builtin: Vec::new(),
            custom: Vec::new(),
            config: EngineConfig::default(),
        }
    }

    /// Add both predictor families with default configurations
    pub fn with_all_defaults(self) -> Self {
        self.with_close_defaults().with_ohlcv_defaults()
    }

    /// Add the close-driven family with defaults (4)
    pub fn with_close_defaults(mut self) -> Self {
        self.builtin.extend(builtin_defaults![
            TrendRegression,
            MovingAverage,
            Momentum,
            Bollinger,
        ]);
        self
    }

    /// Add the OHLCV-driven family with defaults (4)
    pub fn with_ohlcv_defaults(mut self) -> Self {
        self.builtin.extend(builtin_defaults![
            SupportResistance,
            VolumePrice,
            VolatilityBreakout,
            MultiTimeframe,
        ]);
        self
    }

    /// Replace the engine configuration
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Add a builtin predictor
    #[allow(clippy::should_implement_trait)]
    pub fn add(mut self, predictor: BuiltinPredictor) -> Self {
        self.builtin.push(predictor);
        self
    }

    /// Add with config validation
    pub fn add_checked(mut self, predictor: BuiltinPredictor) -> Result<Self> {
        predictor.validate_config()?;
        self.builtin.push(predictor);
        Ok(self)
    }

    /// Add a custom predictor (slow path) with its raw ensemble weight
    pub fn add_custom<P: Predictor + 'static>(mut self, predictor: P, weight: Ratio) -> Self {
        self.custom.push((Box::new(predictor), weight));
        self
    }

    /// Build the engine
    pub fn build(self) -> Result<PredictionEngine> {
        let engine = PredictionEngine {
            builtin: self.builtin,
            custom: self.custom,
            config: self.config,
        };
        engine.validate()?;
        Ok(engine)
    }
}

// ============================================================
// PARALLEL FORECASTING
// ============================================================

use rayon::prelude::*;

/// Forecast for a single instrument
#[derive(Debug)]
pub struct SymbolForecast {
    pub symbol: String,
    pub result: PredictionResult,
}

/// Error from forecasting a single instrument
#[derive(Debug)]
pub struct SymbolError {
    pub symbol: String,
    pub error: ForecastError,
}

/// Parallel forecasting over multiple instruments
pub fn predict_parallel<'a, T, I>(
    engine: &PredictionEngine,
    instruments: I,
) -> (Vec<SymbolForecast>, Vec<SymbolError>)
where
    T: Ohlcv + Sync + 'a,
    I: IntoParallelIterator<Item = (&'a str, &'a [T])>,
{
    let results: Vec<_> = instruments
        .into_par_iter()
        .map(|(symbol, bars)| {
            engine
                .predict_bars(bars)
                .map(|result| SymbolForecast {
                    symbol: symbol.to_string(),
                    result,
                })
                .map_err(|error| SymbolError {
                    symbol: symbol.to_string(),
                    error,
                })
        })
        .collect();

    let mut successes = Vec::new();
    let mut errors = Vec::new();

    for result in results {
        match result {
            Ok(r) => successes.push(r),
            Err(e) => errors.push(e),
        }
    }

    (successes, errors)
}

// ============================================================
// TESTS
// ============================================================
