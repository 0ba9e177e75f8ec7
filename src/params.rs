//! Parameter metadata for predictors
//!
//! This module provides metadata about predictor parameters, enabling:
//! - Grid search optimization
//! - Parameter documentation
//! - Automatic configuration UI generation
//!
//! # Example
//!
//! ```rust
//! use candlecast::params::{ParamMeta, ParamType, ParameterizedPredictor};
//! use candlecast::prelude::*;
//!
//! // Get parameter metadata for a predictor
//! let params = MomentumRsi::param_meta();
//! for param in params {
//!     println!("{}: {:?} (default: {})", param.name, param.param_type, param.default);
//! }
//! ```

use std::collections::HashMap;

use crate::{ForecastError, Period, Ratio, Result};

// ============================================================
// PARAMETER TYPES
// ============================================================

/// Type of parameter value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    /// Ratio value in 0.0..=1.0
    Ratio,
    /// Period value (positive integer)
    Period,
    /// Unbounded positive factor (e.g. a volume or volatility multiplier)
    Factor,
}

/// Metadata for a single predictor parameter
#[derive(Debug, Clone)]
pub struct ParamMeta {
    /// Parameter name (e.g., "reversion_pull")
    pub name: &'static str,
    /// Parameter type
    pub param_type: ParamType,
    /// Default value
    pub default: f64,
    /// Range for optimization: (min, max, step)
    pub range: (f64, f64, f64),
    /// Human-readable description
    pub description: &'static str,
}

impl ParamMeta {
    /// Create a new ParamMeta for a Ratio parameter
    pub const fn ratio(
        name: &'static str,
        default: f64,
        range: (f64, f64, f64),
        description: &'static str,
    ) -> Self {
        Self { name, param_type: ParamType::Ratio, default, range, description }
    }

    /// Create a new ParamMeta for a Period parameter
    pub const fn period(
        name: &'static str,
        default: f64,
        range: (f64, f64, f64),
        description: &'static str,
    ) -> Self {
        Self { name, param_type: ParamType::Period, default, range, description }
    }

    /// Create a new ParamMeta for a Factor parameter
    pub const fn factor(
        name: &'static str,
        default: f64,
        range: (f64, f64, f64),
        description: &'static str,
    ) -> Self {
        Self { name, param_type: ParamType::Factor, default, range, description }
    }

    /// Generate all values for grid search
    pub fn generate_grid(&self) -> Vec<f64> {
        let (min, max, step) = self.range;
        let mut values = Vec::new();
        let mut v = min;
        while v <= max + f64::EPSILON {
            values.push(v);
            v += step;
        }
        values
    }

    /// Validate a value for this parameter
    pub fn validate(&self, value: f64) -> Result<()> {
        let (min, max, _) = self.range;
        if value < min || value > max {
            return Err(ForecastError::OutOfRange { field: self.name, value, min, max });
        }
        match self.param_type {
            // Ratio bounds are enforced again by Ratio::new on construction.
            ParamType::Ratio => Ok(()),
            ParamType::Period => {
                if value < 1.0 || value.fract() != 0.0 {
                    return Err(ForecastError::InvalidValue("Period must be a positive integer"));
                }
                Ok(())
            },
            ParamType::Factor => {
                if !value.is_finite() || value <= 0.0 {
                    return Err(ForecastError::InvalidValue(
                        "Factor must be a positive finite number",
                    ));
                }
                Ok(())
            },
        }
    }
}

// ============================================================
// PARAMETERIZED PREDICTOR TRAIT
// ============================================================

/// Trait for predictors that support parameterization
///
/// Implementing this trait enables:
/// - Discovery of available parameters
/// - Creation of predictors with custom parameter values
/// - Grid search optimization
pub trait ParameterizedPredictor: Sized {
    /// Returns metadata for all configurable parameters
    fn param_meta() -> &'static [ParamMeta];

    /// Creates a predictor with parameters from a HashMap
    ///
    /// Missing parameters use their default values.
    fn with_params(params: &HashMap<&str, f64>) -> Result<Self>;

    /// Returns the method name string
    fn method_str() -> &'static str;
}

// ============================================================
// PARAMETER VALUE HELPERS
// ============================================================

/// Helper to get a Ratio from params with default fallback
pub fn get_ratio(params: &HashMap<&str, f64>, key: &str, default: f64) -> Result<Ratio> {
    let value = params.get(key).copied().unwrap_or(default);
    Ratio::new(value)
}

/// Helper to get a Period from params with default fallback
pub fn get_period(params: &HashMap<&str, f64>, key: &str, default: usize) -> Result<Period> {
    let value = params.get(key).copied().unwrap_or(default as f64);
    Period::new(value as usize)
}

/// Helper to get a raw positive factor from params with default fallback
pub fn get_factor(params: &HashMap<&str, f64>, key: &str, default: f64) -> Result<f64> {
    let value = params.get(key).copied().unwrap_or(default);
    if !value.is_finite() || value <= 0.0 {
        return Err(ForecastError::InvalidValue(
            "Factor must be a positive finite number",
        ));
    }
    Ok(value)
}

// ============================================================
// TESTS
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_param_meta_ratio() {
        let meta = ParamMeta::ratio("test_ratio", 0.5, (0.3, 0.7, 0.1), "Test ratio parameter");

        assert_eq!(meta.name, "test_ratio");
        assert_eq!(meta.param_type, ParamType::Ratio);
        assert_eq!(meta.default, 0.5);
    }

    #[test]
    fn test_param_meta_period() {
        let meta = ParamMeta::period("test_period", 14.0, (10.0, 20.0, 2.0), "Test period");

        assert_eq!(meta.name, "test_period");
        assert_eq!(meta.param_type, ParamType::Period);
        assert_eq!(meta.default, 14.0);
    }

    #[test]
    fn test_generate_grid() {
        let meta = ParamMeta::ratio("test", 0.5, (0.3, 0.7, 0.2), "Test");

        let grid = meta.generate_grid();
        assert_eq!(grid.len(), 3);
        assert!((grid[0] - 0.3).abs() < f64::EPSILON);
        assert!((grid[1] - 0.5).abs() < f64::EPSILON);
        assert!((grid[2] - 0.7).abs() < f64::EPSILON);
    }

    #[test]
    fn test_validate_ratio() {
        let meta = ParamMeta::ratio("test", 0.5, (0.3, 0.7, 0.1), "Test");

        assert!(meta.validate(0.5).is_ok());
        assert!(meta.validate(0.3).is_ok());
        assert!(meta.validate(0.7).is_ok());
        assert!(meta.validate(0.2).is_err());
        assert!(meta.validate(0.8).is_err());
    }

    #[test]
    fn test_validate_period() {
        let meta = ParamMeta::period("test", 14.0, (10.0, 20.0, 2.0), "Test");

        assert!(meta.validate(14.0).is_ok());
        assert!(meta.validate(10.0).is_ok());
        assert!(meta.validate(20.0).is_ok());
        assert!(meta.validate(8.0).is_err());
        assert!(meta.validate(22.0).is_err());
        assert!(meta.validate(14.5).is_err());
    }

    #[test]
    fn test_validate_factor() {
        let meta = ParamMeta::factor("test", 1.5, (1.0, 3.0, 0.5), "Test");

        assert!(meta.validate(1.5).is_ok());
        assert!(meta.validate(0.5).is_err());
        assert!(meta.validate(f64::NAN).is_err());
    }

    #[test]
    fn test_get_ratio_helper() {
        let mut params = HashMap::new();
        params.insert("key1", 0.8);

        assert!((get_ratio(&params, "key1", 0.5).unwrap().get() - 0.8).abs() < f64::EPSILON);
        assert!((get_ratio(&params, "key2", 0.5).unwrap().get() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_get_period_helper() {
        let mut params = HashMap::new();
        params.insert("key1", 20.0);

        assert_eq!(get_period(&params, "key1", 14).unwrap().get(), 20);
        assert_eq!(get_period(&params, "key2", 14).unwrap().get(), 14);
    }

    #[test]
    fn test_get_factor_helper() {
        let mut params = HashMap::new();
        params.insert("key1", 2.5);

        assert!((get_factor(&params, "key1", 1.5).unwrap() - 2.5).abs() < f64::EPSILON);
        assert!((get_factor(&params, "key2", 1.5).unwrap() - 1.5).abs() < f64::EPSILON);
        params.insert("bad", -1.0);
        assert!(get_factor(&params, "bad", 1.5).is_err());
    }
}
