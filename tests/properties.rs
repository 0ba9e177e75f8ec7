//! Property-based tests for the forecasting pipeline.

use candlecast::indicators;
use candlecast::prelude::*;
use proptest::prelude::*;

fn close_series_strategy() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(1.0f64..1000.0, 1..60)
}

fn candle_strategy() -> impl Strategy<Value = Candle> {
    (1.0f64..500.0, 0.0f64..10.0, 0.0f64..10.0, 0u64..5000).prop_map(
        |(base, up, down, volume)| Candle {
            open: base,
            high: base + up,
            low: (base - down).max(0.01),
            close: base,
            volume,
        },
    )
}

fn candle_series_strategy() -> impl Strategy<Value = Vec<Candle>> {
    prop::collection::vec(candle_strategy(), 1..60)
}

fn engine() -> PredictionEngine {
    EngineBuilder::new().with_all_defaults().build().unwrap()
}

proptest! {
    #[test]
    fn prediction_is_always_positive_and_finite(closes in close_series_strategy()) {
        let result = engine().predict_closes(&closes).unwrap();
        prop_assert!(result.prediction.is_finite());
        prop_assert!(result.prediction > 0.0);
    }

    #[test]
    fn prediction_stays_within_clamp(closes in close_series_strategy()) {
        let result = engine().predict_closes(&closes).unwrap();
        if result.method == Method::Ensemble {
            let last = closes[closes.len() - 1];
            let mc = result.diagnostics.max_change;
            prop_assert!(mc <= 0.15 + 1e-12);
            let floor = (last * (1.0 - mc)).max(0.01);
            prop_assert!(result.prediction >= floor - 1e-9);
            prop_assert!(result.prediction <= last * (1.0 + mc) + 1e-9);
        }
    }

    #[test]
    fn weights_always_sum_to_one(candles in candle_series_strategy()) {
        let result = engine().predict_bars(&candles).unwrap();
        let total: f64 = result.weights.values().sum();
        prop_assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn ohlcv_prediction_positive(candles in candle_series_strategy()) {
        let result = engine().predict_bars(&candles).unwrap();
        prop_assert!(result.prediction.is_finite());
        prop_assert!(result.prediction > 0.0);
    }

    #[test]
    fn per_method_estimates_are_positive(candles in candle_series_strategy()) {
        let result = engine().predict_bars(&candles).unwrap();
        for (method, value) in &result.per_method {
            prop_assert!(value.is_finite(), "{} produced {}", method, value);
            prop_assert!(*value > 0.0, "{} produced {}", method, value);
        }
    }

    #[test]
    fn prediction_is_deterministic(candles in candle_series_strategy()) {
        let a = engine().predict_bars(&candles).unwrap();
        let b = engine().predict_bars(&candles).unwrap();
        prop_assert_eq!(a.prediction, b.prediction);
    }

    #[test]
    fn indicator_sequences_match_input_length(closes in close_series_strategy()) {
        let series = CandleSeries::from_closes(&closes).unwrap();
        let set = IndicatorSet::compute(&series, &IndicatorConfig::default());
        let n = closes.len();
        prop_assert_eq!(set.rsi.len(), n);
        prop_assert_eq!(set.bollinger.middle.len(), n);
        prop_assert_eq!(set.bollinger.upper.len(), n);
        prop_assert_eq!(set.bollinger.lower.len(), n);
        prop_assert_eq!(set.macd.line.len(), n);
        prop_assert_eq!(set.macd.signal.len(), n);
        prop_assert_eq!(set.atr.len(), n);
        prop_assert_eq!(set.stochastic.k.len(), n);
        prop_assert_eq!(set.obv.len(), n);
        prop_assert_eq!(set.vwap.len(), n);
    }

    #[test]
    fn rsi_and_stochastic_stay_bounded(closes in close_series_strategy()) {
        let series = CandleSeries::from_closes(&closes).unwrap();
        let set = IndicatorSet::compute(&series, &IndicatorConfig::default());
        for value in &set.rsi {
            prop_assert!((0.0..=100.0).contains(value));
        }
        for value in &set.stochastic.k {
            prop_assert!((0.0..=100.0).contains(value));
        }
    }

    #[test]
    fn return_volatility_is_non_negative(closes in close_series_strategy()) {
        let vol = indicators::return_volatility(&closes);
        prop_assert!(vol.is_finite());
        prop_assert!(vol >= 0.0);
    }
}
