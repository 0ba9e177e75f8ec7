//! Benchmarks for next-period price forecasting.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use candlecast::prelude::*;

/// Simple test bar structure
#[derive(Debug, Clone, Copy)]
struct TestBar {
    o: f64,
    h: f64,
    l: f64,
    c: f64,
    v: u64,
}

impl Ohlcv for TestBar {
    fn open(&self) -> f64 {
        self.o
    }

    fn high(&self) -> f64 {
        self.h
    }

    fn low(&self) -> f64 {
        self.l
    }

    fn close(&self) -> f64 {
        self.c
    }

    fn volume(&self) -> u64 {
        self.v
    }
}

/// Generate realistic random bars
fn generate_bars(n: usize) -> Vec<TestBar> {
    let mut bars = Vec::with_capacity(n);
    let mut price = 100.0;

    for i in 0..n {
        let change = ((i * 7 + 13) % 100) as f64 / 50.0 - 1.0; // Deterministic "random"
        let volatility = 2.0 + ((i * 3) % 10) as f64 / 5.0;

        let o = price;
        let c = price + change;
        let h = o.max(c) + volatility * 0.5;
        let l = o.min(c) - volatility * 0.5;

        bars.push(TestBar {
            o,
            h,
            l,
            c,
            v: 500 + ((i * 11) % 1000) as u64,
        });
        price = c;
    }

    bars
}

fn bench_close_only(c: &mut Criterion) {
    let bars = generate_bars(1000);
    let closes: Vec<f64> = bars.iter().map(|b| b.c).collect();

    let engine = EngineBuilder::new().with_close_defaults().build().unwrap();

    c.bench_function("predict_closes_1000", |b| {
        b.iter(|| {
            let _ = black_box(engine.predict_closes(black_box(&closes)));
        })
    });
}

fn bench_ohlcv(c: &mut Criterion) {
    let bars = generate_bars(1000);

    let engine = EngineBuilder::new().with_ohlcv_defaults().build().unwrap();

    c.bench_function("predict_bars_1000", |b| {
        b.iter(|| {
            let _ = black_box(engine.predict_bars(black_box(&bars)));
        })
    });
}

fn bench_indicator_set(c: &mut Criterion) {
    let bars = generate_bars(1000);
    let series = CandleSeries::from_bars(&bars).unwrap();
    let cfg = IndicatorConfig::default();

    c.bench_function("indicator_set_1000", |b| {
        b.iter(|| {
            let _ = black_box(IndicatorSet::compute(black_box(&series), &cfg));
        })
    });
}

fn bench_series_scaling(c: &mut Criterion) {
    let engine = EngineBuilder::new().with_all_defaults().build().unwrap();

    let mut group = c.benchmark_group("predict_scaling");
    for size in [50, 200, 1000, 5000] {
        let bars = generate_bars(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &bars, |b, bars| {
            b.iter(|| {
                let _ = black_box(engine.predict_bars(black_box(bars)));
            })
        });
    }
    group.finish();
}

fn bench_parallel_symbols(c: &mut Criterion) {
    let engine = EngineBuilder::new().with_all_defaults().build().unwrap();

    let universes: Vec<Vec<TestBar>> = (0..64).map(|i| generate_bars(200 + i * 3)).collect();
    let symbols: Vec<String> = (0..64).map(|i| format!("SYM{i}")).collect();

    c.bench_function("predict_parallel_64_symbols", |b| {
        b.iter(|| {
            let instruments: Vec<(&str, &[TestBar])> = symbols
                .iter()
                .zip(&universes)
                .map(|(s, bars)| (s.as_str(), bars.as_slice()))
                .collect();
            let _ = black_box(predict_parallel(&engine, instruments));
        })
    });
}

criterion_group!(
    benches,
    bench_close_only,
    bench_ohlcv,
    bench_indicator_set,
    bench_series_scaling,
    bench_parallel_symbols
);
criterion_main!(benches);
