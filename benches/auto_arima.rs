//! Benchmarks for model selection and the irregular pipeline.

use chrono::{Duration, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use serde_json::json;
use spend_forecast::config::ForecastSettings;
use spend_forecast::engine::arima::AutoArima;
use spend_forecast::engine::{AutoArimaEngine, Forecaster};
use spend_forecast::pipeline::run_irregular;

fn generate_seasonal(n: usize, period: usize) -> Vec<f64> {
    (0..n)
        .map(|i| {
            100.0
                + 0.5 * i as f64
                + 10.0 * (2.0 * std::f64::consts::PI * i as f64 / period as f64).sin()
                + ((i * 31 % 17) as f64 - 8.0) * 0.3
        })
        .collect()
}

fn bench_auto_arima(c: &mut Criterion) {
    let mut group = c.benchmark_group("auto_arima");
    group.sample_size(10);

    for size in [31, 48, 80].iter() {
        let series = generate_seasonal(*size, 12);

        group.bench_with_input(BenchmarkId::new("stepwise", size), size, |b, _| {
            b.iter(|| {
                let mut model = AutoArima::seasonal(12);
                model.fit(black_box(&series)).ok();
                model
            })
        });

        group.bench_with_input(BenchmarkId::new("non_seasonal", size), size, |b, _| {
            b.iter(|| {
                let mut model = AutoArima::new();
                model.fit(black_box(&series)).ok();
                model
            })
        });
    }

    group.finish();
}

fn bench_irregular_pipeline(c: &mut Criterion) {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let records: Vec<_> = generate_seasonal(200, 7)
        .into_iter()
        .enumerate()
        .filter(|(i, _)| i % 5 != 3)
        .map(|(i, amount)| {
            json!({
                "Date": (start + Duration::days(i as i64)).to_string(),
                "Amount": amount,
            })
        })
        .collect();
    let body = serde_json::to_vec(&json!({"data": records, "prediction_length": 30})).unwrap();
    let engine = AutoArimaEngine::new();
    let settings = ForecastSettings::default();

    let mut group = c.benchmark_group("irregular_pipeline");
    group.sample_size(10);
    group.bench_function("200_days", |b| {
        b.iter(|| run_irregular(&engine, &settings, black_box(&body)))
    });
    group.finish();
}

criterion_group!(benches, bench_auto_arima, bench_irregular_pipeline);
criterion_main!(benches);
