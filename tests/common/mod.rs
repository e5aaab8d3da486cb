//! Shared test engines and data builders.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use chrono::{Duration, NaiveDate};
use serde_json::{json, Value};
use spend_forecast::engine::{BoxedForecaster, ForecastEngine, Forecaster, SeasonalConfig};
use spend_forecast::error::{EngineError, Result};

/// What the stub hands back from `predict`.
#[derive(Debug, Clone, Copy)]
pub enum StubOutput {
    /// Last input value plus `step * (i + 1)`.
    Continue { step: f64 },
    /// Always this many values regardless of horizon.
    FixedLength(usize),
    /// NaN everywhere.
    NotFinite,
    /// `fit` fails with this error.
    Fail,
}

/// Engine that records every series it is asked to fit.
#[derive(Debug, Clone)]
pub struct StubEngine {
    output: StubOutput,
    calls: Arc<Mutex<Vec<(Vec<f64>, SeasonalConfig)>>>,
}

impl StubEngine {
    pub fn new(output: StubOutput) -> Self {
        Self {
            output,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn continuing(step: f64) -> Self {
        Self::new(StubOutput::Continue { step })
    }

    pub fn calls(&self) -> Vec<(Vec<f64>, SeasonalConfig)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn last_series(&self) -> Vec<f64> {
        self.calls().last().map(|c| c.0.clone()).unwrap_or_default()
    }
}

struct StubModel {
    last: f64,
    output: StubOutput,
    fitted: Vec<f64>,
}

impl Forecaster for StubModel {
    fn fit(&mut self, series: &[f64]) -> Result<()> {
        self.fitted = series.to_vec();
        Ok(())
    }

    fn predict(&self, horizon: usize) -> Result<Vec<f64>> {
        Ok(match self.output {
            StubOutput::Continue { step } => (1..=horizon)
                .map(|i| self.last + step * i as f64)
                .collect(),
            StubOutput::FixedLength(n) => vec![1.0; n],
            StubOutput::NotFinite => vec![f64::NAN; horizon],
            StubOutput::Fail => unreachable!("fit fails first"),
        })
    }

    fn fitted_values(&self) -> Option<&[f64]> {
        Some(&self.fitted)
    }

    fn residuals(&self) -> Option<&[f64]> {
        None
    }

    fn name(&self) -> &str {
        "Stub"
    }
}

impl ForecastEngine for StubEngine {
    fn fit(&self, series: &[f64], config: SeasonalConfig) -> Result<BoxedForecaster> {
        self.calls.lock().unwrap().push((series.to_vec(), config));
        if let StubOutput::Fail = self.output {
            return Err(EngineError::ComputationError(
                "no valid ARIMA model could be fitted".to_string(),
            ));
        }
        let mut model = StubModel {
            last: series.last().copied().unwrap_or(0.0),
            output: self.output,
            fitted: Vec::new(),
        };
        model.fit(series)?;
        Ok(Box::new(model))
    }

    fn name(&self) -> &str {
        "stub"
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// `count` consecutive daily records starting at `start`, amount = `f(i)`.
pub fn daily_records(start: NaiveDate, count: usize, f: impl Fn(usize) -> f64) -> Vec<Value> {
    (0..count)
        .map(|i| {
            json!({
                "Date": (start + Duration::days(i as i64)).format("%Y-%m-%d").to_string(),
                "Amount": f(i),
            })
        })
        .collect()
}

/// `n` sales values with a mild trend and a 12-step cycle.
pub fn sales(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| {
            100.0
                + 0.8 * i as f64
                + 15.0 * (2.0 * std::f64::consts::PI * i as f64 / 12.0).sin()
                + ((i * 37 % 11) as f64 - 5.0) * 0.4
        })
        .collect()
}
