//! Property-based tests for series preparation, output formatting and models.
//!
//! These tests verify invariants that should hold for all valid inputs,
//! using randomly generated observations and series.

mod common;

use chrono::{Duration, NaiveDate};
use common::{StubEngine, StubOutput};
use proptest::prelude::*;
use serde_json::json;
use spend_forecast::config::ForecastSettings;
use spend_forecast::core::{DailySeries, DatedObservation};
use spend_forecast::engine::arima::{AutoArima, SeasonalArima};
use spend_forecast::engine::Forecaster;
use spend_forecast::pipeline::{round2, run_irregular, run_regular};

fn base_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

/// Strategy for dated observations: day offsets within a range, some nulls.
fn observations_strategy(max_offset: i64, max_len: usize) -> impl Strategy<Value = Vec<DatedObservation>> {
    prop::collection::vec(
        (0..max_offset, prop::option::weighted(0.9, 0.0..500.0_f64)),
        1..max_len,
    )
    .prop_map(|pairs| {
        pairs
            .into_iter()
            .map(|(offset, amount)| {
                DatedObservation::new(base_date() + Duration::days(offset), amount)
            })
            .collect()
    })
}

/// Strategy for generating valid time series values.
/// Adds small variation to avoid all-constant series.
fn valid_values_strategy(min_len: usize, max_len: usize) -> impl Strategy<Value = Vec<f64>> {
    (min_len..max_len).prop_flat_map(|len| {
        prop::collection::vec(1.0..1000.0_f64, len).prop_map(|mut v| {
            for (i, val) in v.iter_mut().enumerate() {
                *val += (i as f64) * 0.001;
            }
            v
        })
    })
}

// =============================================================================
// Property: Resampling yields one slot per day from first to last observation
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn resample_covers_every_day_once(obs in observations_strategy(120, 60)) {
        let series = DailySeries::resample(&obs);

        let first = obs.iter().map(|o| o.date).min().unwrap();
        let last = obs.iter().map(|o| o.date).max().unwrap();
        prop_assert_eq!(series.first_date(), Some(first));
        prop_assert_eq!(series.last_date(), Some(last));
        prop_assert_eq!(series.len() as i64, (last - first).num_days() + 1);
        for pair in series.dates().windows(2) {
            prop_assert_eq!(pair[1] - pair[0], Duration::days(1));
        }
    }

    #[test]
    fn interpolation_keeps_known_values_and_fills_interior(obs in observations_strategy(90, 40)) {
        let series = DailySeries::resample(&obs);
        let filled = series.interpolated();

        let known: Vec<usize> = series
            .values()
            .iter()
            .enumerate()
            .filter_map(|(i, v)| v.map(|_| i))
            .collect();

        for (before, after) in series.values().iter().zip(filled.values()) {
            if before.is_some() {
                prop_assert_eq!(before, after);
            }
        }
        if let (Some(&lo), Some(&hi)) = (known.first(), known.last()) {
            for v in &filled.values()[lo..=hi] {
                prop_assert!(v.is_some());
            }
        }
    }

    #[test]
    fn tail_is_bounded_by_window(len in 1usize..200, window in 1usize..120) {
        let series = DailySeries::from_values(base_date(), vec![1.0; len]);
        let tail = series.tail(window);

        prop_assert_eq!(tail.len(), len.min(window));
        prop_assert_eq!(tail.last_date(), series.last_date());
    }
}

// =============================================================================
// Property: Rounding is stable and close
// =============================================================================

proptest! {
    #[test]
    fn round2_is_idempotent_and_close(x in -1.0e6..1.0e6_f64) {
        let r = round2(x);
        prop_assert_eq!(round2(r), r);
        prop_assert!((r - x).abs() <= 0.005 + 1e-9);
    }
}

// =============================================================================
// Property: Pipelines honour the requested horizon
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    #[test]
    fn regular_prediction_length_matches_horizon(
        values in valid_values_strategy(31, 120),
        horizon in 1usize..60
    ) {
        let body = serde_json::to_vec(&json!({"sales_data": values, "prediction_length": horizon})).unwrap();
        let result = run_regular(&StubEngine::continuing(0.1), &ForecastSettings::default(), &body).unwrap();
        prop_assert_eq!(result.prediction.len(), horizon);
    }

    #[test]
    fn irregular_forecast_dates_are_consecutive(
        days in 32usize..150,
        horizon in 1usize..40
    ) {
        let records: Vec<_> = (0..days)
            .map(|i| json!({
                "Date": (base_date() + Duration::days(i as i64)).to_string(),
                "Amount": (i % 9) as f64 + 1.0,
            }))
            .collect();
        let body = serde_json::to_vec(&json!({"data": records, "prediction_length": horizon})).unwrap();
        let engine = StubEngine::new(StubOutput::Continue { step: 1.0 });

        let result = run_irregular(&engine, &ForecastSettings::default(), &body).unwrap();

        prop_assert_eq!(result.forecasts.len(), horizon);
        let expected_first = base_date() + Duration::days(days as i64);
        let first = result.forecasts.keys().next().unwrap();
        prop_assert_eq!(first, &expected_first.format("%Y-%m-%d").to_string());
        prop_assert_eq!(engine.last_series().len(), days.min(80));
    }
}

// =============================================================================
// Property: Model forecasts have the requested length and are finite
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    #[test]
    fn arima_forecasts_are_finite(
        values in valid_values_strategy(30, 100),
        horizon in 1usize..20
    ) {
        let mut model = SeasonalArima::arima(1, 0, 1);
        model.fit(&values).unwrap();
        let forecast = model.predict(horizon).unwrap();
        prop_assert_eq!(forecast.len(), horizon);
        for val in forecast {
            prop_assert!(val.is_finite(), "Forecast contains non-finite value: {}", val);
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(6))]

    #[test]
    fn auto_arima_forecast_length_matches_horizon(
        values in valid_values_strategy(31, 80),
        horizon in 1usize..30
    ) {
        let mut model = AutoArima::seasonal(12);
        model.fit(&values).unwrap();
        let forecast = model.predict(horizon).unwrap();
        prop_assert_eq!(forecast.len(), horizon);
        prop_assert!(forecast.iter().all(|v| v.is_finite()));
    }
}
