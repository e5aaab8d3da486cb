//! Response shapes and the rounding applied to everything a client sees.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

const SUCCESS: &str = "success";

/// Round to two decimals, ties to even.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

/// `/predict` success body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegularForecast {
    pub prediction: Vec<f64>,
    pub status: &'static str,
}

impl RegularForecast {
    pub fn new(predictions: &[f64]) -> Self {
        Self {
            prediction: predictions.iter().copied().map(round2).collect(),
            status: SUCCESS,
        }
    }
}

/// `/irregular_predict` success body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IrregularForecast {
    /// Last value of the full daily series.
    pub actual_spend: f64,
    /// Mean of the unrounded predictions.
    pub forecast_amount: f64,
    /// `YYYY-MM-DD` to prediction, in date order.
    pub forecasts: BTreeMap<String, f64>,
    pub status: &'static str,
}

impl IrregularForecast {
    /// Pair `dates` with `predictions` and compute the aggregates.
    ///
    /// Both slices have the same, non-zero length.
    pub fn new(dates: &[NaiveDate], predictions: &[f64], last_actual: f64) -> Self {
        let mean = predictions.iter().sum::<f64>() / predictions.len() as f64;
        let forecasts = dates
            .iter()
            .zip(predictions)
            .map(|(date, value)| (date.format("%Y-%m-%d").to_string(), round2(*value)))
            .collect();

        Self {
            actual_spend: round2(last_actual),
            forecast_amount: round2(mean),
            forecasts,
            status: SUCCESS,
        }
    }
}
