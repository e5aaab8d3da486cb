//! Irregular-series pipeline.
//!
//! Dated observations are bucketed onto a daily grid, interior gaps are
//! interpolated, and the trailing window is forecast. Forecast dates continue
//! from the last day of the full series, not the window.

use tracing::debug;

use crate::config::ForecastSettings;
use crate::core::DailySeries;
use crate::engine::ForecastEngine;
use crate::error::{PipelineError, PipelineResult};
use crate::pipeline::invoke_engine;
use crate::pipeline::output::IrregularForecast;
use crate::pipeline::validate::{validate_irregular, IrregularRequest};

const UNRESOLVED_BOUNDARY: &str =
    "Insufficient data at boundary: series has unresolved missing values";

/// Validate a raw `/irregular_predict` body and forecast it.
pub fn run_irregular(
    engine: &dyn ForecastEngine,
    settings: &ForecastSettings,
    body: &[u8],
) -> PipelineResult<IrregularForecast> {
    let request = validate_irregular(body, settings)?;
    forecast_irregular(engine, settings, &request)
}

/// Forecast an already validated request.
pub fn forecast_irregular(
    engine: &dyn ForecastEngine,
    settings: &ForecastSettings,
    request: &IrregularRequest,
) -> PipelineResult<IrregularForecast> {
    let span = DailySeries::span_days(&request.observations);
    if span > settings.max_daily_points {
        return Err(PipelineError::constraint(format!(
            "Data must not span more than {} days",
            settings.max_daily_points
        )));
    }

    let daily = DailySeries::resample(&request.observations);
    if daily.len() < settings.min_daily_points {
        return Err(PipelineError::constraint(format!(
            "Data must contain at least {} points",
            settings.min_daily_points
        )));
    }

    let filled = daily.interpolated();
    let window = filled.tail(settings.window);
    debug!(
        observations = request.observations.len(),
        days = daily.len(),
        gaps = daily.missing_count(),
        unresolved = filled.missing_count(),
        window = window.len(),
        "irregular series prepared"
    );

    let values = window
        .complete_values()
        .map_err(|_| PipelineError::constraint(UNRESOLVED_BOUNDARY))?;
    let last_actual = filled
        .last_value()
        .ok_or_else(|| PipelineError::constraint(UNRESOLVED_BOUNDARY))?;

    let horizon = request.prediction_length;
    let predictions = invoke_engine(engine, &values, horizon, settings.seasonal_config())?;
    let dates = filled.following_dates(horizon);

    Ok(IrregularForecast::new(&dates, &predictions, last_actual))
}
