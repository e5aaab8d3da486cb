//! Regular-series pipeline: an evenly spaced series forecast as-is.

use tracing::debug;

use crate::config::ForecastSettings;
use crate::engine::ForecastEngine;
use crate::error::PipelineResult;
use crate::pipeline::output::RegularForecast;
use crate::pipeline::validate::{validate_regular, RegularRequest};
use crate::pipeline::invoke_engine;

/// Validate a raw `/predict` body and forecast it.
pub fn run_regular(
    engine: &dyn ForecastEngine,
    settings: &ForecastSettings,
    body: &[u8],
) -> PipelineResult<RegularForecast> {
    let request = validate_regular(body, settings)?;
    forecast_regular(engine, settings, &request)
}

/// Forecast an already validated request.
pub fn forecast_regular(
    engine: &dyn ForecastEngine,
    settings: &ForecastSettings,
    request: &RegularRequest,
) -> PipelineResult<RegularForecast> {
    debug!(
        points = request.sales_data.len(),
        horizon = request.prediction_length,
        "regular forecast"
    );
    let predictions = invoke_engine(
        engine,
        &request.sales_data,
        request.prediction_length,
        settings.seasonal_config(),
    )?;
    Ok(RegularForecast::new(&predictions))
}
