//! Request pipelines: validate, prepare the series, forecast, format.
//!
//! Both pipelines are synchronous and stateless; the caller supplies the
//! engine and settings for each request.

pub mod irregular;
pub mod output;
pub mod regular;
pub mod validate;

pub use irregular::{forecast_irregular, run_irregular};
pub use output::{round2, IrregularForecast, RegularForecast};
pub use regular::{forecast_regular, run_regular};
pub use validate::{validate_irregular, validate_regular, IrregularRequest, RegularRequest};

use crate::engine::{ForecastEngine, SeasonalConfig};
use crate::error::{PipelineError, PipelineResult};

/// Fit `series` and forecast `horizon` steps, checking what the engine hands
/// back.
pub(crate) fn invoke_engine(
    engine: &dyn ForecastEngine,
    series: &[f64],
    horizon: usize,
    config: SeasonalConfig,
) -> PipelineResult<Vec<f64>> {
    let model = engine.fit(series, config)?;
    let predictions = model.predict(horizon)?;

    if predictions.len() != horizon {
        return Err(PipelineError::engine(format!(
            "engine returned {} predictions, expected {}",
            predictions.len(),
            horizon
        )));
    }
    if predictions.iter().any(|v| !v.is_finite()) {
        return Err(PipelineError::engine("engine returned non-finite predictions"));
    }
    Ok(predictions)
}
