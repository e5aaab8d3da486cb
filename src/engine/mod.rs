//! Forecasting engine: the model interface the pipelines call and the
//! AutoARIMA implementation behind it.

pub mod arima;
pub mod optimize;

use tracing::info;

pub use crate::error::{EngineError, Result};
use arima::{AutoArima, AutoArimaConfig};

/// Common interface for fitted forecasting models.
///
/// This trait is object-safe and can be used with `Box<dyn Forecaster>`.
pub trait Forecaster {
    /// Fit the model to the series.
    fn fit(&mut self, series: &[f64]) -> Result<()>;

    /// Point forecasts for the next `horizon` steps.
    fn predict(&self, horizon: usize) -> Result<Vec<f64>>;

    /// In-sample one-step predictions.
    fn fitted_values(&self) -> Option<&[f64]>;

    /// Residuals (actual - fitted).
    fn residuals(&self) -> Option<&[f64]>;

    fn name(&self) -> &str;

    /// Check if the model has been fitted.
    fn is_fitted(&self) -> bool {
        self.fitted_values().is_some()
    }
}

/// Type alias for boxed forecaster trait objects.
pub type BoxedForecaster = Box<dyn Forecaster + Send>;

/// Seasonality settings handed to the engine with each fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeasonalConfig {
    /// Whether seasonal terms may be searched.
    pub seasonal: bool,
    /// Seasonal period in observations.
    pub period: usize,
}

impl Default for SeasonalConfig {
    fn default() -> Self {
        Self {
            seasonal: true,
            period: 12,
        }
    }
}

impl SeasonalConfig {
    pub fn new(seasonal: bool, period: usize) -> Self {
        Self { seasonal, period }
    }

    pub fn non_seasonal() -> Self {
        Self {
            seasonal: false,
            period: 0,
        }
    }

    /// Period to search with, or 0 when seasonality is off.
    pub fn effective_period(&self) -> usize {
        if self.seasonal && self.period > 1 {
            self.period
        } else {
            0
        }
    }
}

/// Fits a model to a series and hands back something that can forecast.
///
/// Implementations are shared across request handlers.
pub trait ForecastEngine: Send + Sync {
    /// Select and fit a model for `series`.
    fn fit(&self, series: &[f64], config: SeasonalConfig) -> Result<BoxedForecaster>;

    fn name(&self) -> &str;
}

/// Engine running an automatic ARIMA search per request.
#[derive(Debug, Clone, Default)]
pub struct AutoArimaEngine {
    base: AutoArimaConfig,
}

impl AutoArimaEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine searching with custom order limits; the seasonal period is
    /// always taken from the per-fit [`SeasonalConfig`].
    pub fn with_config(base: AutoArimaConfig) -> Self {
        Self { base }
    }
}

impl ForecastEngine for AutoArimaEngine {
    fn fit(&self, series: &[f64], config: SeasonalConfig) -> Result<BoxedForecaster> {
        let search = self
            .base
            .clone()
            .with_seasonal_period(config.effective_period());
        let mut model = AutoArima::with_config(search);
        model.fit(series)?;

        if let Some(order) = model.selected_order() {
            info!(%order, observations = series.len(), "model selected");
        }
        Ok(Box::new(model))
    }

    fn name(&self) -> &str {
        "auto_arima"
    }
}
