//! # spend-forecast
//!
//! Forecasting service for spend series. Two pipelines share one engine:
//!
//! - the regular pipeline forecasts an evenly spaced series as submitted;
//! - the irregular pipeline resamples dated observations to a daily grid,
//!   interpolates interior gaps, windows the tail and re-attaches calendar
//!   dates to the forecast.
//!
//! The engine is a seasonal ARIMA with automatic order selection. The HTTP
//! layer lives in [`server`].

#![allow(clippy::needless_range_loop)]

pub mod config;
pub mod core;
pub mod engine;
pub mod error;
pub mod pipeline;
pub mod server;
pub mod telemetry;

pub use error::{EngineError, ErrorKind, PipelineError, PipelineResult, Result};

pub mod prelude {
    pub use crate::config::{ForecastSettings, Settings};
    pub use crate::core::{DailySeries, DatedObservation};
    pub use crate::engine::{AutoArimaEngine, ForecastEngine, Forecaster, SeasonalConfig};
    pub use crate::error::{EngineError, ErrorKind, PipelineError, PipelineResult, Result};
    pub use crate::pipeline::{run_irregular, run_regular, IrregularForecast, RegularForecast};
}
