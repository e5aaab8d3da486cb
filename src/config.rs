//! Layered service configuration.
//!
//! Priority (highest to lowest):
//! 1. Environment variables prefixed `SPEND_FORECAST_` (`__` separates sections)
//! 2. TOML config file (`config/default.toml` unless another path is given)
//! 3. Built-in defaults

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::engine::arima::AutoArimaConfig;
use crate::engine::SeasonalConfig;

/// Config file read when no explicit path is given; missing is fine.
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "SPEND_FORECAST_";

/// Errors raised while loading or validating configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    MissingFile(PathBuf),

    #[error("failed to load configuration: {0}")]
    Load(#[from] Box<figment::Error>),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        ConfigError::Load(Box::new(err))
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct Settings {
    pub server: ServerSettings,
    pub forecast: ForecastSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

impl ServerSettings {
    /// `host:port` for binding.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Knobs shared by both forecasting pipelines.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ForecastSettings {
    /// Whether the engine may fit seasonal terms.
    pub seasonal: bool,
    /// Seasonal period handed to the engine.
    pub seasonal_period: usize,
    /// Trailing days of the daily series fed to the engine.
    pub window: usize,
    /// Horizon used when a request omits `prediction_length`.
    pub default_prediction_length: usize,
    /// Largest accepted `prediction_length`.
    pub max_prediction_length: usize,
    /// Minimum length of `sales_data`.
    pub min_regular_points: usize,
    /// Minimum length of the resampled daily series.
    pub min_daily_points: usize,
    /// Longest span, in days, a request may resample to.
    pub max_daily_points: usize,
    /// Stepwise order search; exhaustive when false.
    pub stepwise: bool,
    /// Cap on models fitted per stepwise search.
    pub max_model_fits: usize,
}

impl Default for ForecastSettings {
    fn default() -> Self {
        Self {
            seasonal: true,
            seasonal_period: 12,
            window: 80,
            default_prediction_length: 30,
            max_prediction_length: 3650,
            min_regular_points: 31,
            min_daily_points: 32,
            max_daily_points: 36_600,
            stepwise: true,
            max_model_fits: 60,
        }
    }
}

impl ForecastSettings {
    pub fn seasonal_config(&self) -> SeasonalConfig {
        SeasonalConfig::new(self.seasonal, self.seasonal_period)
    }

    /// Order-search limits for the ARIMA engine.
    pub fn search_config(&self) -> AutoArimaConfig {
        let mut config = AutoArimaConfig {
            max_fits: self.max_model_fits,
            ..Default::default()
        };
        if !self.stepwise {
            config = config.exhaustive();
        }
        config
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.seasonal && self.seasonal_period < 2 {
            return Err(ConfigError::Invalid(format!(
                "forecast.seasonal_period must be at least 2 when seasonal, got {}",
                self.seasonal_period
            )));
        }
        if self.window == 0 {
            return Err(ConfigError::Invalid(
                "forecast.window must be at least 1".to_string(),
            ));
        }
        if self.default_prediction_length == 0
            || self.default_prediction_length > self.max_prediction_length
        {
            return Err(ConfigError::Invalid(format!(
                "forecast.default_prediction_length must be within 1..={}, got {}",
                self.max_prediction_length, self.default_prediction_length
            )));
        }
        if self.max_daily_points < self.min_daily_points {
            return Err(ConfigError::Invalid(format!(
                "forecast.max_daily_points must be at least min_daily_points ({}), got {}",
                self.min_daily_points, self.max_daily_points
            )));
        }
        if self.max_model_fits == 0 {
            return Err(ConfigError::Invalid(
                "forecast.max_model_fits must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct LoggingSettings {
    /// Filter directive used when `RUST_LOG` is unset.
    pub level: String,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl Settings {
    /// Provider stack without extraction; exposed so callers can layer more.
    pub fn figment(file: &Path) -> Figment {
        Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file(file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Load settings, reading `path` if given (it must exist) or the default
    /// config file if present.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match path {
            Some(p) if !p.exists() => return Err(ConfigError::MissingFile(p.to_path_buf())),
            Some(p) => p.to_path_buf(),
            None => PathBuf::from(DEFAULT_CONFIG_PATH),
        };

        let settings: Settings = Self::figment(&file).extract()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.forecast.validate()
    }
}
