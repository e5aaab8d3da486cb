//! ARIMA and SARIMA models with automatic order selection.

mod auto;
mod diff;
mod model;

pub use auto::{AutoArima, AutoArimaConfig};
pub use diff::{
    difference, integrate, seasonal_difference, seasonal_integrate, suggest_differencing,
    suggest_seasonal_differencing,
};
pub use model::{ModelOrder, SeasonalArima};
