//! Core data structures for dated observations and daily series.

mod daily_series;
mod observation;

pub use daily_series::DailySeries;
pub use observation::{parse_calendar_date, DatedObservation};
