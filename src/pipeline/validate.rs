//! Request validation for both pipelines.
//!
//! Bodies arrive as raw bytes and are checked field by field in a fixed order;
//! the first failing check determines the message returned to the client.

use serde_json::{Map, Value};

use crate::config::ForecastSettings;
use crate::core::{parse_calendar_date, DatedObservation};
use crate::error::{PipelineError, PipelineResult};

const DATE_COLUMN: &str = "Date";
const AMOUNT_COLUMN: &str = "Amount";

/// A validated regular-pipeline request.
#[derive(Debug, Clone, PartialEq)]
pub struct RegularRequest {
    pub sales_data: Vec<f64>,
    pub prediction_length: usize,
}

/// A validated irregular-pipeline request.
#[derive(Debug, Clone, PartialEq)]
pub struct IrregularRequest {
    pub observations: Vec<DatedObservation>,
    pub prediction_length: usize,
}

/// Parse the body as a non-empty JSON object.
///
/// Invalid JSON, a non-object or `{}` all count as no data.
fn parse_object(body: &[u8]) -> PipelineResult<Map<String, Value>> {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) if !map.is_empty() => Ok(map),
        _ => Err(PipelineError::shape("No data provided")),
    }
}

/// Validate a `/predict` body.
pub fn validate_regular(body: &[u8], settings: &ForecastSettings) -> PipelineResult<RegularRequest> {
    let object = parse_object(body)?;

    let raw = object
        .get("sales_data")
        .ok_or_else(|| PipelineError::shape("sales_data is required"))?;
    let items = raw
        .as_array()
        .ok_or_else(|| PipelineError::shape("sales_data must be an array"))?;

    if items.len() < settings.min_regular_points {
        return Err(PipelineError::constraint(format!(
            "sales_data must contain at least {} points",
            settings.min_regular_points
        )));
    }

    // Only JSON numbers count; booleans, strings and nulls do not.
    let sales_data = items
        .iter()
        .map(Value::as_f64)
        .collect::<Option<Vec<f64>>>()
        .ok_or_else(|| PipelineError::constraint("sales_data must contain only numbers"))?;

    let prediction_length = prediction_length(&object, settings)?;

    Ok(RegularRequest {
        sales_data,
        prediction_length,
    })
}

/// Validate an `/irregular_predict` body.
pub fn validate_irregular(
    body: &[u8],
    settings: &ForecastSettings,
) -> PipelineResult<IrregularRequest> {
    let object = parse_object(body)?;
    let data = object
        .get("data")
        .ok_or_else(|| PipelineError::shape("No data provided"))?;

    let prediction_length = prediction_length(&object, settings)?;
    let observations = observations(data)?;

    Ok(IrregularRequest {
        observations,
        prediction_length,
    })
}

/// Optional `prediction_length`: an integer in `1..=max`, defaulting when absent.
fn prediction_length(
    object: &Map<String, Value>,
    settings: &ForecastSettings,
) -> PipelineResult<usize> {
    let value = match object.get("prediction_length") {
        None => return Ok(settings.default_prediction_length),
        Some(value) => value,
    };

    let Value::Number(number) = value else {
        return Err(PipelineError::shape("prediction_length must be an integer"));
    };

    if let Some(n) = number.as_u64() {
        if n == 0 {
            return Err(PipelineError::constraint("prediction_length must be positive"));
        }
        return match usize::try_from(n) {
            Ok(n) if n <= settings.max_prediction_length => Ok(n),
            _ => Err(PipelineError::constraint(format!(
                "prediction_length must not exceed {}",
                settings.max_prediction_length
            ))),
        };
    }
    if number.is_i64() {
        // as_u64 failed, so the integer is negative
        return Err(PipelineError::constraint("prediction_length must be positive"));
    }
    Err(PipelineError::shape("prediction_length must be an integer"))
}

fn invalid_format() -> PipelineError {
    PipelineError::format("Invalid data format")
}

/// Convert `data` in either row or column layout into observations.
fn observations(data: &Value) -> PipelineResult<Vec<DatedObservation>> {
    match data {
        Value::Array(rows) => from_rows(rows),
        Value::Object(columns) => from_columns(columns),
        _ => Err(invalid_format()),
    }
}

/// `[{"Date": .., "Amount": ..}, ..]`
fn from_rows(rows: &[Value]) -> PipelineResult<Vec<DatedObservation>> {
    let records = rows
        .iter()
        .map(Value::as_object)
        .collect::<Option<Vec<_>>>()
        .ok_or_else(invalid_format)?;

    let has_column = |name: &str| records.iter().any(|r| r.contains_key(name));
    if !has_column(DATE_COLUMN) || !has_column(AMOUNT_COLUMN) {
        return Err(invalid_format());
    }

    records
        .iter()
        .map(|record| {
            let date = parse_date(record.get(DATE_COLUMN).unwrap_or(&Value::Null))?;
            let amount = parse_amount(record.get(AMOUNT_COLUMN).unwrap_or(&Value::Null))?;
            Ok(DatedObservation::new(date, amount))
        })
        .collect()
}

/// `{"Date": [..], "Amount": [..]}`
fn from_columns(columns: &Map<String, Value>) -> PipelineResult<Vec<DatedObservation>> {
    let column = |name: &str| columns.get(name).and_then(Value::as_array);
    let (dates, amounts) = match (column(DATE_COLUMN), column(AMOUNT_COLUMN)) {
        (Some(dates), Some(amounts)) if dates.len() == amounts.len() && !dates.is_empty() => {
            (dates, amounts)
        }
        _ => return Err(invalid_format()),
    };

    dates
        .iter()
        .zip(amounts)
        .map(|(date, amount)| Ok(DatedObservation::new(parse_date(date)?, parse_amount(amount)?)))
        .collect()
}

fn parse_date(value: &Value) -> PipelineResult<chrono::NaiveDate> {
    value
        .as_str()
        .and_then(parse_calendar_date)
        .ok_or_else(|| PipelineError::format(format!("Invalid date value: {}", display(value))))
}

fn parse_amount(value: &Value) -> PipelineResult<Option<f64>> {
    match value {
        Value::Null => Ok(None),
        Value::Number(n) => Ok(n.as_f64()),
        other => Err(PipelineError::format(format!(
            "Invalid amount value: {}",
            display(other)
        ))),
    }
}

/// Strings without quotes, everything else as JSON.
fn display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
