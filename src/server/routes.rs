//! HTTP handlers.

use axum::body::Bytes;
use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};
use tracing::info;

use crate::pipeline::{run_irregular, run_regular, IrregularForecast, RegularForecast};
use crate::server::{ApiError, AppState};

/// Liveness probe.
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "alive",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// `POST /predict`
pub async fn predict(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<RegularForecast>, ApiError> {
    let forecast = tokio::task::spawn_blocking(move || {
        run_regular(state.engine.as_ref(), &state.settings, &body)
    })
    .await??;

    info!(horizon = forecast.prediction.len(), "regular forecast served");
    Ok(Json(forecast))
}

/// `POST /irregular_predict`
pub async fn irregular_predict(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<IrregularForecast>, ApiError> {
    let forecast = tokio::task::spawn_blocking(move || {
        run_irregular(state.engine.as_ref(), &state.settings, &body)
    })
    .await??;

    info!(horizon = forecast.forecasts.len(), "irregular forecast served");
    Ok(Json(forecast))
}
