//! HTTP surface: shared state, router and the error envelope.

mod error;
pub mod routes;

pub use error::ApiError;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::ForecastSettings;
use crate::engine::ForecastEngine;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<dyn ForecastEngine>,
    pub settings: Arc<ForecastSettings>,
}

impl AppState {
    pub fn new(engine: Arc<dyn ForecastEngine>, settings: ForecastSettings) -> Self {
        Self {
            engine,
            settings: Arc::new(settings),
        }
    }
}

/// Router with every endpoint and the middleware stack.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(routes::health))
        .route("/predict", post(routes::predict))
        .route("/irregular_predict", post(routes::irregular_predict))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
