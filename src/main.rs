//! spend-forecast HTTP server.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use spend_forecast::config::Settings;
use spend_forecast::engine::AutoArimaEngine;
use spend_forecast::server::{build_router, AppState};
use spend_forecast::telemetry;

#[derive(Parser, Debug)]
#[command(name = "spend-forecast", version, about = "Spend forecasting service")]
struct Args {
    /// Configuration file (TOML)
    #[arg(short, long, env = "SPEND_FORECAST_CONFIG")]
    config: Option<PathBuf>,

    /// Bind address, overrides the config file
    #[arg(long)]
    host: Option<String>,

    /// Bind port, overrides the config file
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file (optional - won't fail if missing)
    dotenvy::dotenv().ok();

    let args = Args::parse();
    let mut settings = Settings::load(args.config.as_deref())?;
    if let Some(host) = args.host {
        settings.server.host = host;
    }
    if let Some(port) = args.port {
        settings.server.port = port;
    }

    telemetry::init(&settings.logging)?;

    let engine = Arc::new(AutoArimaEngine::with_config(
        settings.forecast.search_config(),
    ));
    let state = AppState::new(engine, settings.forecast.clone());
    let app = build_router(state);

    let addr = settings.server.address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(
        "spend-forecast v{} listening on {}",
        env!("CARGO_PKG_VERSION"),
        addr
    );

    axum::serve(listener, app).await?;
    Ok(())
}
